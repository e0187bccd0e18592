//! Readable binary sources that can be embedded in workflow inputs.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Media type used when a source does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
/// Display name used when a source does not declare one.
pub const DEFAULT_FILE_NAME: &str = "file";

/// A binary source whose remaining bytes can be read for upload.
///
/// Receivers are `&self` so one source can be shared (behind an `Arc`) between
/// the caller and any number of requests. Implementations that can report and
/// restore a read cursor override [`tell`](Self::tell) and
/// [`seek_to`](Self::seek_to); the encoder then puts the cursor back after
/// reading, which makes repeated encodes of the same source yield the same
/// bytes.
pub trait ReadableSource: Send + Sync {
    /// Read everything from the current cursor to the end.
    fn read_remaining(&self) -> io::Result<Vec<u8>>;

    /// Current cursor, or `None` when the source cannot seek.
    fn tell(&self) -> io::Result<Option<u64>> {
        Ok(None)
    }

    fn seek_to(&self, _pos: u64) -> io::Result<()> {
        Ok(())
    }

    /// Name as known to the source, possibly including directories.
    fn name(&self) -> Option<String> {
        None
    }

    fn content_type(&self) -> Option<String> {
        None
    }
}

fn lock<R>(inner: &Mutex<R>) -> io::Result<MutexGuard<'_, R>> {
    inner
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "readable source lock poisoned"))
}

/// Seekable source such as an open file or an in-memory cursor.
#[derive(Debug)]
pub struct FileInput<R> {
    inner: Mutex<R>,
    name: Option<String>,
    content_type: Option<String>,
}

impl<R> FileInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: Mutex::new(reader),
            name: None,
            content_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn into_inner(self) -> io::Result<R> {
        self.inner
            .into_inner()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "readable source lock poisoned"))
    }
}

impl FileInput<std::fs::File> {
    /// Open a file, naming it after the path and guessing its media type from
    /// the extension.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut input = Self::new(file).with_name(path.to_string_lossy());
        if let Some(mt) = guess_media_type(path) {
            input = input.with_content_type(mt);
        }
        Ok(input)
    }
}

impl<R: Read + Seek + Send> ReadableSource for FileInput<R> {
    fn read_remaining(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        lock(&self.inner)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn tell(&self) -> io::Result<Option<u64>> {
        lock(&self.inner)?.stream_position().map(Some)
    }

    fn seek_to(&self, pos: u64) -> io::Result<()> {
        lock(&self.inner)?.seek(SeekFrom::Start(pos)).map(|_| ())
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn content_type(&self) -> Option<String> {
        self.content_type.clone()
    }
}

/// Forward-only source such as a pipe or socket. Its bytes are consumed by
/// the first encode; encoding it again yields an empty file. Send it through
/// a single `execute` or `execute_with_retry` call, which encodes once.
#[derive(Debug)]
pub struct StreamInput<R> {
    inner: Mutex<R>,
    name: Option<String>,
    content_type: Option<String>,
}

impl<R> StreamInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: Mutex::new(reader),
            name: None,
            content_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl<R: Read + Send> ReadableSource for StreamInput<R> {
    fn read_remaining(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        lock(&self.inner)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn content_type(&self) -> Option<String> {
        self.content_type.clone()
    }
}

/// Last path component of `raw`, or [`DEFAULT_FILE_NAME`] when nothing is left.
pub fn display_name(raw: Option<&str>) -> String {
    raw.and_then(|s| s.rsplit(|c: char| c == '/' || c == '\\').next())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

pub(crate) fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mt = match ext.as_str() {
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(mt)
}
