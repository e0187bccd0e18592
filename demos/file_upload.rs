//! Upload files with a workflow execution.
//!
//! Files are read, base64-encoded and inlined into the request body under the
//! field names of the workflow's API trigger input format.
//!
//! Configuration comes from the environment:
//! - SIM_API_KEY (required)
//! - SIM_BASE_URL (optional, defaults to https://sim.ai)
//! - SIM_WORKFLOW_ID (optional, defaults to "your-workflow-id")
//!
//! Usage:
//!   SIM_API_KEY=your_key cargo run --example file_upload -- document.pdf [more.pdf ...]

use simstudio::{
    ExecutionOutcome, ExecutionRequest, FileInput, InputValue, RetryPolicy, SimClientBuilder,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: file_upload <file> [<file> ...]");
        std::process::exit(2);
    }

    let client = SimClientBuilder::from_env().build()?;
    let workflow_id =
        std::env::var("SIM_WORKFLOW_ID").unwrap_or_else(|_| "your-workflow-id".to_string());

    if !client.validate_workflow(&workflow_id) {
        eprintln!("Workflow {workflow_id} is not deployed");
        std::process::exit(1);
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        documents.push(InputValue::from(FileInput::open(path)?));
    }

    let instructions = if documents.len() == 1 {
        "Analyze this document"
    } else {
        "Compare these documents"
    };
    let request = ExecutionRequest::new(workflow_id)
        .input("documents", documents)
        .input("instructions", instructions);

    match client.execute_with_retry(&request, &RetryPolicy::default())? {
        ExecutionOutcome::Sync(result) if result.success => {
            println!("Success! Output: {:?}", result.output);
        }
        ExecutionOutcome::Sync(result) => {
            println!("Failed: {}", result.error.unwrap_or_default());
        }
        ExecutionOutcome::Async(handle) => {
            println!("Queued as task {} ({})", handle.task_id, handle.status);
        }
    }

    if let Some(limits) = client.rate_limit_info() {
        println!(
            "Rate limit: {}/{} remaining, resets at {}",
            limits.remaining, limits.limit, limits.reset
        );
    }
    Ok(())
}
