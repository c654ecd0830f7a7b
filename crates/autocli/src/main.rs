use anyhow::Result;
use autocore::{ExecutionEvent, ExecutionStatus, TriggeredBy, Workflow, WorkflowNode};
use autoengine::{AdjacencyIndex, Engine, ExecutorRegistry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "automator")]
#[command(about = "Workflow automation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Initial input data as a JSON string
        #[arg(short, long)]
        input: Option<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a workflow file without executing it
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            input,
            verbose,
        } => {
            let level = if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            };
            tracing_subscriber::fmt().with_max_level(level).init();

            run_workflow(file, input).await?;
        }

        Commands::Validate { file } => {
            validate_workflow(file)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_workflow(output)?;
        }
    }

    Ok(())
}

async fn run_workflow(file: PathBuf, input: Option<String>) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let workflow_json = std::fs::read_to_string(&file)?;
    let workflow: Workflow = serde_json::from_str(&workflow_json)?;

    let input: serde_json::Value = match input {
        Some(input) => serde_json::from_str(&input)?,
        None => serde_json::Value::Null,
    };

    println!("📋 Workflow: {}", workflow.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Edges: {}", workflow.edges.len());
    println!();

    let mut registry = ExecutorRegistry::new();
    autonodes::register_all(&mut registry);
    let engine = Engine::new(Arc::new(registry));

    // Subscribe to events for real-time output
    let mut events = engine.subscribe_events();
    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::ExecutionStarted { .. } => {
                    println!("▶️  Execution started");
                }
                ExecutionEvent::NodeStarted {
                    node_id, node_type, ..
                } => {
                    println!("  ⚡ Starting node: {} ({})", node_id, node_type);
                }
                ExecutionEvent::NodeFinished { result, .. } => match result.status {
                    ExecutionStatus::Success => {
                        println!("  ✅ Node {} completed", result.node_id);
                    }
                    _ => {
                        println!(
                            "  ❌ Node {} failed: {}",
                            result.node_id,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                },
                ExecutionEvent::ExecutionFinished {
                    status, duration_ms, ..
                } => match status {
                    ExecutionStatus::Success => {
                        println!("✨ Execution completed in {}ms", duration_ms);
                    }
                    ExecutionStatus::Cancelled => {
                        println!("🛑 Execution cancelled after {}ms", duration_ms);
                    }
                    _ => {
                        println!("💥 Execution failed after {}ms", duration_ms);
                    }
                },
            }
        }
    });

    let record = engine
        .execute_workflow(&workflow, TriggeredBy::Manual, input)
        .await;

    // Let the event printer drain
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    println!();
    println!("📊 Execution Summary:");
    println!("   Execution ID: {}", record.id);
    println!("   Status: {:?}", record.status);
    if let Some(error) = &record.error {
        println!("   Error: {}", error);
    }

    let succeeded = record
        .node_results
        .iter()
        .filter(|r| r.is_success())
        .count();
    println!(
        "   Nodes: {} succeeded, {} failed",
        succeeded,
        record.node_results.len() - succeeded
    );

    if !record.node_results.is_empty() {
        println!();
        println!("📤 Results:");
        for result in &record.node_results {
            match (&result.data, &result.error) {
                (Some(data), _) => println!("   {}: {}", result.node_id, data),
                (None, Some(error)) => println!("   {}: error: {}", result.node_id, error),
                (None, None) => println!("   {}: (no output)", result.node_id),
            }
        }
    }

    Ok(())
}

fn validate_workflow(file: PathBuf) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow_json = std::fs::read_to_string(&file)?;
    let workflow: Workflow = serde_json::from_str(&workflow_json)?;

    AdjacencyIndex::build(&workflow.nodes, &workflow.edges)?;

    println!("✅ Workflow is valid:");
    println!("   Name: {}", workflow.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Edges: {}", workflow.edges.len());

    Ok(())
}

fn list_nodes() {
    println!("📦 Available Node Types:");
    println!();

    let mut registry = ExecutorRegistry::new();
    autonodes::register_all(&mut registry);

    for node_type in registry.list_node_types() {
        println!("  • {}", node_type);
    }
}

fn create_example_workflow(output: PathBuf) -> Result<()> {
    let mut workflow = Workflow::new("Example HTTP Workflow");
    workflow.description = Some("Fetches data from an API and tags the result".to_string());

    let start = workflow.add_node(WorkflowNode::new("start-1", "start"));
    let fetch = workflow.add_node(
        WorkflowNode::new("http-1", "httpRequest")
            .with_parameter("url", "https://api.github.com/zen")
            .with_parameter("method", "GET"),
    );
    let tag = workflow.add_node(
        WorkflowNode::new("set-1", "set")
            .with_parameter("values", serde_json::json!({"source": "github"})),
    );

    workflow.connect(start, fetch.clone());
    workflow.connect(fetch, tag);

    let json = serde_json::to_string_pretty(&workflow)?;
    std::fs::write(&output, json)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!(
        "  automator run --file {} --input '{{\"seed\": true}}'",
        output.display()
    );

    Ok(())
}
