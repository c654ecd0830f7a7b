use actix_cors::Cors;
use actix_web::{
    get, post, web, App, HttpResponse, HttpServer, Responder, Result as ActixResult,
};
use actix_ws::Message;
use autocore::{TriggeredBy, Workflow, WorkflowEdge, WorkflowNode};
use autoengine::{Engine, ExecutorRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// Application state shared across handlers
struct AppState {
    engine: Arc<Engine>,
    workflows: Arc<RwLock<HashMap<Uuid, Workflow>>>,
}

/// Ad-hoc execution payload: the canvas ships its current graph
/// directly, without saving a workflow first.
#[derive(Debug, Deserialize)]
struct ExecutePayload {
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
}

/// Response for workflow creation
#[derive(Debug, Serialize)]
struct WorkflowResponse {
    id: Uuid,
    message: String,
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check endpoint
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "autoserver"
    }))
}

/// List all workflows
#[get("/api/workflows")]
async fn list_workflows(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    let workflows = data.workflows.read().await;
    let workflow_list: Vec<_> = workflows
        .values()
        .map(|w| {
            serde_json::json!({
                "id": w.id,
                "name": w.name,
                "description": w.description,
                "nodes": w.nodes.len(),
                "edges": w.edges.len(),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(workflow_list))
}

/// Create a new workflow
#[post("/api/workflows")]
async fn create_workflow(
    data: web::Data<AppState>,
    workflow: web::Json<Workflow>,
) -> ActixResult<impl Responder> {
    let workflow = workflow.into_inner();
    let workflow_id = workflow.id;

    info!("Creating workflow: {} ({})", workflow.name, workflow_id);
    data.workflows.write().await.insert(workflow_id, workflow);

    Ok(HttpResponse::Created().json(WorkflowResponse {
        id: workflow_id,
        message: "Workflow created successfully".to_string(),
    }))
}

/// Get a specific workflow
#[get("/api/workflows/{id}")]
async fn get_workflow(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let workflow_id = path.into_inner();
    let workflows = data.workflows.read().await;

    match workflows.get(&workflow_id) {
        Some(workflow) => Ok(HttpResponse::Ok().json(workflow)),
        None => Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Workflow {} not found", workflow_id),
        })),
    }
}

/// Delete a workflow
#[actix_web::delete("/api/workflows/{id}")]
async fn delete_workflow(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let workflow_id = path.into_inner();
    let mut workflows = data.workflows.write().await;

    match workflows.remove(&workflow_id) {
        Some(_) => {
            info!("Deleted workflow: {}", workflow_id);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Workflow deleted successfully"
            })))
        }
        None => Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Workflow {} not found", workflow_id),
        })),
    }
}

/// Execute a stored workflow (batch form: full record in the response)
#[post("/api/workflows/{id}/execute")]
async fn execute_workflow(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let workflow_id = path.into_inner();

    let workflow = {
        let workflows = data.workflows.read().await;
        workflows.get(&workflow_id).cloned()
    };
    let Some(workflow) = workflow else {
        return Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Workflow {} not found", workflow_id),
        }));
    };

    info!("Executing workflow: {}", workflow_id);
    let record = data
        .engine
        .execute_workflow(&workflow, TriggeredBy::Manual, serde_json::Value::Null)
        .await;

    Ok(HttpResponse::Ok().json(record))
}

/// Execute an ad-hoc graph shipped in the request body
#[post("/api/executions/run")]
async fn run_execution(
    data: web::Data<AppState>,
    payload: web::Json<ExecutePayload>,
) -> ActixResult<impl Responder> {
    let payload = payload.into_inner();
    info!("Running ad-hoc execution with {} nodes", payload.nodes.len());

    let record = data.engine.execute(&payload.nodes, &payload.edges).await;
    Ok(HttpResponse::Ok().json(record))
}

/// WebSocket endpoint: accepts execute payloads and streams one
/// node-complete message per finished node, then the final record.
#[get("/ws/execute")]
async fn websocket_execute(
    req: actix_web::HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let (res, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    info!("WebSocket client connected");
    let engine = data.engine.clone();

    actix_web::rt::spawn(async move {
        while let Some(Ok(msg)) = msg_stream.recv().await {
            match msg {
                Message::Text(text) => {
                    let payload: ExecutePayload = match serde_json::from_str(&text) {
                        Ok(payload) => payload,
                        Err(e) => {
                            let _ = session
                                .text(
                                    serde_json::json!({
                                        "type": "execution:error",
                                        "error": format!("Invalid payload: {}", e),
                                    })
                                    .to_string(),
                                )
                                .await;
                            continue;
                        }
                    };

                    let started = session
                        .text(
                            serde_json::json!({
                                "type": "execution:start",
                                "message": "Workflow execution started",
                            })
                            .to_string(),
                        )
                        .await;
                    if started.is_err() {
                        break;
                    }

                    // The progress callback is synchronous, so results
                    // are bridged through a channel to the session.
                    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
                    let engine = engine.clone();
                    let run = actix_web::rt::spawn(async move {
                        engine
                            .execute_with_progress(&payload.nodes, &payload.edges, move |result| {
                                let _ = tx.send(result.clone());
                            })
                            .await
                    });

                    while let Some(result) = rx.recv().await {
                        let message = serde_json::json!({
                            "type": "execution:node-complete",
                            "result": result,
                        });
                        if session.text(message.to_string()).await.is_err() {
                            break;
                        }
                    }

                    match run.await {
                        Ok(record) => {
                            let message = serde_json::json!({
                                "type": "execution:complete",
                                "execution": record,
                            });
                            if session.text(message.to_string()).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Execution task failed: {}", e);
                            let _ = session
                                .text(
                                    serde_json::json!({
                                        "type": "execution:error",
                                        "error": e.to_string(),
                                    })
                                    .to_string(),
                                )
                                .await;
                        }
                    }
                }
                Message::Ping(bytes) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }

        info!("WebSocket client disconnected");
        let _ = session.close(None).await;
    });

    Ok(res)
}

/// List available node types
#[get("/api/nodes")]
async fn list_node_types(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    let node_types = data.engine.registry().list_node_types();
    Ok(HttpResponse::Ok().json(node_types))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🚀 Starting Workflow Automation Server");

    let mut registry = ExecutorRegistry::new();
    autonodes::register_all(&mut registry);

    let engine = Engine::new(Arc::new(registry));
    info!("✅ Engine initialized with built-in nodes");

    let app_state = web::Data::new(AppState {
        engine: Arc::new(engine),
        workflows: Arc::new(RwLock::new(HashMap::new())),
    });

    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    info!("🌐 Server starting on http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .service(health_check)
            .service(list_workflows)
            .service(create_workflow)
            .service(get_workflow)
            .service(delete_workflow)
            .service(execute_workflow)
            .service(run_execution)
            .service(websocket_execute)
            .service(list_node_types)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
