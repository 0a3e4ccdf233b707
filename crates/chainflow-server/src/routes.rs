//! Route table and request handlers
//!
//! Every action endpoint takes a JSON object body and answers with the
//! `{ success, ... }` envelope built by the core's result assembler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use chainflow_core::actions::{
    Airdrop, CreateAndMintNft, CreateDao, CreateNftCollection, DeployErc20, DeployErc721,
    GetBalance, Swap, SwapPingPong, Transfer,
};
use chainflow_core::{
    compile, expand, run, ActionError, ActionHandler, ActionOutput, ActionParams, ToolChain,
    WorkflowGraph,
};
use serde_json::{json, Value};

use crate::error::ApiResponse;
use crate::server::AppState;

type SharedState = Arc<AppState>;

/// All routes, without middleware
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .route("/transfer", action(&Transfer))
        .route("/deploy-token", action(&DeployErc20))
        .route("/deploy-nft-collection", action(&DeployErc721))
        .route("/create-nft-collection", action(&CreateNftCollection))
        .route("/create-and-mint-nft", action(&CreateAndMintNft))
        .route("/create-dao", action(&CreateDao))
        .route("/swap", action(&Swap))
        .route("/swap-ping-pong", action(&SwapPingPong))
        .route("/airdrop", action(&Airdrop))
        .route("/balance/:address", get(native_balance))
        .route("/balance/:address/:token", get(token_balance))
        .route("/tools", get(list_tools))
        .route("/tools/:tool", post(run_tool))
        .route("/workflow/compile", post(compile_workflow))
        .route("/workflow/expand", post(expand_workflow))
}

/// POST route running `handler` on the request body
fn action(handler: &'static dyn ActionHandler) -> MethodRouter<SharedState> {
    post(
        move |State(state): State<SharedState>, body: Result<Json<Value>, JsonRejection>| async move {
            let params = match body_params(body) {
                Ok(params) => params,
                Err(e) => return failure(&state, &e),
            };
            ApiResponse(run(handler, &state.ctx, &params).await)
        },
    )
}

fn body_params(body: Result<Json<Value>, JsonRejection>) -> Result<ActionParams, ActionError> {
    let Json(value) = body.map_err(|e| ActionError::InvalidInput(e.body_text()))?;
    ActionParams::from_value(value)
}

fn failure(state: &AppState, err: &ActionError) -> ApiResponse {
    ApiResponse(state.ctx.assembler().failure(err))
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    let config = state.ctx.config();
    Json(json!({
        "status": "ok",
        "network": config.network_name,
        "chainId": config.chain_id,
    }))
}

async fn native_balance(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> ApiResponse {
    let mut params = ActionParams::default();
    params.insert("address", address);
    ApiResponse(run(&GetBalance, &state.ctx, &params).await)
}

async fn token_balance(
    State(state): State<SharedState>,
    Path((address, token)): Path<(String, String)>,
) -> ApiResponse {
    let mut params = ActionParams::default();
    params.insert("address", address);
    params.insert("token", token);
    ApiResponse(run(&GetBalance, &state.ctx, &params).await)
}

async fn list_tools(State(state): State<SharedState>) -> Json<Value> {
    let tools: Vec<&str> = state.registry.tools().iter().map(|t| t.as_str()).collect();
    Json(json!({ "tools": tools }))
}

async fn run_tool(
    State(state): State<SharedState>,
    Path(tool): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResponse {
    let params = match body_params(body) {
        Ok(params) => params,
        Err(e) => return failure(&state, &e),
    };
    ApiResponse(state.registry.dispatch(&state.ctx, &tool, &params).await)
}

async fn compile_workflow(
    State(state): State<SharedState>,
    body: Result<Json<WorkflowGraph>, JsonRejection>,
) -> ApiResponse {
    let result = body
        .map_err(|e| ActionError::InvalidInput(e.body_text()))
        .and_then(|Json(graph)| compile(&graph))
        .map(|chain| ActionOutput::new().field("chain", json!(chain)));
    ApiResponse(state.ctx.assembler().assemble(result))
}

async fn expand_workflow(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResponse {
    let result = body
        .map_err(|e| ActionError::InvalidInput(e.body_text()))
        .and_then(|Json(value)| {
            // accept a bare array or `{ "chain": [...] }`
            let chain = match value {
                Value::Object(mut map) => map.remove("chain").unwrap_or(Value::Null),
                other => other,
            };
            serde_json::from_value::<ToolChain>(chain)
                .map_err(|e| ActionError::InvalidInput(format!("invalid tool chain: {}", e)))
        })
        .map(|chain| {
            let graph = expand(&chain);
            ActionOutput::new()
                .field("nodes", json!(graph.nodes))
                .field("edges", json!(graph.edges))
        });
    ApiResponse(state.ctx.assembler().assemble(result))
}
