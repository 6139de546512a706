//! RPC method handlers.

use std::sync::Arc;

use sextant_core::{OrchestrationSignals, ScoringWeights, SessionId, SessionScore};
use sextant_engine::{classify_quality, extract_signals, sanitize, score_session, WeightProvider};
use sextant_store::ScoreRepo;

use crate::rpc::{self, RpcResponse};

/// Shared state available to all RPC handlers. The score store and the weight
/// provider are both optional collaborators.
pub struct HandlerState {
    pub scores: Option<ScoreRepo>,
    pub weight_provider: Option<Arc<dyn WeightProvider>>,
}

impl HandlerState {
    pub fn new() -> Self {
        Self {
            scores: None,
            weight_provider: None,
        }
    }

    pub fn with_scores(mut self, scores: ScoreRepo) -> Self {
        self.scores = Some(scores);
        self
    }

    pub fn with_weight_provider(mut self, provider: Arc<dyn WeightProvider>) -> Self {
        self.weight_provider = Some(provider);
        self
    }
}

impl Default for HandlerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch an RPC method to the appropriate handler.
pub async fn dispatch(
    state: &Arc<HandlerState>,
    method: &str,
    params: &serde_json::Value,
    id: Option<serde_json::Value>,
) -> RpcResponse {
    match method {
        "session.score" => session_score(state, params, id).await,
        "file.score" => file_score(state, params, id).await,
        "scores.recent" => scores_recent(state, params, id),
        "system.ping" | "health" => health(id),
        _ => RpcResponse::method_not_found(id, method),
    }
}

/// Score transcript text supplied inline.
async fn session_score(
    state: &Arc<HandlerState>,
    params: &serde_json::Value,
    id: Option<serde_json::Value>,
) -> RpcResponse {
    let content = match rpc::require_str(params, "content") {
        Ok(c) => c,
        Err(e) => return RpcResponse::invalid_params(id, e),
    };
    let filename = rpc::optional_str(params, "filename").unwrap_or("session.md");
    let weights = match parse_weights(params) {
        Ok(w) => w,
        Err(e) => return RpcResponse::invalid_params(id, e),
    };

    run_pipeline(state, content, filename, weights, id).await
}

/// Score a transcript file by path, read server-side.
async fn file_score(
    state: &Arc<HandlerState>,
    params: &serde_json::Value,
    id: Option<serde_json::Value>,
) -> RpcResponse {
    let path = match rpc::require_str(params, "path") {
        Ok(p) => p.to_string(),
        Err(e) => return RpcResponse::invalid_params(id, e),
    };

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(c) => c,
        Err(_) => return RpcResponse::invalid_params(id, format!("Cannot read file: {path}")),
    };

    let filename = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("session.md")
        .to_string();

    run_pipeline(state, &content, &filename, None, id).await
}

async fn run_pipeline(
    state: &Arc<HandlerState>,
    content: &str,
    filename: &str,
    weights: Option<ScoringWeights>,
    id: Option<serde_json::Value>,
) -> RpcResponse {
    let sanitized = sanitize(content);
    let signals = match extract_signals(&sanitized, filename) {
        Ok(s) => s,
        Err(e) => return RpcResponse::from_score_error(id, &e),
    };

    let score = score_session(
        &signals,
        SessionId::new(),
        weights,
        state.weight_provider.as_deref(),
    )
    .await;

    RpcResponse::success(id, score_payload(&score, &signals))
}

/// Recent history from the score store, when one is configured.
fn scores_recent(
    state: &Arc<HandlerState>,
    params: &serde_json::Value,
    id: Option<serde_json::Value>,
) -> RpcResponse {
    let Some(ref repo) = state.scores else {
        return RpcResponse::internal_error(id, "Score store not configured");
    };

    let limit = rpc::optional_i64(params, "limit").unwrap_or(5).clamp(1, 100) as u32;
    match repo.recent(limit) {
        Ok(rows) => {
            let entries: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "file": r.file,
                        "overallScore": r.overall_score,
                        "tier": r.tier.to_string(),
                        "complexity": r.complexity.to_string(),
                        "scoredAt": r.scored_at,
                    })
                })
                .collect();
            RpcResponse::success(id, serde_json::json!({ "scores": entries }))
        }
        Err(e) => RpcResponse::internal_error(id, e.to_string()),
    }
}

fn health(id: Option<serde_json::Value>) -> RpcResponse {
    RpcResponse::success(
        id,
        serde_json::json!({
            "status": "healthy",
            "service": "sextant",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

fn parse_weights(params: &serde_json::Value) -> Result<Option<ScoringWeights>, String> {
    match params.get("weights") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(raw) => serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| format!("Invalid weights: {e}")),
    }
}

fn score_payload(score: &SessionScore, signals: &OrchestrationSignals) -> serde_json::Value {
    let quality = classify_quality(score.overall_score);
    serde_json::json!({
        "sessionId": score.session_id,
        "overallScore": score.overall_score,
        "tier": quality.tier.to_string(),
        "description": quality.description,
        "breakdown": score.breakdown,
        "weights": score.weights,
        "version": score.version,
        "scoredAt": score.scored_at,
        "signals": {
            "skills": signals.skills_invoked,
            "agents": signals.agents_spawned.len(),
            "decisions": signals.decision_points.len(),
            "errorsRecovered": signals.errors_recovered.len(),
            "learnings": signals.compound_learnings.len(),
            "complexity": signals.metadata.complexity,
        },
    })
}
