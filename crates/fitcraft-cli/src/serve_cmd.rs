//! `fitcraft serve`: the HTTP plan-generation gateway.
//!
//! One route, `/api/gerar-treino`. It accepts any method so non-POST
//! requests get the JSON 405 body rather than axum's empty one.

use std::net::SocketAddr;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use fitcraft_core::gateway::{GatewayError, GenerateRequest, PlanGateway};

const METHOD_NOT_ALLOWED_MESSAGE: &str = "Método não permitido";
const MISSING_PROMPT_MESSAGE: &str = "O campo promptDoPersonal é obrigatório.";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum AppError {
    MethodNotAllowed,
    BadRequest(String),
    /// Non-success answer from the model service, relayed unchanged.
    Upstream { status: u16, body: String },
    Internal(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidRequest(msg) => Self::BadRequest(msg),
            GatewayError::Upstream { status, body } => Self::Upstream { status, body },
            GatewayError::ModelUnavailable(_) | GatewayError::MalformedModelOutput(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "error": METHOD_NOT_ALLOWED_MESSAGE })),
            )
                .into_response(),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "message": message } })),
            )
                .into_response(),
            Self::Upstream { status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                match serde_json::from_str::<Value>(&body) {
                    Ok(value) => (status, Json(value)).into_response(),
                    Err(_) => (
                        status,
                        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                        body,
                    )
                        .into_response(),
                }
            }
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": message } })),
            )
                .into_response(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct GerarTreinoBody {
    #[serde(rename = "promptDoPersonal", default)]
    prompt: Option<String>,
    #[serde(rename = "listaFormatada", default)]
    catalog_listing: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(gateway: PlanGateway) -> Router {
    Router::new()
        .route("/api/gerar-treino", any(gerar_treino))
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(gateway: PlanGateway, bind: &str, port: u16) -> Result<()> {
    let app = build_router(gateway);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("fitcraft serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("fitcraft serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn gerar_treino(
    State(gateway): State<PlanGateway>,
    method: Method,
    body: Bytes,
) -> Result<Response, AppError> {
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let payload: GerarTreinoBody = if body.is_empty() {
        GerarTreinoBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?
    };

    let prompt = payload
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(MISSING_PROMPT_MESSAGE.to_string()))?;

    let mut request = GenerateRequest::new(prompt);
    if let Some(listing) = payload.catalog_listing {
        request = request.with_catalog_listing(listing);
    }

    match gateway.generate(&request).await {
        Ok(plan) => Ok(Json(plan).into_response()),
        Err(err) => {
            match &err {
                GatewayError::Upstream { status, .. } => {
                    warn!(status, "relaying model service error")
                }
                other => error!(error = %other, "plan generation failed"),
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use fitcraft_core::gateway::PlanGateway;
    use fitcraft_core::model::Role;
    use fitcraft_test_utils::{ScriptedModel, sample_plan_json};

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    async fn send(
        model: Arc<ScriptedModel>,
        method: &str,
        body: &str,
    ) -> axum::response::Response {
        let app = super::build_router(PlanGateway::new(model));
        app.oneshot(
            Request::builder()
                .method(method)
                .uri("/api/gerar-treino")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn model() -> Arc<ScriptedModel> {
        Arc::new(ScriptedModel::replying(sample_plan_json()))
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn get_is_method_not_allowed_regardless_of_body() {
        for body in ["", r#"{"promptDoPersonal": "treino A"}"#] {
            let model = model();
            let resp = send(model.clone(), "GET", body).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
            let json = body_json(resp).await;
            assert_eq!(json["error"], "Método não permitido");
            assert!(model.requests().is_empty());
        }
    }

    #[tokio::test]
    async fn put_is_method_not_allowed() {
        let resp = send(model(), "PUT", "{}").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn missing_prompt_is_bad_request() {
        for body in ["{}", "", r#"{"promptDoPersonal": ""}"#, r#"{"promptDoPersonal": "   "}"#] {
            let model = model();
            let resp = send(model.clone(), "POST", body).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body:?}");
            let json = body_json(resp).await;
            assert_eq!(
                json["error"]["message"],
                "O campo promptDoPersonal é obrigatório."
            );
            assert!(model.requests().is_empty());
        }
    }

    #[tokio::test]
    async fn invalid_json_is_bad_request() {
        let resp = send(model(), "POST", "not json").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn success_returns_plan_object() {
        let model = model();
        let resp = send(
            model.clone(),
            "POST",
            r#"{"promptDoPersonal": "treino A de peito e tríceps", "listaFormatada": "- Supino Reto (Peitoral)"}"#,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["nome_ficha"], "Treino A - Peito e Tríceps");
        assert_eq!(json["dias_treino"][0]["exercicios"][0]["nome"], "supino reto");

        let system = model.requests()[0]
            .message(Role::System)
            .unwrap()
            .to_string();
        assert!(system.contains("- Supino Reto (Peitoral)"));
    }

    #[tokio::test]
    async fn upstream_error_is_relayed() {
        let model = Arc::new(ScriptedModel::failing(
            429,
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        ));
        let resp = send(model, "POST", r#"{"promptDoPersonal": "treino"}"#).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["message"], "Rate limit reached");
        assert_eq!(json["error"]["type"], "requests");
    }

    #[tokio::test]
    async fn non_json_upstream_body_is_relayed_as_text() {
        let model = Arc::new(ScriptedModel::failing(502, "Bad Gateway"));
        let resp = send(model, "POST", r#"{"promptDoPersonal": "treino"}"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"Bad Gateway");
    }

    #[tokio::test]
    async fn malformed_model_output_is_internal_error() {
        let model = Arc::new(ScriptedModel::replying("Aqui está o seu treino!"));
        let resp = send(model, "POST", r#"{"promptDoPersonal": "treino"}"#).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn model_unavailable_is_internal_error() {
        // No scripted replies: the call fails as a transport error.
        let model = Arc::new(ScriptedModel::default());
        let resp = send(model, "POST", r#"{"promptDoPersonal": "treino"}"#).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
