//! Shared test utilities for fitcraft integration tests.
//!
//! - [`ScriptedModel`]: a [`ChatModel`] that replays canned replies and
//!   records every request it receives.
//! - [`sample_catalog`] / [`SAMPLE_CATALOG_JSON`]: a small fixed catalog.
//! - [`spawn_upstream`]: serves an axum router on an ephemeral local port,
//!   for testing the HTTP clients end to end.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use fitcraft_core::catalog::{Catalog, parse_catalog_json};
use fitcraft_core::model::{ChatCompletion, ChatModel, ChatRequest, ModelError};

// ---------------------------------------------------------------------------
// Scripted model
// ---------------------------------------------------------------------------

/// One canned reply of a [`ScriptedModel`].
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// A successful completion with this message content.
    Content(String),
    /// A non-success HTTP answer from the model service.
    Upstream { status: u16, body: String },
    /// The call never reached the service.
    Transport(String),
}

impl ScriptedReply {
    fn into_result(self) -> Result<ChatCompletion, ModelError> {
        match self {
            Self::Content(content) => Ok(ChatCompletion {
                content,
                model: Some("scripted".to_string()),
            }),
            Self::Upstream { status, body } => Err(ModelError::Upstream { status, body }),
            Self::Transport(msg) => Err(ModelError::Transport(msg)),
        }
    }
}

/// Chat model double that answers from a queue of replies.
///
/// Once the queue is empty every call fails with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Model answering once with `content`.
    pub fn replying(content: impl Into<String>) -> Self {
        Self::new([ScriptedReply::Content(content.into())])
    }

    /// Model failing once with an upstream error.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self::new([ScriptedReply::Upstream {
            status,
            body: body.into(),
        }])
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, ModelError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => reply.into_result(),
            None => Err(ModelError::Transport("no scripted reply left".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Catalog payload in the service's wire format.
pub const SAMPLE_CATALOG_JSON: &str = r#"[
    { "name": "Supino Reto", "category": "Peitoral", "path": "/peitoral/supino-reto.gif" },
    { "name": "Supino Inclinado com Halteres", "category": "Peitoral", "path": "/peitoral/supino-inclinado-halteres.gif" },
    { "name": "Crucifixo Máquina", "category": "Peitoral", "path": "/peitoral/crucifixo-maquina.gif" },
    { "name": "Tríceps Corda", "category": "Tríceps", "path": "/triceps/triceps-corda.gif" },
    { "name": "Tríceps Testa", "category": "Tríceps", "path": "/triceps/triceps-testa.gif" },
    { "name": "Puxada Frontal", "category": "Costas", "path": "/costas/puxada-frontal.gif" },
    { "name": "Remada Baixa", "category": "Costas", "path": "/costas/remada-baixa.gif" },
    { "name": "Rosca Direta", "category": "Bíceps", "path": "/biceps/rosca-direta.gif" },
    { "name": "Agachamento Livre", "category": "Pernas", "path": "/pernas/agachamento-livre.gif" },
    { "name": "Mesa Flexora", "category": "Pernas", "path": "/pernas/mesa-flexora.gif" },
    { "name": "Elevação Lateral", "category": "Ombros", "path": "/ombros/elevacao-lateral.gif" },
    { "name": "Prancha", "category": "Abdômen", "path": "/abdomen/prancha.gif" }
]"#;

/// [`SAMPLE_CATALOG_JSON`] parsed.
pub fn sample_catalog() -> Catalog {
    parse_catalog_json(SAMPLE_CATALOG_JSON).expect("sample catalog is valid")
}

/// A well-formed model answer for a chest and triceps day.
pub fn sample_plan_json() -> String {
    serde_json::json!({
        "nome_ficha": "Treino A - Peito e Tríceps",
        "dias_treino": [
            {
                "dia": "A",
                "grupo_muscular": "Peito e Tríceps",
                "exercicios": [
                    { "nome": "supino reto", "series": "4", "repeticoes": "8-12", "tecnica_avancada": "" },
                    { "nome": "Triceps corda", "series": "3", "repeticoes": "12" },
                    { "nome": "Flexão de braço com palmas", "series": "3", "repeticoes": "até a falha" }
                ]
            }
        ]
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Upstream server
// ---------------------------------------------------------------------------

/// Serve `router` on `127.0.0.1:<ephemeral>` and return its base URL.
///
/// The server runs on a background task for the rest of the test.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream server failed");
    });
    format!("http://{addr}")
}
