//! Shared fixtures for in-crate tests: settings pointing at a temp dir and a
//! local stand-in for the chat completion API.

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use crate::settings::Settings;

pub const TEST_TOKEN: &str = "test-token";

pub fn settings_for(dir: &Path, completion_base_url: &str) -> Settings {
    Settings {
        database_path: dir.join("tasks.redb"),
        api_auth_token: TEST_TOKEN.to_string(),
        completion_api_key_file: dir.join("completion_key.txt"),
        completion_base_url: completion_base_url.to_string(),
        completion_model: "gpt-3.5-turbo".to_string(),
        completion_timeout_secs: 1,
        tcp_socket_binding: "127.0.0.1".to_string(),
        tcp_socket_port: 0,
        max_page_size: 100,
    }
}

#[derive(Debug, Clone)]
pub enum StubReply {
    /// 200 with one choice carrying this text.
    Text(String),
    /// Bare status code with a plain-text body.
    Status(u16),
    /// Never answers within the client timeout.
    Hang,
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

pub struct CompletionStub {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl CompletionStub {
    pub fn request_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<SeenRequest> {
        self.seen.lock().unwrap().last().cloned()
    }
}

struct StubState {
    reply: StubReply,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub async fn spawn_completion_stub(reply: StubReply) -> CompletionStub {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(StubState {
        reply,
        seen: seen.clone(),
    });

    let app = Router::new()
        .route("/chat/completions", post(answer))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    CompletionStub {
        base_url: format!("http://{addr}"),
        seen,
    }
}

async fn answer(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state
        .seen
        .lock()
        .unwrap()
        .push(SeenRequest { authorization, body });

    match &state.reply {
        StubReply::Text(text) => Json(json!({
            "id": "chatcmpl-stub",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        StubReply::Status(code) => (
            StatusCode::from_u16(*code).unwrap(),
            "stub failure",
        )
            .into_response(),
        StubReply::Hang => {
            tokio::time::sleep(Duration::from_secs(10)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}
