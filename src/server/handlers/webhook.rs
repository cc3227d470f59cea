//! Webhook handlers: GitHub issues, todo notes and image uploads.
//!
//! Each endpoint checks its event header and the payload's `action`,
//! turns the payload into a [`PrintEvent`], queues it and waits for the
//! receipt to come out.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::InkslipError;
use crate::event::PrintEvent;

use super::super::state::AppState;

/// Reply for requests that carry an event we do not print.
pub const UNHANDLED: &str = "처리되지 않은 이벤트입니다.";

/// Outer shape shared by all three webhooks.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    issue: Option<serde_json::Value>,
    #[serde(default)]
    image: Option<serde_json::Value>,
}

/// Which webhook a request arrived on.
#[derive(Debug, Clone, Copy)]
enum Hook {
    GitHub,
    Todo,
    Image,
}

impl Hook {
    fn header(self) -> &'static str {
        match self {
            Hook::GitHub => "x-github-event",
            Hook::Todo => "x-todo-event",
            Hook::Image => "x-image-event",
        }
    }

    /// Whether `(event, action)` is one this hook prints.
    fn accepts(self, event: &str, action: &str) -> bool {
        match self {
            Hook::GitHub | Hook::Todo => event == "issues" && matches!(action, "opened" | "edited"),
            Hook::Image => event == "image" && action == "uploaded",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Hook::GitHub => "이슈가 성공적으로 프린터에 출력되었습니다.",
            Hook::Todo => "Todo가 성공적으로 프린터에 출력되었습니다.",
            Hook::Image => "이미지가 성공적으로 프린터에 출력되었습니다.",
        }
    }

    fn event_from(self, envelope: Envelope) -> Result<PrintEvent, InkslipError> {
        Ok(match self {
            Hook::GitHub => PrintEvent::Issue(member(envelope.issue, "issue")?),
            Hook::Todo => PrintEvent::Todo(member(envelope.issue, "issue")?),
            Hook::Image => PrintEvent::RawImage(member(envelope.image, "image")?),
        })
    }
}

fn member<T: DeserializeOwned>(value: Option<serde_json::Value>, name: &str) -> Result<T, InkslipError> {
    let value = value.ok_or_else(|| InkslipError::MalformedEvent(format!("payload has no `{}`", name)))?;
    serde_json::from_value(value)
        .map_err(|e| InkslipError::MalformedEvent(format!("invalid `{}`: {}", name, e)))
}

/// Handle GET / - liveness.
pub async fn index() -> &'static str {
    "GitHub Webhook 서버가 실행 중입니다."
}

/// Handle POST /github-webhook.
pub async fn github(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    handle(Hook::GitHub, &state, &headers, &body).await
}

/// Handle POST /todo-webhook.
pub async fn todo(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    handle(Hook::Todo, &state, &headers, &body).await
}

/// Handle POST /image-webhook.
pub async fn image(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    handle(Hook::Image, &state, &headers, &body).await
}

async fn handle(hook: Hook, state: &AppState, headers: &HeaderMap, body: &[u8]) -> Response {
    let event_name = headers
        .get(hook.header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return error_response(&InkslipError::MalformedEvent(format!("invalid JSON: {}", e)));
        }
    };
    let action = envelope.action.as_deref().unwrap_or_default();
    info!(?hook, event = event_name, action, "webhook received");

    if !hook.accepts(event_name, action) {
        return (StatusCode::OK, UNHANDLED).into_response();
    }

    let event = match hook.event_from(envelope) {
        Ok(event) => event,
        Err(e) => return error_response(&e),
    };
    info!(?hook, title = event.title().unwrap_or_default(), "printing");

    let job = match state.queue.submit(event).await {
        Ok(job) => job,
        Err(e) => return error_response(&e),
    };
    let id = job.id();

    match tokio::time::timeout(state.print_timeout, job.wait()).await {
        Ok(Ok(_report)) => (StatusCode::OK, hook.success_message()).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(_) => {
            warn!(%id, "still printing after {:?}, not waiting any longer", state.print_timeout);
            (StatusCode::GATEWAY_TIMEOUT, "프린터 응답 시간이 초과되었습니다.").into_response()
        }
    }
}

/// Status code for a failed job.
pub fn status_for(err: &InkslipError) -> StatusCode {
    match err {
        InkslipError::MalformedEvent(_) => StatusCode::BAD_REQUEST,
        InkslipError::DeviceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &InkslipError) -> Response {
    warn!(error = %err, "webhook failed");
    (status_for(err), format!("출력 실패: {}", err)).into_response()
}
