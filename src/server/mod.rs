//! # HTTP Webhook Server
//!
//! Receives GitHub issue, todo and image webhooks and prints each as a
//! receipt.
//!
//! ## Usage
//!
//! ```bash
//! SERIAL_PORT=/dev/ttyACM0 PORT=3000 inkslip serve
//! ```
//!
//! | Route | Header | Accepted |
//! |-------|--------|----------|
//! | `GET /` | | liveness |
//! | `POST /github-webhook` | `x-github-event: issues` | `opened`, `edited` |
//! | `POST /todo-webhook` | `x-todo-event: issues` | `opened`, `edited` |
//! | `POST /image-webhook` | `x-image-event: image` | `uploaded` |

mod handlers;
mod state;

pub use handlers::webhook::{UNHANDLED, status_for};
pub use state::{AppState, BODY_LIMIT_BYTES, PRINT_TIMEOUT, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::InkslipError;
use crate::spool::PrintQueue;

/// Build the router. Exposed separately so it can be driven without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::webhook::index))
        .route("/github-webhook", post(handlers::webhook::github))
        .route("/todo-webhook", post(handlers::webhook::todo))
        .route("/image-webhook", post(handlers::webhook::image))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use inkslip::normalize::Normalizer;
/// use inkslip::printer::PrinterConfig;
/// use inkslip::render::fetch::HttpFetcher;
/// use inkslip::server::{serve, ServerConfig};
/// use inkslip::spool::PrintQueue;
/// use inkslip::transport::SerialDevice;
///
/// # async fn example() -> Result<(), inkslip::InkslipError> {
/// let config = PrinterConfig::RECEIPT_80MM;
/// let normalizer = Normalizer::new(Arc::new(HttpFetcher::new()?), config);
/// let device = Arc::new(SerialDevice::new("/dev/ttyACM0", config.baud_rate));
/// let (queue, _worker) = PrintQueue::start(normalizer, device);
///
/// serve(ServerConfig::with_port(3000), queue).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, queue: PrintQueue) -> Result<(), InkslipError> {
    let state = Arc::new(AppState::new(queue, config.print_timeout));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    info!(addr = %config.listen_addr, "webhook server listening");
    for path in ["/github-webhook", "/todo-webhook", "/image-webhook"] {
        info!("webhook URL: http://{}{}", config.listen_addr, path);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
