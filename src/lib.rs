//! # filedrop: a minimal HTTP file server
//!
//! `filedrop` serves static files from a local storage root and accepts file
//! uploads over HTTP. It is a single stateless routing layer over the
//! filesystem: there is no database, no authentication, and no cross-request
//! state beyond the shared read-only configuration and the files themselves.
//!
//! ## Request Flow
//!
//! Every request first passes through a logging middleware that records the
//! method, path, and client address. Requests to `POST /api/filehandler/*` are
//! handled by the upload handler ([`api::handlers::files`]), which stores the
//! multipart `file` field under the storage root at the subpath named by the
//! URL. Every other path falls through to a `ServeDir` service over the storage
//! root, which provides standard static-file semantics (MIME inference,
//! conditional requests, range requests) and responds 404 for missing files.
//!
//! Two concurrent uploads to the same destination race at the filesystem level;
//! the last write wins. This is a documented limitation, not a correctness
//! property.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use filedrop::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = filedrop::config::Args::parse();
//!     filedrop::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(Config::from(args)).await?;
//!
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod telemetry;

#[cfg(test)]
mod test;

use anyhow::Context;
use axum::extract::{ConnectInfo, DefaultBodyLimit, Request};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use axum::{Router, routing::post};
pub use config::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{Instrument, debug, info};

/// Application state shared across all request handlers.
///
/// Holds the immutable configuration; handlers receive it through axum's
/// `State` extractor rather than any ambient global.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Logs one structured entry per request before dispatch, and wraps the rest of
/// the request handling in a span carrying the method, path, and client
/// address so handler-level logs inherit those fields.
async fn log_request(request: Request, next: Next) -> Response {
    // ConnectInfo is absent under test transports that don't open a socket.
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.to_string());

    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        client_addr = %client_addr,
    );

    async move {
        info!("request received");
        next.run(request).await
    }
    .instrument(span)
    .await
}

/// Build the application router.
///
/// Upload routes get a body limit from the configured maximum upload size. The
/// upload prefix is routed for POST only, so axum answers other methods on it
/// with 405. Everything else falls through to static file serving over the
/// storage root; directory index files are not served (directory listing is out
/// of scope).
pub fn build_router(state: &AppState) -> Router {
    let max_upload_size = state.config.max_upload_size;

    let upload_routes = Router::new()
        .route("/api/filehandler/", post(api::handlers::files::upload_file))
        .route(
            "/api/filehandler/{*subpath}",
            post(api::handlers::files::upload_file),
        )
        .layer(DefaultBodyLimit::max(max_upload_size as usize))
        .with_state(state.clone());

    let static_files =
        ServeDir::new(&state.config.storage_dir).append_index_html_on_directories(false);

    upload_routes
        .fallback_service(static_files)
        .layer(from_fn(log_request))
}

/// The assembled application, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance.
    ///
    /// Creates the storage root if it is missing; failure to do so is fatal.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("starting file server with configuration: {config:#?}");

        tokio::fs::create_dir_all(&config.storage_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create storage directory {}",
                    config.storage_dir.display()
                )
            })?;

        let state = AppState {
            config: Arc::new(config.clone()),
        };
        let router = build_router(&state);

        Ok(Self { router, config })
    }

    /// Convert the application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application until the shutdown future resolves.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;

        info!("file server listening on http://{bind_addr}");
        info!("upload endpoint: http://{bind_addr}/api/filehandler/");

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        Ok(())
    }
}
