//! Remote-store HTTP server
//!
//! Serves version-keyed bundle archives and accepts member uploads:
//! - GET /health - Health check
//! - GET /{archive} - Pack `wheelhouse<KEY>/` on demand and return the `.tar.gz`
//! - PUT /{dir}/{file} - Store a member file into the keyed directory

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use std::fs;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::archive;
use crate::bundle::{Bundle, BundleError, VersionKey};
use crate::logging::{operations, services, status};

/// HTTP server state
#[derive(Clone)]
struct AppState {
    store_dir: PathBuf,
}

/// The store server bundles are fetched from and uploaded into
pub struct StoreServer {
    bind: String,
    store_dir: PathBuf,
}

impl StoreServer {
    pub fn new(bind: String, store_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind,
            store_dir: store_dir.into(),
        }
    }

    /// Create the Axum router with all store endpoints
    pub fn router(&self) -> Router {
        let state = AppState {
            store_dir: self.store_dir.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/{archive}", get(get_archive))
            .route("/{dir}/{file}", put(put_member))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the store server; writes the bound address as JSON to
    /// `port_file` when given (port 0 selects a random port).
    pub async fn run(self, port_file: Option<&str>) -> Result<()> {
        fs::create_dir_all(&self.store_dir).with_context(|| {
            format!("failed to create store dir: {}", self.store_dir.display())
        })?;

        let listener = tokio::net::TcpListener::bind(&self.bind)
            .await
            .with_context(|| format!("failed to bind store server to {}", self.bind))?;
        let addr = listener.local_addr()?;

        if let Some(path) = port_file {
            let ports = serde_json::json!({ "http": addr.port() });
            fs::write(path, serde_json::to_string_pretty(&ports)?)
                .with_context(|| format!("failed to write port file: {}", path))?;
        }

        info!(
            service = services::STORE,
            "store server listening on {} (dir: {})",
            addr,
            self.store_dir.display()
        );

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!(service = services::STORE, "shutting down");
            })
            .await?;

        Ok(())
    }
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Pack the keyed bundle directory on demand and return its archive form
async fn get_archive(UrlPath(archive): UrlPath<String>, State(state): State<AppState>) -> Response {
    let key = match parse_archive_name(&archive) {
        Some(key) => key,
        None => {
            warn!(service = services::STORE, archive = %archive, "malformed archive name");
            return (StatusCode::BAD_REQUEST, "Invalid archive name").into_response();
        }
    };

    let bundle = Bundle::new(&state.store_dir, key);

    // An absent or empty keyed directory is a miss, not a server error
    match bundle.members() {
        Ok(members) => match archive::pack_to_vec(&bundle) {
            Ok(data) => {
                info!(
                    service = services::STORE,
                    operation = operations::FETCH,
                    status = status::SUCCESS,
                    key = %bundle.key(),
                    entry_count = members.len(),
                    size_bytes = data.len(),
                    "archive served"
                );
                (StatusCode::OK, data).into_response()
            }
            Err(e) => {
                warn!(service = services::STORE, key = %bundle.key(), error = %e, "failed to pack bundle");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
            }
        },
        Err(BundleError::MissingDir(_)) | Err(BundleError::EmptyDir(_)) => {
            info!(
                service = services::STORE,
                operation = operations::FETCH,
                status = status::NOT_FOUND,
                key = %bundle.key(),
                "no bundle for key"
            );
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
        Err(e) => {
            warn!(service = services::STORE, key = %bundle.key(), error = %e, "bundle enumeration failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}

/// Store an uploaded member file into the keyed directory
async fn put_member(
    UrlPath((dir, file)): UrlPath<(String, String)>,
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let key = match parse_bundle_dir(&dir) {
        Some(key) => key,
        None => {
            warn!(service = services::STORE, dir = %dir, "malformed bundle directory name");
            return (StatusCode::BAD_REQUEST, "Invalid bundle directory").into_response();
        }
    };

    if !valid_member_name(&file) {
        warn!(service = services::STORE, file = %file, "malformed member file name");
        return (StatusCode::BAD_REQUEST, "Invalid member name").into_response();
    }

    let bundle = Bundle::new(&state.store_dir, key);
    if let Err(e) = store_member(&state.store_dir, &bundle, &file, &body) {
        warn!(service = services::STORE, key = %bundle.key(), error = %e, "failed to store member");
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response();
    }

    info!(
        service = services::STORE,
        operation = operations::UPLOAD,
        status = status::SUCCESS,
        key = %bundle.key(),
        size_bytes = body.len(),
        "member stored: {}",
        file
    );
    (StatusCode::CREATED, "Stored").into_response()
}

/// Write through a temp file so partially received members never appear
fn store_member(store_dir: &std::path::Path, bundle: &Bundle, file: &str, body: &[u8]) -> Result<()> {
    fs::create_dir_all(bundle.dir())
        .with_context(|| format!("failed to create keyed dir: {}", bundle.dir().display()))?;

    let tmp = tempfile::NamedTempFile::new_in(store_dir)
        .context("failed to create temp file in store dir")?;
    fs::write(tmp.path(), body).context("failed to write member body")?;
    tmp.persist(bundle.dir().join(file))
        .context("failed to persist member file")?;

    Ok(())
}

/// Parse `wheelhouse<KEY>.tar.gz` into its version key
fn parse_archive_name(archive: &str) -> Option<VersionKey> {
    let key = archive
        .strip_prefix("wheelhouse")?
        .strip_suffix(".tar.gz")?;
    VersionKey::parse(key).ok()
}

/// Parse `wheelhouse<KEY>` into its version key
fn parse_bundle_dir(dir: &str) -> Option<VersionKey> {
    let key = dir.strip_prefix("wheelhouse")?;
    VersionKey::parse(key).ok()
}

/// Member names are single clean path segments, same charset as keys
fn valid_member_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
