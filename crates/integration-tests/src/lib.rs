//! Integration tests for Kirana.
//!
//! The catalog client is exercised against an in-process axum fixture
//! server bound to an ephemeral port; the ledgers run over a real
//! filesystem store in a temp directory. No external services, no
//! network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kirana-integration-tests
//! ```

use axum::Router;
use url::Url;

use kirana_client::AppState;
use kirana_client::config::ClientConfig;
use kirana_client::storage::FsStore;

/// Initialize tracing once for a test binary. Subsequent calls are
/// no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kirana_client=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Serve a fixture router on an ephemeral local port and return its base
/// URL. The server task lives until the test process exits.
///
/// # Panics
///
/// Panics if the listener cannot bind (tests have no recovery path).
pub async fn spawn_fixture_server(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fixture server");
    let addr = listener.local_addr().expect("listener has no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture server died");
    });

    Url::parse(&format!("http://{addr}/")).expect("fixture server URL is valid")
}

/// Application state wired to a fixture server and a temp-dir store.
///
/// # Panics
///
/// Panics if state construction fails.
#[must_use]
pub fn test_state(base_url: Url, data_dir: &std::path::Path) -> AppState {
    let mut config = ClientConfig::with_base_url(base_url);
    config.data_dir = data_dir.to_path_buf();
    let store = std::sync::Arc::new(FsStore::new(data_dir));
    AppState::with_store(config, store).expect("failed to build test state")
}
