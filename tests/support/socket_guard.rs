//! Mock-server startup that tolerates sandboxes without loopback sockets.

use std::net::TcpListener;

use wiremock::MockServer;

/// Set to `1`/`true` to fail instead of skipping when no socket can be bound.
const REQUIRE_SOCKETS_ENV: &str = "SOLR_FETCH_REQUIRE_SOCKET_TESTS";

/// Starts a mock replication server, or returns `None` when localhost
/// cannot be bound and sockets are not required.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }

    let required = std::env::var(REQUIRE_SOCKETS_ENV)
        .is_ok_and(|value| matches!(value.trim(), "1" | "true"));
    assert!(
        !required,
        "cannot bind a localhost socket but {REQUIRE_SOCKETS_ENV} is set"
    );
    eprintln!(
        "cannot bind a localhost socket; skipping mock-server test \
         (set {REQUIRE_SOCKETS_ENV}=1 to fail instead)"
    );
    None
}
