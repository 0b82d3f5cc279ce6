use std::io::Write;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use haru_client::{
    ApiClient, ClientConfig, ErrorKind, MemoryTokenStore, TokenPair, TokenStore, TokenStoreError,
};
use haru_core::Streak;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn client_for(server: &ServerGuard, store: &Arc<MemoryTokenStore>) -> ApiClient {
    let config = ClientConfig::new(&server.url())
        .expect("config")
        .allow_insecure(true);
    ApiClient::new(config, store.clone()).expect("client")
}

fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new(access, refresh)))
}

#[tokio::test]
async fn authorized_request_carries_bearer_and_unwraps_data() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);

    let streaks = server
        .mock("GET", "/v1/streaks")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_body(json!({ "data": { "currentStreak": 5, "maxStreak": 10 } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let streak: Streak = client.get_data("/v1/streaks").await.expect("streak");
    assert_eq!(
        streak,
        Streak {
            current_streak: 5,
            max_streak: 10
        }
    );
    streaks.assert_async().await;
}

#[tokio::test]
async fn anonymous_session_gets_unauthorized_without_refresh() {
    let mut server = Server::new_async().await;
    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, &store);
    let mut session = client.subscribe();

    let members = server
        .mock("GET", "/v1/members")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let err = client
        .get::<serde_json::Value>("/v1/members")
        .await
        .expect_err("unauthorized");
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.message, ErrorKind::Unauthorized.default_message());
    assert_eq!(store.access_token().expect("access"), None);
    assert_eq!(store.refresh_token().expect("refresh"), None);
    assert_eq!(session.drain(), 1);
    members.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_retried_once() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);
    let mut session = client.subscribe();

    let rejected = server
        .mock("GET", "/v1/members")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({ "refreshToken": "R1" })))
        .with_status(200)
        .with_body(json!({ "accessToken": "A2" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("GET", "/v1/members")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_body(json!({ "data": { "nickname": "haru" } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let profile: serde_json::Value = client.get_data("/v1/members").await.expect("profile");
    assert_eq!(profile["nickname"], "haru");
    assert_eq!(store.access_token().expect("access").as_deref(), Some("A2"));
    assert_eq!(store.refresh_token().expect("refresh").as_deref(), Some("R1"));
    assert_eq!(session.drain(), 0);
    rejected.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn second_unauthorized_after_refresh_is_not_refreshed_again() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);
    let mut session = client.subscribe();

    server
        .mock("GET", "/v1/members")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_body(json!({ "accessToken": "A2" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("GET", "/v1/members")
        .match_header("authorization", "Bearer A2")
        .with_status(401)
        .with_body(json!({ "message": "still rejected" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let err = client
        .get::<serde_json::Value>("/v1/members")
        .await
        .expect_err("unauthorized");
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.message, "still rejected");
    assert_eq!(store.access_token().expect("access").as_deref(), Some("A2"));
    assert_eq!(session.drain(), 0);
    refresh.assert_async().await;
}

#[tokio::test]
async fn failed_refresh_clears_tokens_and_broadcasts_once() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);
    let mut session = client.subscribe();

    server
        .mock("GET", "/v1/members")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .with_body(json!({ "message": "token expired", "code": "AUTH_EXPIRED" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(401)
        .with_body(json!({ "message": "refresh token revoked", "code": "REFRESH_REVOKED" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let err = client
        .get::<serde_json::Value>("/v1/members")
        .await
        .expect_err("unauthorized");
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.code.as_deref(), Some("AUTH_EXPIRED"));
    assert_eq!(err.message, "token expired");
    assert_eq!(store.access_token().expect("access"), None);
    assert_eq!(store.refresh_token().expect("refresh"), None);
    assert_eq!(session.drain(), 1);
    refresh.assert_async().await;
}

#[tokio::test]
async fn server_error_is_not_refreshed_and_keeps_tokens() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);

    server
        .mock("GET", "/v1/streaks")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let err = client
        .get::<serde_json::Value>("/v1/streaks")
        .await
        .expect_err("server error");
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.status, Some(500));
    assert_eq!(store.access_token().expect("access").as_deref(), Some("A1"));
    assert_eq!(store.refresh_token().expect("refresh").as_deref(), Some("R1"));
    refresh.assert_async().await;
}

#[tokio::test]
async fn forbidden_and_not_found_are_classified() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);

    server
        .mock("GET", "/v1/admin")
        .with_status(403)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/daily-problem/99")
        .with_status(404)
        .with_body(
            json!({ "result": "ERROR", "data": null, "error": { "code": "P404", "message": "no such problem" } })
                .to_string(),
        )
        .create_async()
        .await;

    let forbidden = client
        .get::<serde_json::Value>("/v1/admin")
        .await
        .expect_err("forbidden");
    assert_eq!(forbidden.kind, ErrorKind::Forbidden);

    let missing = client
        .get::<serde_json::Value>("/v1/daily-problem/99")
        .await
        .expect_err("not found");
    assert_eq!(missing.kind, ErrorKind::NotFound);
    assert_eq!(missing.code.as_deref(), Some("P404"));
    assert_eq!(missing.message, "no such problem");
}

#[tokio::test]
async fn rotated_refresh_token_is_persisted() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);

    server
        .mock("GET", "/v1/streaks")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_body(json!({ "data": { "accessToken": "A2", "refreshToken": "R2" } }).to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/streaks")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_body(json!({ "data": { "currentStreak": 1, "maxStreak": 3 } }).to_string())
        .create_async()
        .await;

    let streak: Streak = client.get_data("/v1/streaks").await.expect("streak");
    assert_eq!(streak.max_streak, 3);
    assert_eq!(store.access_token().expect("access").as_deref(), Some("A2"));
    assert_eq!(store.refresh_token().expect("refresh").as_deref(), Some("R2"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);
    let mut session = client.subscribe();

    // Every request is rejected with A1 while the refresh is still running.
    let rejected = server
        .mock("GET", "/v1/streaks")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(8)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_chunked_body(|w| {
            thread::sleep(Duration::from_millis(300));
            w.write_all(br#"{"accessToken":"A2"}"#)
        })
        .expect(1)
        .create_async()
        .await;
    let succeeded = server
        .mock("GET", "/v1/streaks")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_body(json!({ "data": { "currentStreak": 2, "maxStreak": 2 } }).to_string())
        .expect(8)
        .create_async()
        .await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get_data::<Streak>("/v1/streaks").await
        }));
    }
    for handle in handles {
        let streak = handle.await.expect("join").expect("streak");
        assert_eq!(streak.current_streak, 2);
    }

    rejected.assert_async().await;
    refresh.assert_async().await;
    succeeded.assert_async().await;
    assert_eq!(store.access_token().expect("access").as_deref(), Some("A2"));
    assert_eq!(session.drain(), 0);
}

#[tokio::test]
async fn refresh_transport_failure_clears_tokens_and_returns_original_error() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let config = ClientConfig::new(&server.url())
        .expect("config")
        .allow_insecure(true)
        .with_timeout(Duration::from_millis(200));
    let client = ApiClient::new(config, store.clone()).expect("client");
    let mut session = client.subscribe();

    server
        .mock("GET", "/v1/members")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .with_body(json!({ "message": "token expired", "code": "AUTH_EXPIRED" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_chunked_body(|w| {
            thread::sleep(Duration::from_millis(800));
            w.write_all(br#"{"accessToken":"A2"}"#)
        })
        .expect(1)
        .create_async()
        .await;

    let err = client
        .get::<serde_json::Value>("/v1/members")
        .await
        .expect_err("unauthorized");
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.code.as_deref(), Some("AUTH_EXPIRED"));
    assert_eq!(store.access_token().expect("access"), None);
    assert_eq!(store.refresh_token().expect("refresh"), None);
    assert_eq!(session.drain(), 1);
    refresh.assert_async().await;
}

#[tokio::test]
async fn undecodable_refresh_body_clears_tokens_and_returns_original_error() {
    let mut server = Server::new_async().await;
    let store = seeded_store("A1", "R1");
    let client = client_for(&server, &store);
    let mut session = client.subscribe();

    server
        .mock("GET", "/v1/members")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .with_body(json!({ "message": "token expired", "code": "AUTH_EXPIRED" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_body("not json")
        .expect(1)
        .create_async()
        .await;
    let err = client
        .get::<serde_json::Value>("/v1/members")
        .await
        .expect_err("unauthorized");
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.message, "token expired");
    assert_eq!(store.access_token().expect("access"), None);
    assert_eq!(store.refresh_token().expect("refresh"), None);
    assert_eq!(session.drain(), 1);
    refresh.assert_async().await;
}

/// Fails every read of the access token after the first one.
struct FlakyReads {
    inner: MemoryTokenStore,
    reads: AtomicUsize,
}

impl TokenStore for FlakyReads {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.access_token()
        } else {
            Err(TokenStoreError::Keyring("keychain locked".to_string()))
        }
    }

    fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        self.inner.refresh_token()
    }

    fn set_tokens(&self, tokens: &TokenPair) -> Result<(), TokenStoreError> {
        self.inner.set_tokens(tokens)
    }

    fn set_access_token(&self, access_token: &str) -> Result<(), TokenStoreError> {
        self.inner.set_access_token(access_token)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.inner.clear()
    }
}

#[tokio::test]
async fn unreadable_store_during_recovery_still_refreshes() {
    let mut server = Server::new_async().await;
    let store = Arc::new(FlakyReads {
        inner: MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1")),
        reads: AtomicUsize::new(0),
    });
    let config = ClientConfig::new(&server.url())
        .expect("config")
        .allow_insecure(true);
    let client = ApiClient::new(config, store.clone()).expect("client");

    server
        .mock("GET", "/v1/streaks")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .match_body(Matcher::Json(json!({ "refreshToken": "R1" })))
        .with_status(200)
        .with_body(json!({ "accessToken": "A2" }).to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/streaks")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_body(json!({ "data": { "currentStreak": 1, "maxStreak": 1 } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let streak: Streak = client.get_data("/v1/streaks").await.expect("streak");
    assert_eq!(streak.current_streak, 1);
    assert_eq!(store.inner.access_token().expect("access").as_deref(), Some("A2"));
    refresh.assert_async().await;
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let store = seeded_store("A1", "R1");
    let config = ClientConfig::new(&format!("http://127.0.0.1:{port}"))
        .expect("config")
        .allow_insecure(true);
    let client = ApiClient::new(config, store.clone()).expect("client");

    let err = client
        .get::<serde_json::Value>("/v1/streaks")
        .await
        .expect_err("network");
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.kind.is_retryable());
    assert_eq!(store.access_token().expect("access").as_deref(), Some("A1"));
}

#[tokio::test]
async fn unanswered_request_times_out_as_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(stream);
        }
    });

    let store = seeded_store("A1", "R1");
    let config = ClientConfig::new(&format!("http://127.0.0.1:{port}"))
        .expect("config")
        .allow_insecure(true)
        .with_timeout(Duration::from_millis(200));
    let client = ApiClient::new(config, store.clone()).expect("client");
    let mut session = client.subscribe();

    let err = client
        .get::<serde_json::Value>("/v1/streaks")
        .await
        .expect_err("timeout");
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(
        err.details,
        Some(serde_json::Value::String("request timed out after 200ms".to_string()))
    );
    assert_eq!(store.access_token().expect("access").as_deref(), Some("A1"));
    assert_eq!(store.refresh_token().expect("refresh").as_deref(), Some("R1"));
    assert_eq!(session.drain(), 0);
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[test]
fn insecure_base_url_is_refused_by_default() {
    let config = ClientConfig::new("http://127.0.0.1:9").expect("config");
    let result = ApiClient::new(config, Arc::new(MemoryTokenStore::new()));
    assert!(result.is_err());
}
