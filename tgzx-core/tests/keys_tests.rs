use std::time::Duration;
use tgzx_core::{
    parse_key_listing, resolve_recipients, CoreError, HttpKeySource, TgzxConfig,
};
use tgzx_crypto::testing::{ed25519_key, rsa_key};
use tgzx_crypto::KeyAlgorithm;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ECDSA_LINE: &str = "ecdsa-sha2-nistp256 AAAAE2VjZHNhLXNoYTItbmlzdHAyNTYAAAAIbmlzdHAyNTYAAABBBFAKE= user@host";

fn source_for(server: &MockServer) -> HttpKeySource {
    let config = TgzxConfig {
        keys_base_url: server.uri(),
        request_timeout_secs: 5,
        ..TgzxConfig::default()
    };
    HttpKeySource::new(&config).unwrap()
}

async fn serve(server: &MockServer, user: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/{user}.keys")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn algorithms(recipients: &[tgzx_crypto::Recipient]) -> Vec<KeyAlgorithm> {
    recipients.iter().map(|r| r.algorithm()).collect()
}

// ── HTTP source ──

#[tokio::test]
async fn resolves_rsa_and_skips_ecdsa() {
    let server = MockServer::start().await;
    serve(
        &server,
        "testuser",
        format!("{}\n{ECDSA_LINE}\n", rsa_key().public_line),
    )
    .await;

    let recipients = resolve_recipients(&source_for(&server), "testuser").await.unwrap();
    assert_eq!(algorithms(&recipients), vec![KeyAlgorithm::Rsa]);
}

#[tokio::test]
async fn keeps_line_order_and_duplicates() {
    let server = MockServer::start().await;
    let ed = ed25519_key();
    let rsa = rsa_key();
    serve(
        &server,
        "octocat",
        format!("{}\n{}\n{}\n", ed.public_line, rsa.public_line, ed.public_line),
    )
    .await;

    let recipients = resolve_recipients(&source_for(&server), "octocat").await.unwrap();
    assert_eq!(
        algorithms(&recipients),
        vec![KeyAlgorithm::Ed25519, KeyAlgorithm::Rsa, KeyAlgorithm::Ed25519]
    );
}

#[tokio::test]
async fn not_found_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ghost.keys"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    match resolve_recipients(&source_for(&server), "ghost").await.unwrap_err() {
        CoreError::FetchFailed { identifier, reason } => {
            assert_eq!(identifier, "ghost");
            assert!(reason.contains("404"), "reason: {reason}");
        }
        other => panic!("expected FetchFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/octocat.keys"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = resolve_recipients(&source_for(&server), "octocat").await.unwrap_err();
    assert!(matches!(err, CoreError::FetchFailed { .. }));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.keys"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ed25519_key().public_line)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = TgzxConfig {
        keys_base_url: server.uri(),
        request_timeout_secs: 1,
        ..TgzxConfig::default()
    };
    let source = HttpKeySource::new(&config).unwrap();
    let err = resolve_recipients(&source, "slow").await.unwrap_err();
    assert!(matches!(err, CoreError::FetchFailed { .. }));
}

#[tokio::test]
async fn unsafe_identifier_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = source_for(&server);
    for identifier in ["../admin", "a/b", ""] {
        let err = resolve_recipients(&source, identifier).await.unwrap_err();
        assert!(matches!(err, CoreError::FetchFailed { .. }), "{identifier:?}");
    }
}

#[tokio::test]
async fn empty_body_has_no_valid_keys() {
    let server = MockServer::start().await;
    serve(&server, "nokeys", String::new()).await;

    match resolve_recipients(&source_for(&server), "nokeys").await.unwrap_err() {
        CoreError::NoValidKeys { identifier } => assert_eq!(identifier, "nokeys"),
        other => panic!("expected NoValidKeys, got: {other:?}"),
    }
}

#[test]
fn listing_url_ignores_trailing_slash() {
    let config = TgzxConfig {
        keys_base_url: "https://keys.example.com/".into(),
        ..TgzxConfig::default()
    };
    let source = HttpKeySource::new(&config).unwrap();
    assert_eq!(source.listing_url("alice"), "https://keys.example.com/alice.keys");
}

// ── Listing parser ──

#[test]
fn malformed_line_is_skipped() {
    let listing = format!("ssh-ed25519 not-base64!!\n{}\n", ed25519_key().public_line);
    let recipients = parse_key_listing("alice", &listing).unwrap();
    assert_eq!(algorithms(&recipients), vec![KeyAlgorithm::Ed25519]);
}

#[test]
fn surrounding_whitespace_and_blank_lines_ignored() {
    let listing = format!("\n\n   {}   \r\n\n", ed25519_key().public_line);
    assert_eq!(parse_key_listing("alice", &listing).unwrap().len(), 1);
}

#[test]
fn blank_listing_has_no_valid_keys() {
    let err = parse_key_listing("alice", "\n   \n\t\n").unwrap_err();
    assert!(matches!(err, CoreError::NoValidKeys { .. }));
}

#[test]
fn unsupported_only_listing_has_no_valid_keys() {
    let listing = format!(
        "{ECDSA_LINE}\nsk-ssh-ed25519@openssh.com AAAAGnNrLXNzaC1lZDI1NTE5QG9wZW5zc2guY29tAAAAIFAKE= k\n"
    );
    let err = parse_key_listing("alice", &listing).unwrap_err();
    assert!(matches!(err, CoreError::NoValidKeys { .. }));
}
