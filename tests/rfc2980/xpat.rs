//! RFC 2980 Section 2.9 - XPAT

use crate::common::{self, body};

#[tokio::test]
async fn test_xpat_multiple_patterns() {
    let mut script = b"221 Header follows\r\n".to_vec();
    script.extend(body(&["10 Rust 2024 released", "14 tokio 1.40"]));
    let (mut client, log) = common::connect(&script).await;

    let entries = client
        .xpat("Subject", "1-20", &["*Rust*", "*tokio*"])
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].article_number, 10);
    assert_eq!(entries[1].value, "tokio 1.40");

    drop(client);
    assert_eq!(
        log.commands().await,
        "XPAT Subject 1-20 *Rust* *tokio*\r\n"
    );
}

#[tokio::test]
async fn test_xpat_no_matches() {
    let mut script = b"221 Header follows\r\n".to_vec();
    script.extend(body(&[]));
    let (mut client, _log) = common::connect(&script).await;

    let mut entries = client
        .xpat("From", "<a@example.com>", &["*nobody*"])
        .await
        .unwrap();
    assert!(entries.next_record().await.unwrap().is_none());
}

#[tokio::test]
async fn test_xpat_unsupported() {
    let script = b"500 Command not recognized\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client
        .xpat("Subject", "1-", &["*"])
        .await
        .unwrap_err();
    assert!(err.is_permanent());
    assert!(!client.is_broken());
}
