//! RFC 3977 Section 3.2 - Response Codes
//!
//! Rejections leave the connection usable; replies that contradict the
//! command's expected shape break it.

use crate::common;
use nntp_stream::{NntpError, Outcome, Request, Verb};

#[tokio::test]
async fn test_rejection_keeps_connection_usable() {
    let script = b"411 No such newsgroup\r\n211 3 10 12 alt.test\r\n";
    let (mut client, log) = common::connect(script).await;

    let err = client.group("alt.missing").await.unwrap_err();
    match &err {
        NntpError::CommandRejected { code, message } => {
            assert_eq!(*code, 411);
            assert_eq!(message, "No such newsgroup");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(err.is_temporary());
    assert!(!err.is_fatal());
    assert!(!client.is_broken());
    assert_eq!(client.current_group(), None);

    let info = client.group("alt.test").await.unwrap();
    assert_eq!(info.count, 3);

    drop(client);
    assert_eq!(
        log.commands().await,
        "GROUP alt.missing\r\nGROUP alt.test\r\n"
    );
}

#[tokio::test]
async fn test_permanent_rejection_of_body_command() {
    let script = b"502 Access denied\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.xover("1-10").await.unwrap_err();
    assert!(err.is_permanent());
    assert_eq!(err.code(), Some(502));
    assert!(!client.has_pending_body());
    assert!(!client.is_broken());
}

#[tokio::test]
async fn test_body_command_without_body_is_violation() {
    let script = b"200 fine\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.xover("1-10").await.unwrap_err();
    assert!(matches!(err, NntpError::ProtocolViolation(_)));
    assert!(client.is_broken());
}

#[tokio::test]
async fn test_multiline_code_for_single_line_command_is_violation() {
    let script = b"224 overview follows\r\n1\tx\r\n.\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.group("alt.test").await.unwrap_err();
    assert!(matches!(err, NntpError::ProtocolViolation(_)));
    assert!(client.is_broken());
}

#[tokio::test]
async fn test_unexpected_continuation_is_violation() {
    let script = b"340 send it\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.stat(Some("<a@example.com>")).await.unwrap_err();
    assert!(matches!(err, NntpError::ProtocolViolation(_)));
    assert!(client.is_broken());
}

#[tokio::test]
async fn test_malformed_status_line() {
    let script = b"hello there\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.date().await.unwrap_err();
    assert!(matches!(err, NntpError::ProtocolViolation(_)));
    assert!(client.is_broken());
}

#[tokio::test]
async fn test_broken_connection_refuses_commands() {
    let script = b"200 fine\r\n";
    let (mut client, log) = common::connect(script).await;

    assert!(client.xover("1-").await.is_err());
    let err = client.date().await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionCorrupted(_)));

    // Nothing was sent for the refused command
    drop(client);
    assert_eq!(log.commands().await, "XOVER 1-\r\n");
}

#[tokio::test]
async fn test_closed_while_waiting_for_status() {
    let (mut client, _log) = common::connect(b"").await;

    let err = client.date().await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionClosed));
    assert!(client.is_broken());
}

#[tokio::test]
async fn test_execute_classifies_replies() {
    let mut script = b"111 20240101000000\r\n".to_vec();
    script.extend_from_slice(b"101 Capability list:\r\nVERSION 2\r\n.\r\n");
    let (mut client, _log) = common::connect(&script).await;

    match client.execute(&Request::new(Verb::Date, None)).await.unwrap() {
        Outcome::Status(reply) => assert_eq!(reply.code, 111),
        _ => panic!("DATE has no body"),
    }

    let outcome = client
        .execute(&Request::new(Verb::Capabilities, None))
        .await
        .unwrap();
    assert_eq!(outcome.status().code, 101);
    let lines = outcome.into_body().unwrap().collect_lines().await.unwrap();
    assert_eq!(lines, vec!["VERSION 2"]);
}

#[tokio::test]
async fn test_greeting_without_posting() {
    let client = common::try_connect_raw(b"201 read only\r\n".to_vec())
        .await
        .unwrap();
    assert!(!client.posting_allowed());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_greeting_refusal() {
    let err = common::try_connect_raw(b"502 go away\r\n".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(502));

    let err = common::try_connect_raw(b"400 service unavailable\r\n".to_vec())
        .await
        .unwrap_err();
    assert!(err.is_temporary());
}

#[tokio::test]
async fn test_unexpected_greeting() {
    let err = common::try_connect_raw(b"111 20240101000000\r\n".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, NntpError::ProtocolViolation(_)));

    let err = common::try_connect_raw(Vec::new()).await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionClosed));
}
