//! RFC 3977 Section 3.1.1 - Multi-line Data Blocks
//!
//! Terminator detection, dot-unstuffing, draining and recovery when a
//! caller abandons a body or the server stops mid-body.

use crate::common::{self, body, overview_line};
use nntp_stream::{NntpError, ServerConfig};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn test_xover_end_to_end() {
    let lines = [
        overview_line(1, "first"),
        overview_line(2, "second"),
        overview_line(3, "third"),
    ];
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut script = b"224 Overview information follows\r\n".to_vec();
    script.extend(body(&lines));

    let (mut client, log) = common::connect(&script).await;

    let entries = client.xover("1-3").await.unwrap().collect().await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].article_number, 1);
    assert_eq!(entries[1].subject, "second");
    assert_eq!(entries[2].message_id, "<3@example.com>");
    assert_eq!(entries[2].bytes, 1003);
    assert!(!client.has_pending_body());
    assert!(!client.is_broken());

    drop(client);
    assert_eq!(log.commands().await, "XOVER 1-3\r\n");
}

#[tokio::test]
async fn test_empty_line_is_not_terminator() {
    let mut script = b"220 0 <a@example.com> article follows\r\n".to_vec();
    script.extend(body(&["Subject: test", "", "first paragraph", "", "second"]));

    let (mut client, _log) = common::connect(&script).await;

    let lines = client
        .article(Some("<a@example.com>"))
        .await
        .unwrap()
        .collect_lines()
        .await
        .unwrap();
    assert_eq!(
        lines,
        vec!["Subject: test", "", "first paragraph", "", "second"]
    );
}

#[tokio::test]
async fn test_dot_stuffed_lines_are_unstuffed() {
    let mut script = b"222 0 <a@example.com> body follows\r\n".to_vec();
    script.extend(body(&[".", "..", ".hidden", "plain."]));

    let (mut client, _log) = common::connect(&script).await;

    let lines = client
        .body(Some("<a@example.com>"))
        .await
        .unwrap()
        .collect_lines()
        .await
        .unwrap();
    assert_eq!(lines, vec![".", "..", ".hidden", "plain."]);
}

#[tokio::test]
async fn test_raw_bytes_survive_invalid_utf8() {
    let mut script = b"222 0 <bin@example.com>\r\n".to_vec();
    script.extend_from_slice(b"\xff\xfe binary\r\n.\r\n");

    let (mut client, _log) = common::connect(&script).await;

    let mut stream = client.body(Some("<bin@example.com>")).await.unwrap();
    assert_eq!(
        stream.next_bytes().await.unwrap(),
        Some(b"\xff\xfe binary".to_vec())
    );
    assert_eq!(stream.next_bytes().await.unwrap(), None);
}

#[tokio::test]
async fn test_drain_is_idempotent() {
    let lines = [overview_line(1, "a"), overview_line(2, "b")];
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut script = b"224 overview\r\n".to_vec();
    script.extend(body(&lines));
    script.extend_from_slice(b"111 20240102030405\r\n");

    let (mut client, _log) = common::connect(&script).await;

    let mut records = client.xover("1-2").await.unwrap();
    records.drain().await.unwrap();
    assert!(records.is_exhausted());
    records.drain().await.unwrap();
    assert_eq!(records.next_record().await.unwrap(), None);
    drop(records);

    // Nothing left to drain: the next reply is read directly
    let date = client.date().await.unwrap();
    assert_eq!(date.to_rfc3339(), "2024-01-02T03:04:05+00:00");
}

#[tokio::test]
async fn test_abandoned_body_is_drained_before_next_command() {
    let lines = [
        overview_line(1, "a"),
        overview_line(2, "b"),
        overview_line(3, "c"),
    ];
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut script = b"224 overview\r\n".to_vec();
    script.extend(body(&lines));
    script.extend_from_slice(b"211 5 1 5 alt.test\r\n");

    let (mut client, log) = common::connect(&script).await;

    {
        let mut records = client.xover("1-3").await.unwrap();
        let first = records.next_record().await.unwrap().unwrap();
        assert_eq!(first.article_number, 1);
    }
    assert!(client.has_pending_body());

    let info = client.group("alt.test").await.unwrap();
    assert_eq!(info.count, 5);
    assert_eq!((info.first, info.last), (1, 5));
    assert_eq!(client.current_group(), Some("alt.test"));
    assert!(!client.has_pending_body());
    assert!(!client.is_broken());

    drop(client);
    assert_eq!(log.commands().await, "XOVER 1-3\r\nGROUP alt.test\r\n");
}

#[tokio::test]
async fn test_truncated_body() {
    let mut script = b"224 overview\r\n".to_vec();
    script.extend_from_slice(overview_line(1, "a").as_bytes());
    script.extend_from_slice(b"\r\n");
    script.extend_from_slice(overview_line(2, "b").as_bytes());
    script.extend_from_slice(b"\r\n");

    let (mut client, _log) = common::connect(&script).await;

    let mut records = client.xover("1-3").await.unwrap();
    assert!(records.next_record().await.unwrap().is_some());
    assert!(records.next_record().await.unwrap().is_some());
    let err = records.next_record().await.unwrap_err();
    assert!(matches!(err, NntpError::TruncatedResponse));
    assert!(err.is_fatal());
    assert!(records.is_exhausted());
    drop(records);

    assert!(client.is_broken());
    let err = client.group("alt.test").await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionCorrupted(_)));
}

#[tokio::test]
async fn test_truncation_found_while_draining() {
    let mut script = b"224 overview\r\n".to_vec();
    script.extend_from_slice(overview_line(1, "a").as_bytes());
    script.extend_from_slice(b"\r\n");

    let (mut client, _log) = common::connect(&script).await;

    drop(client.xover("1-").await.unwrap());

    let err = client.group("alt.test").await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionCorrupted(_)));
    assert!(client.is_broken());
}

#[tokio::test]
async fn test_malformed_record_does_not_end_stream() {
    let good = overview_line(2, "good");
    let mut script = b"224 overview\r\n".to_vec();
    script.extend(body(&["not an overview line", good.as_str()]));

    let (mut client, _log) = common::connect(&script).await;

    let mut records = client.xover("1-2").await.unwrap();
    let err = records.next_record().await.unwrap_err();
    assert!(matches!(err, NntpError::InvalidResponse(_)));
    assert!(!err.is_fatal());

    let entry = records.next_record().await.unwrap().unwrap();
    assert_eq!(entry.subject, "good");
    assert_eq!(records.next_record().await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_while_draining_corrupts_connection() {
    let mut script = b"224 overview\r\n".to_vec();
    script.extend_from_slice(overview_line(1, "a").as_bytes());
    script.extend_from_slice(b"\r\n");

    let (mut client, _log) = common::connect_stalled(&script).await;

    {
        let mut records = client.xover("1-").await.unwrap();
        assert!(records.next_record().await.unwrap().is_some());
    }

    let err = client.group("alt.test").await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionCorrupted(_)));
    assert!(client.is_broken());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_while_iterating() {
    let mut script = b"224 overview\r\n".to_vec();
    script.extend_from_slice(overview_line(1, "a").as_bytes());
    script.extend_from_slice(b"\r\n");

    let (mut client, _log) = common::connect_stalled(&script).await;

    let mut records = client.xover("1-").await.unwrap();
    assert!(records.next_record().await.unwrap().is_some());
    let err = records.next_record().await.unwrap_err();
    assert!(matches!(err, NntpError::Timeout));
    drop(records);

    assert!(client.is_broken());
}

#[tokio::test(start_paused = true)]
async fn test_configured_timeouts() {
    let config = ServerConfig::clone(&common::config())
        .with_status_timeout(Duration::from_secs(5))
        .with_body_timeout(Duration::from_secs(7));

    let mut script = b"224 overview\r\n".to_vec();
    script.extend_from_slice(overview_line(1, "a").as_bytes());
    script.extend_from_slice(b"\r\n");
    let (mut client, _log) = common::connect_stalled_with(config.clone(), &script).await;

    let started = Instant::now();
    let mut records = client.xover("1-").await.unwrap();
    assert!(records.next_record().await.unwrap().is_some());
    let err = records.next_record().await.unwrap_err();
    assert!(matches!(err, NntpError::Timeout));
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(7) && waited < Duration::from_secs(8));
    drop(records);

    // No reply at all: the status timeout applies
    let (mut client, _log) = common::connect_stalled_with(config, b"").await;
    let started = Instant::now();
    let err = client.date().await.unwrap_err();
    assert!(matches!(err, NntpError::Timeout));
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(5) && waited < Duration::from_secs(6));
}

#[tokio::test]
async fn test_raw_xover_lines_then_exhaustion() {
    let script = b"224 overview follows\r\n1\tfoo\r\n2\tbar\r\n3\tbaz\r\n.\r\n";
    let (mut client, log) = common::connect(script).await;

    let mut stream = client.xover("1-3").await.unwrap().into_inner();
    let mut lines = Vec::new();
    while let Some(line) = stream.next_line().await.unwrap() {
        lines.push(line);
    }
    assert_eq!(lines, ["1\tfoo", "2\tbar", "3\tbaz"]);
    assert!(stream.is_exhausted());
    assert_eq!(stream.next_line().await.unwrap(), None);
    drop(stream);

    drop(client);
    assert_eq!(log.commands().await, "XOVER 1-3\r\n");
}

#[tokio::test]
async fn test_raw_lines_cut_before_terminator() {
    let script = b"224 overview follows\r\n1\tfoo\r\n2\tbar\r\n";
    let (mut client, _log) = common::connect(script).await;

    let mut stream = client.xover("1-3").await.unwrap().into_inner();
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("1\tfoo"));
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("2\tbar"));
    let err = stream.next_line().await.unwrap_err();
    assert!(matches!(err, NntpError::TruncatedResponse));
    drop(stream);

    assert!(client.is_broken());
}

#[tokio::test]
async fn test_drain_after_error_reports_broken_connection() {
    let script = b"224 overview follows\r\n1\tfoo\r\n";
    let (mut client, _log) = common::connect(script).await;

    let mut stream = client.xover("1-3").await.unwrap().into_inner();
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("1\tfoo"));
    assert!(matches!(
        stream.next_line().await.unwrap_err(),
        NntpError::TruncatedResponse
    ));
    assert!(stream.is_exhausted());

    // Nothing left to read, but the body did not end cleanly
    let err = stream.drain().await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionCorrupted(_)), "{err:?}");
    assert_eq!(stream.next_line().await.unwrap(), None);
    drop(stream);

    assert!(client.is_broken());
}

#[tokio::test]
async fn test_typed_drain_after_error() {
    let script = b"224 overview follows\r\n1\tfoo\r\n";
    let (mut client, _log) = common::connect(script).await;

    let mut records = client.xover("1-3").await.unwrap();
    // "1\tfoo" is not a valid overview line, then the body is cut
    assert!(records.next_record().await.is_err());
    assert!(!records.is_exhausted());
    assert!(records.next_record().await.is_err());

    let err = records.drain().await.unwrap_err();
    assert!(matches!(err, NntpError::ConnectionCorrupted(_)), "{err:?}");
}
