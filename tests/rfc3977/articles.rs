//! RFC 3977 Section 6.2 - Retrieval of Articles and Article Sections
//!
//! ARTICLE, HEAD, BODY and STAT.

use crate::common::{self, body};
use nntp_stream::commands::parse_headers;
use nntp_stream::NntpError;

#[tokio::test]
async fn test_article_by_message_id() {
    let mut script = b"220 0 <45223423@example.com>\r\n".to_vec();
    script.extend(body(&[
        "Path: pathost!demo!whitehouse!not-for-mail",
        "From: \"Demo User\" <nobody@example.net>",
        "Subject: I am just a test article",
        "",
        "This is just a test article.",
    ]));
    let (mut client, log) = common::connect(&script).await;

    let stream = client.article(Some("<45223423@example.com>")).await.unwrap();
    assert_eq!(stream.status().code, 220);
    let lines = stream.collect_lines().await.unwrap();

    let headers = parse_headers(&lines).unwrap();
    assert_eq!(headers.len(), 3);
    assert_eq!(headers[2], ("Subject".to_string(), "I am just a test article".to_string()));
    assert_eq!(lines.last().unwrap(), "This is just a test article.");

    drop(client);
    assert_eq!(log.commands().await, "ARTICLE <45223423@example.com>\r\n");
}

#[tokio::test]
async fn test_head_with_folded_header() {
    let mut script = b"221 3000234 <45223423@example.com>\r\n".to_vec();
    script.extend(body(&[
        "Subject: a long",
        "\tsubject line",
        "Message-ID: <45223423@example.com>",
    ]));
    let (mut client, _log) = common::connect(&script).await;

    let lines = client
        .head(Some("3000234"))
        .await
        .unwrap()
        .collect_lines()
        .await
        .unwrap();
    let headers = parse_headers(&lines).unwrap();
    assert_eq!(headers[0].1, "a long\tsubject line");
    assert_eq!(headers[1].0, "Message-ID");
}

#[tokio::test]
async fn test_head_parsed() {
    let mut script = b"221 3000234 <45223423@example.com>\r\n".to_vec();
    script.extend(body(&[
        "Path: pathost!demo!whitehouse!not-for-mail",
        "Subject: a long",
        " subject line",
        "Message-ID: <45223423@example.com>",
    ]));
    script.extend_from_slice(b"221 1 <bad@example.com>\r\n");
    script.extend(body(&["not a header line"]));
    script.extend_from_slice(b"111 20240101000000\r\n");
    let (mut client, log) = common::connect(&script).await;

    let headers = client.head_parsed(Some("3000234")).await.unwrap();
    assert_eq!(headers.len(), 3);
    assert_eq!(headers[1], ("Subject".to_string(), "a long subject line".to_string()));
    assert_eq!(headers[2].1, "<45223423@example.com>");

    let err = client.head_parsed(Some("1")).await.unwrap_err();
    assert!(matches!(err, NntpError::InvalidResponse(_)));
    // Parsing failed after the body was read in full
    assert!(!client.is_broken());
    assert!(client.date().await.is_ok());

    drop(client);
    assert_eq!(log.commands().await, "HEAD 3000234\r\nHEAD 1\r\nDATE\r\n");
}

#[tokio::test]
async fn test_body_of_current_article() {
    let mut script = b"222 3000234 <45223423@example.com>\r\n".to_vec();
    script.extend(body(&["line one", "line two"]));
    let (mut client, log) = common::connect(&script).await;

    let mut stream = client.body(None).await.unwrap();
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("line one"));
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("line two"));
    assert_eq!(stream.next_line().await.unwrap(), None);
    assert!(stream.is_exhausted());

    drop(client);
    assert_eq!(log.commands().await, "BODY\r\n");
}

#[tokio::test]
async fn test_missing_article() {
    let script = b"430 No article with that message-id\r\n223 0 <a@example.com>\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.article(Some("<missing@example.com>")).await.unwrap_err();
    assert_eq!(err.code(), Some(430));
    assert!(!client.has_pending_body());

    let info = client.stat(Some("<a@example.com>")).await.unwrap();
    assert_eq!(info.number, 0);
    assert_eq!(info.message_id, "<a@example.com>");
}

#[tokio::test]
async fn test_stat_current_article() {
    let script = b"223 3000234 <45223423@example.com>\r\n";
    let (mut client, log) = common::connect(script).await;

    let info = client.stat(None).await.unwrap();
    assert_eq!(info.number, 3000234);

    drop(client);
    assert_eq!(log.commands().await, "STAT\r\n");
}
