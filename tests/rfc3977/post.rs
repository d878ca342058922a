//! RFC 3977 Section 6.3.1 - POST

use crate::common;
use nntp_stream::NntpError;

const ARTICLE: &str = "From: \"Demo User\" <nobody@example.net>\n\
                       Newsgroups: misc.test\n\
                       Subject: I am just a test article\n\
                       \n\
                       .signature-like line\n\
                       .\n\
                       last line\n";

#[tokio::test]
async fn test_post_stuffs_article_on_the_wire() {
    let script = b"340 Input article; end with <CR-LF>.<CR-LF>\r\n240 Article received OK\r\n";
    let (mut client, log) = common::connect(script).await;

    assert_eq!(client.post(ARTICLE).await.unwrap(), None);
    assert!(!client.is_broken());

    drop(client);
    assert_eq!(
        log.commands().await,
        "POST\r\n\
         From: \"Demo User\" <nobody@example.net>\r\n\
         Newsgroups: misc.test\r\n\
         Subject: I am just a test article\r\n\
         \r\n\
         ..signature-like line\r\n\
         ..\r\n\
         last line\r\n\
         .\r\n"
    );
}

#[tokio::test]
async fn test_post_returns_assigned_message_id() {
    let script = b"340 Input article; end with <CR-LF>.<CR-LF>\r\n\
                   240 <i.am.a.test.article@example.com> Article received OK\r\n\
                   111 20240101000000\r\n";
    let (mut client, log) = common::connect(script).await;

    let id = client.post(ARTICLE).await.unwrap();
    assert_eq!(id.as_deref(), Some("<i.am.a.test.article@example.com>"));
    // The session carries on after the post
    assert!(client.date().await.is_ok());

    drop(client);
    assert!(log.commands().await.ends_with(".\r\nDATE\r\n"));
}

#[tokio::test]
async fn test_posting_not_permitted() {
    let script = b"440 Posting not permitted\r\n";
    let (mut client, log) = common::connect(script).await;

    let err = client.post(ARTICLE).await.unwrap_err();
    assert_eq!(err.code(), Some(440));
    assert!(!client.is_broken());

    // The article is never sent
    drop(client);
    assert_eq!(log.commands().await, "POST\r\n");
}

#[tokio::test]
async fn test_posting_failed() {
    let script = b"340 send article\r\n441 Posting failed\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.post(ARTICLE).await.unwrap_err();
    assert_eq!(err.code(), Some(441));
    assert!(!client.is_broken());
}

#[tokio::test]
async fn test_article_with_bare_cr_is_refused() {
    let (mut client, log) = common::connect(b"").await;

    let err = client.post("Subject: x\n\nbad\rline\n").await.unwrap_err();
    assert!(matches!(err, NntpError::InvalidArticle(_)));

    drop(client);
    assert_eq!(log.commands().await, "");
}
