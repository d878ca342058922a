//! RFC 2980 Section 2.6 - XHDR, and its RFC 3977 successor HDR

use crate::common::{self, body};

#[tokio::test]
async fn test_xhdr_range() {
    let mut script = b"221 Subject fields follow\r\n".to_vec();
    script.extend(body(&[
        "3000234 I am just a test article",
        "3000235 Re: I am just a test article",
        "3000236",
    ]));
    let (mut client, log) = common::connect(&script).await;

    let entries = client
        .xhdr("Subject", Some("3000234-3000236"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].article_number, 3000235);
    assert_eq!(entries[1].value, "Re: I am just a test article");
    assert_eq!(entries[2].value, "");

    drop(client);
    assert_eq!(log.commands().await, "XHDR Subject 3000234-3000236\r\n");
}

#[tokio::test]
async fn test_hdr_by_message_id() {
    let mut script = b"225 Headers follow\r\n".to_vec();
    script.extend(body(&["0 \"Demo User\" <nobody@example.com>"]));
    let (mut client, log) = common::connect(&script).await;

    let mut entries = client
        .hdr("From", Some("<i.am.a.test.article@example.com>"))
        .await
        .unwrap();
    let entry = entries.next_record().await.unwrap().unwrap();
    assert_eq!(entry.article_number, 0);
    assert_eq!(entry.value, "\"Demo User\" <nobody@example.com>");
    assert!(entries.next_record().await.unwrap().is_none());
    drop(entries);

    drop(client);
    assert_eq!(
        log.commands().await,
        "HDR From <i.am.a.test.article@example.com>\r\n"
    );
}

#[tokio::test]
async fn test_hdr_current_article() {
    let mut script = b"225 Headers follow\r\n".to_vec();
    script.extend(body(&["3000234 I am just a test article"]));
    let (mut client, log) = common::connect(&script).await;

    let entries = client.hdr("Subject", None).await.unwrap().collect().await.unwrap();
    assert_eq!(entries[0].article_number, 3000234);

    drop(client);
    assert_eq!(log.commands().await, "HDR Subject\r\n");
}

#[tokio::test]
async fn test_over_by_message_id() {
    let mut script = b"224 Overview information follows\r\n".to_vec();
    script.extend(body(&[
        "0\tI am just a test article\tdemo@example.com\t6 Oct 1998 04:38:40 -0500\t<45223423@example.com>\t<45454@example.net>\t1234\t17",
    ]));
    let (mut client, log) = common::connect(&script).await;

    let entries = client
        .over(Some("<45223423@example.com>"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(entries[0].article_number, 0);
    assert_eq!(entries[0].lines, 17);

    drop(client);
    assert_eq!(log.commands().await, "OVER <45223423@example.com>\r\n");
}
