//! RFC 2980 Section 2.8 - XOVER

use crate::common::{self, body, overview_line};
use nntp_stream::ArticleRange;

#[tokio::test]
async fn test_xover_with_xref_field() {
    let line = format!(
        "{}\tXref: news.example.com misc.test:3000234",
        overview_line(3000234, "I am just a test article")
    );
    let mut script = b"224 Overview information follows\r\n".to_vec();
    script.extend(body(&[line.as_str()]));
    let (mut client, log) = common::connect(&script).await;

    let range = ArticleRange::From(3000234).to_string();
    let entries = client.xover(&range).await.unwrap().collect().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject, "I am just a test article");
    assert_eq!(
        entries[0].extra,
        vec!["Xref: news.example.com misc.test:3000234"]
    );

    drop(client);
    assert_eq!(log.commands().await, "XOVER 3000234-\r\n");
}

#[tokio::test]
async fn test_xover_empty_range() {
    let mut script = b"224 Overview information follows\r\n".to_vec();
    script.extend(body(&[]));
    let (mut client, _log) = common::connect(&script).await;

    let entries = client
        .xover(&ArticleRange::Between(10, 20).to_string())
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_xover_unknown_sizes() {
    let line = "7\tsubject\tposter\tdate\t<7@example.com>\t<6@example.com>\t\t";
    let mut script = b"224 data follows\r\n".to_vec();
    script.extend(body(&[line]));
    let (mut client, _log) = common::connect(&script).await;

    let mut records = client.xover("7").await.unwrap();
    let entry = records.next_record().await.unwrap().unwrap();
    assert_eq!(entry.references, "<6@example.com>");
    assert_eq!((entry.bytes, entry.lines), (0, 0));
}

#[tokio::test]
async fn test_xover_no_group_selected() {
    let script = b"412 No news group current selected\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.xover("1-10").await.unwrap_err();
    assert_eq!(err.code(), Some(412));
    assert!(!client.is_broken());
}

#[tokio::test]
async fn test_list_extensions() {
    let mut script = b"202 Extensions supported:\r\n".to_vec();
    script.extend(body(&[" OVER", " HDR", " LISTGROUP"]));
    let (mut client, log) = common::connect(&script).await;

    let extensions = client.list_extensions().await.unwrap();
    assert_eq!(extensions, vec!["OVER", "HDR", "LISTGROUP"]);

    drop(client);
    assert_eq!(log.commands().await, "LIST EXTENSIONS\r\n");
}
