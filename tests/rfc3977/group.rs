//! RFC 3977 Section 6.1 - Group and Article Selection
//!
//! GROUP, LISTGROUP, NEXT and LAST.

use crate::common::{self, body};
use nntp_stream::NntpError;

#[tokio::test]
async fn test_group_selects_newsgroup() {
    let script = b"211 1234 3000234 3002322 misc.test\r\n";
    let (mut client, log) = common::connect(script).await;

    let info = client.group("misc.test").await.unwrap();
    assert_eq!(info.count, 1234);
    assert_eq!(info.first, 3000234);
    assert_eq!(info.last, 3002322);
    assert_eq!(info.name, "misc.test");
    assert_eq!(client.current_group(), Some("misc.test"));

    drop(client);
    assert_eq!(log.commands().await, "GROUP misc.test\r\n");
}

#[tokio::test]
async fn test_group_empty_newsgroup() {
    let script = b"211 0 4000 3999 example.currently.empty.newsgroup\r\n";
    let (mut client, _log) = common::connect(script).await;

    let info = client
        .group("example.currently.empty.newsgroup")
        .await
        .unwrap();
    assert_eq!(info.count, 0);
    assert!(info.last < info.first);
}

#[tokio::test]
async fn test_group_unparseable_status() {
    let script = b"211 lots of articles\r\n211 1 1 1 alt.test\r\n";
    let (mut client, _log) = common::connect(script).await;

    let err = client.group("alt.test").await.unwrap_err();
    assert!(matches!(err, NntpError::InvalidResponse(_)));
    assert!(!client.is_broken());

    assert!(client.group("alt.test").await.is_ok());
}

#[tokio::test]
async fn test_listgroup_streams_article_numbers() {
    let mut script = b"211 2000 3000234 3002322 misc.test list follows\r\n".to_vec();
    script.extend(body(&["3000234", "3000237", "3000238"]));
    let (mut client, log) = common::connect(&script).await;

    let mut numbers = client
        .listgroup(Some("misc.test"), Some("3000234-3000238"))
        .await
        .unwrap();
    assert_eq!(numbers.status().code, 211);
    assert_eq!(numbers.next_record().await.unwrap(), Some(3000234));
    let rest = numbers.collect().await.unwrap();
    assert_eq!(rest, vec![3000237, 3000238]);
    assert_eq!(client.current_group(), Some("misc.test"));

    drop(client);
    assert_eq!(
        log.commands().await,
        "LISTGROUP misc.test 3000234-3000238\r\n"
    );
}

#[tokio::test]
async fn test_listgroup_without_group_selected() {
    let script = b"412 No newsgroup selected\r\n";
    let (mut client, log) = common::connect(script).await;

    let err = client.listgroup(None, None).await.unwrap_err();
    assert_eq!(err.code(), Some(412));

    drop(client);
    assert_eq!(log.commands().await, "LISTGROUP\r\n");
}

#[tokio::test]
async fn test_next_and_last() {
    let script = b"223 3000237 <668929@example.org> retrieved\r\n\
                   223 3000234 <45223423@example.com> retrieved\r\n\
                   421 No next article in this group\r\n";
    let (mut client, log) = common::connect(script).await;

    let next = client.next().await.unwrap();
    assert_eq!(next.number, 3000237);
    assert_eq!(next.message_id, "<668929@example.org>");

    let last = client.last().await.unwrap();
    assert_eq!(last.number, 3000234);

    let err = client.next().await.unwrap_err();
    assert_eq!(err.code(), Some(421));
    assert!(!client.is_broken());

    drop(client);
    assert_eq!(log.commands().await, "NEXT\r\nLAST\r\nNEXT\r\n");
}
