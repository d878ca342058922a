//! RFC 3977 Sections 7.3, 7.4, 7.6 and 8.4 - Listing Commands
//!
//! LIST variants, NEWGROUPS and NEWNEWS.

use crate::common::{self, body};
use chrono::{TimeZone, Utc};

#[tokio::test]
async fn test_list_active() {
    let mut script = b"215 list of newsgroups follows\r\n".to_vec();
    script.extend(body(&[
        "misc.test 3002322 3000234 y",
        "comp.risks 442001 1 m",
        "alt.rfc-writers.recovery 4 1 y",
    ]));
    let (mut client, log) = common::connect(&script).await;

    let groups = client
        .list_active(Some("*"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].name, "misc.test");
    assert_eq!(groups[0].high, 3002322);
    assert_eq!(groups[0].low, 3000234);
    assert_eq!(groups[1].status, "m");

    drop(client);
    assert_eq!(log.commands().await, "LIST ACTIVE *\r\n");
}

#[tokio::test]
async fn test_list_active_times() {
    let mut script = b"215 information follows\r\n".to_vec();
    script.extend(body(&[
        "misc.test 930445408 <creatme@isc.org>",
        "alt.rfc-writers.recovery 930562309 <m@example.com>",
    ]));
    let (mut client, _log) = common::connect(&script).await;

    let times = client
        .list_active_times(None)
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(times[0].name, "misc.test");
    assert_eq!(times[0].created.timestamp(), 930445408);
    assert_eq!(times[1].creator, "<m@example.com>");
}

#[tokio::test]
async fn test_list_newsgroups() {
    let mut script = b"215 information follows\r\n".to_vec();
    script.extend(body(&[
        "misc.test General Usenet testing",
        "alt.rfc-writers.recovery\tRFC Writers Recovery",
        "tx.natives.recovery",
    ]));
    let (mut client, log) = common::connect(&script).await;

    let mut groups = client.list_newsgroups(Some("*.recovery")).await.unwrap();
    let first = groups.next_record().await.unwrap().unwrap();
    assert_eq!(first.description, "General Usenet testing");
    let second = groups.next_record().await.unwrap().unwrap();
    assert_eq!(second.name, "alt.rfc-writers.recovery");
    assert_eq!(second.description, "RFC Writers Recovery");
    let third = groups.next_record().await.unwrap().unwrap();
    assert_eq!(third.description, "");
    assert!(groups.next_record().await.unwrap().is_none());
    drop(groups);

    drop(client);
    assert_eq!(log.commands().await, "LIST NEWSGROUPS *.recovery\r\n");
}

#[tokio::test]
async fn test_list_overview_fmt() {
    let mut script = b"215 Order of fields in overview database.\r\n".to_vec();
    script.extend(body(&[
        "Subject:",
        "From:",
        "Date:",
        "Message-ID:",
        "References:",
        ":bytes",
        ":lines",
        "Xref:full",
    ]));
    let (mut client, _log) = common::connect(&script).await;

    let fields = client.list_overview_fmt().await.unwrap();
    assert_eq!(fields.len(), 8);
    assert_eq!(fields[0].name, "Subject");
    assert!(!fields[0].full);
    assert_eq!(fields[5].name, "bytes");
    assert_eq!(fields[7].name, "Xref");
    assert!(fields[7].full);
}

#[tokio::test]
async fn test_list_headers() {
    let mut script = b"215 headers supported:\r\n".to_vec();
    script.extend(body(&["Subject", "Message-ID", ":bytes"]));
    let (mut client, log) = common::connect(&script).await;

    let headers = client.list_headers(Some("RANGE")).await.unwrap();
    assert_eq!(headers, vec!["Subject", "Message-ID", ":bytes"]);

    drop(client);
    assert_eq!(log.commands().await, "LIST HEADERS RANGE\r\n");
}

#[tokio::test]
async fn test_newgroups() {
    let mut script = b"231 list of new newsgroups follows\r\n".to_vec();
    script.extend(body(&["alt.rfc-writers.recovery 4 1 y"]));
    let (mut client, log) = common::connect(&script).await;

    let since = Utc.with_ymd_and_hms(1999, 6, 20, 0, 0, 0).unwrap();
    let groups = client
        .newgroups(since)
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "alt.rfc-writers.recovery");

    drop(client);
    assert_eq!(log.commands().await, "NEWGROUPS 19990620 000000 GMT\r\n");
}

#[tokio::test]
async fn test_newnews_empty_list() {
    let mut script = b"230 list of new articles by message-id follows\r\n".to_vec();
    script.extend(body(&[]));
    let (mut client, log) = common::connect(&script).await;

    let since = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
    let mut ids = client.newnews("news.*", since).await.unwrap();
    assert!(ids.next_record().await.unwrap().is_none());
    drop(ids);

    drop(client);
    assert_eq!(
        log.commands().await,
        "NEWNEWS news.* 20240101 123000 GMT\r\n"
    );
}

#[tokio::test]
async fn test_newnews_message_ids() {
    let mut script = b"230 list follows\r\n".to_vec();
    script.extend(body(&["<i.am.a.new.article@example.com>", "<i.am.another@example.com>"]));
    let (mut client, _log) = common::connect(&script).await;

    let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let ids = client
        .newnews("*", since)
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(
        ids,
        vec!["<i.am.a.new.article@example.com>", "<i.am.another@example.com>"]
    );
}
