//! Group selection and newsgroup-related commands

use super::{Request, Verb};
use crate::error::{NntpError, Result};
use crate::response::StatusReply;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Build GROUP command
pub fn group(newsgroup: &str) -> Request {
    Request::new(Verb::Group, Some(newsgroup))
}

/// Build LISTGROUP command (RFC 3977 §6.1.2)
///
/// With no group the currently selected group is listed.
pub fn listgroup(newsgroup: Option<&str>, range: Option<&str>) -> Request {
    let args = match (newsgroup, range) {
        (Some(group), Some(range)) => Some(format!("{} {}", group, range)),
        (Some(group), None) => Some(group.to_string()),
        (None, _) => None,
    };
    Request::new(Verb::ListGroup, args.as_deref())
}

/// Build NEWGROUPS command (RFC 3977 §7.3)
///
/// Format: `NEWGROUPS yyyymmdd hhmmss GMT`
pub fn newgroups(since: DateTime<Utc>) -> Request {
    Request::new(Verb::NewGroups, Some(&format_timestamp(since)))
}

/// Format a timestamp as the `yyyymmdd hhmmss GMT` argument pair
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%d %H%M%S GMT").to_string()
}

/// Parse the DATE reply text (`yyyymmddhhmmss`, always UTC)
pub fn parse_date_response(message: &str) -> Result<DateTime<Utc>> {
    let value = message.split_whitespace().next().unwrap_or_default();
    if value.len() != 14 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NntpError::InvalidResponse(format!(
            "Invalid DATE response: {}",
            message
        )));
    }

    NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| NntpError::InvalidResponse(format!("Invalid DATE response: {}", message)))
}

/// Group information returned by the GROUP command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Estimated number of articles in the group
    pub count: u64,
    /// Number of the first article
    pub first: u64,
    /// Number of the last article
    pub last: u64,
    /// Group name as echoed by the server
    pub name: String,
}

/// Parse GROUP reply text
///
/// Response format: "211 count first last group-name"
pub fn parse_group_response(reply: &StatusReply) -> Result<GroupInfo> {
    let invalid = || NntpError::InvalidResponse(format!("Invalid GROUP status: {}", reply.message));
    let mut parts = reply.message.split_whitespace();

    let count = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let first = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let last = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let name = parts.next().ok_or_else(invalid)?.to_string();

    Ok(GroupInfo {
        count,
        first,
        last,
        name,
    })
}

/// Active newsgroup entry from LIST ACTIVE or NEWGROUPS (RFC 3977 §7.6.3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveGroup {
    /// Newsgroup name
    pub name: String,
    /// Highest article number
    pub high: u64,
    /// Lowest article number
    pub low: u64,
    /// Posting status: "y", "n", "m" or a server-specific flag
    pub status: String,
}

/// Parse one LIST ACTIVE / NEWGROUPS line
///
/// Format: "name high low status"
pub fn parse_active_line(line: &str) -> Result<ActiveGroup> {
    let invalid = || NntpError::InvalidResponse(format!("Invalid newsgroup line: {}", line));
    let mut parts = line.split_whitespace();

    let name = parts.next().ok_or_else(invalid)?.to_string();
    let high = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let low = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let status = parts.next().ok_or_else(invalid)?.to_string();

    Ok(ActiveGroup {
        name,
        high,
        low,
        status,
    })
}

/// Parse one LISTGROUP line (an article number)
pub fn parse_article_number_line(line: &str) -> Result<u64> {
    line.trim()
        .parse()
        .map_err(|_| NntpError::InvalidResponse(format!("Invalid article number: {}", line)))
}
