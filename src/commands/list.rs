//! LIST command variants, NEWNEWS and their line parsers

use super::{Request, Verb, format_timestamp};
use crate::error::{NntpError, Result};
use chrono::{DateTime, Utc};

fn list_keyword(keyword: &str, wildmat: Option<&str>) -> Request {
    let args = match wildmat {
        Some(wildmat) => format!("{} {}", keyword, wildmat),
        None => keyword.to_string(),
    };
    Request::new(Verb::List, Some(&args))
}

/// Build LIST ACTIVE command (RFC 3977 §7.6.3)
///
/// Lists active newsgroups matching the wildmat pattern.
pub fn list_active(wildmat: Option<&str>) -> Request {
    list_keyword("ACTIVE", wildmat)
}

/// Build LIST ACTIVE.TIMES command (RFC 3977 §7.6.4)
pub fn list_active_times(wildmat: Option<&str>) -> Request {
    list_keyword("ACTIVE.TIMES", wildmat)
}

/// Build LIST NEWSGROUPS command (RFC 3977 §7.6.6)
pub fn list_newsgroups(wildmat: Option<&str>) -> Request {
    list_keyword("NEWSGROUPS", wildmat)
}

/// Build LIST EXTENSIONS command (pre-RFC 3977 servers)
pub fn list_extensions() -> Request {
    Request::new(Verb::ListExtensions, None)
}

/// Build NEWNEWS command (RFC 3977 §7.4)
///
/// Format: `NEWNEWS wildmat yyyymmdd hhmmss GMT`
pub fn newnews(wildmat: &str, since: DateTime<Utc>) -> Request {
    Request::new(
        Verb::NewNews,
        Some(&format!("{} {}", wildmat, format_timestamp(since))),
    )
}

/// Newsgroup information from LIST NEWSGROUPS (RFC 3977 Section 7.6.6)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsgroupInfo {
    /// Newsgroup name
    pub name: String,
    /// Newsgroup description (may be empty)
    pub description: String,
}

/// Parse one LIST NEWSGROUPS line
///
/// Format: "group description text"
pub fn parse_newsgroup_line(line: &str) -> Result<NewsgroupInfo> {
    let line = line.trim();
    if line.is_empty() {
        return Err(NntpError::InvalidResponse(
            "Empty LIST NEWSGROUPS line".to_string(),
        ));
    }

    // Split on first whitespace only - description may contain spaces
    let (name, description) = match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim()),
        None => (line, ""),
    };

    Ok(NewsgroupInfo {
        name: name.to_string(),
        description: description.to_string(),
    })
}

/// Newsgroup creation time information from LIST ACTIVE.TIMES
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTime {
    /// Newsgroup name
    pub name: String,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Creator identifier (typically email or username)
    pub creator: String,
}

/// Parse one LIST ACTIVE.TIMES line
///
/// Format: "group epoch-seconds creator"
pub fn parse_active_times_line(line: &str) -> Result<GroupTime> {
    let invalid = || NntpError::InvalidResponse(format!("Invalid LIST ACTIVE.TIMES: {}", line));
    let mut parts = line.split_whitespace();

    let name = parts.next().ok_or_else(invalid)?.to_string();
    let seconds: i64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let created = DateTime::from_timestamp(seconds, 0).ok_or_else(invalid)?;
    let creator = parts.next().ok_or_else(invalid)?.to_string();

    Ok(GroupTime {
        name,
        created,
        creator,
    })
}

/// Parse a line holding a single token (message-id, capability, field name)
pub fn parse_token_line(line: &str) -> Result<String> {
    Ok(line.trim().to_string())
}
