//! OVER/XOVER/XZVER commands and overview data parsing

use super::{Request, Verb};
use crate::error::{NntpError, Result};
use std::fmt;

/// Article number range argument
///
/// Formats as `n`, `n-` or `n-m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleRange {
    /// A single article
    Single(u64),
    /// Everything from this article up to the group's high-water mark
    From(u64),
    /// An inclusive range
    Between(u64, u64),
}

impl fmt::Display for ArticleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleRange::Single(n) => write!(f, "{}", n),
            ArticleRange::From(n) => write!(f, "{}-", n),
            ArticleRange::Between(first, last) => write!(f, "{}-{}", first, last),
        }
    }
}

/// Build XOVER command for fetching article overview data
pub fn xover(range: &str) -> Request {
    Request::new(Verb::XOver, Some(range))
}

/// Build XZVER command: XOVER with a yEnc-wrapped deflate body
pub fn xzver(range: &str) -> Request {
    Request::new(Verb::XzVer, Some(range))
}

/// Build OVER command (RFC 3977 §8.3)
///
/// With `None` the current article is used.
pub fn over(range: Option<&str>) -> Request {
    Request::new(Verb::Over, range)
}

/// Build LIST OVERVIEW.FMT command (RFC 3977 §8.4)
pub fn list_overview_fmt() -> Request {
    Request::new(Verb::List, Some("OVERVIEW.FMT"))
}

/// Overview entry containing article metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewEntry {
    /// Article number within the newsgroup
    pub article_number: u64,
    /// Article subject line
    pub subject: String,
    /// Article author (From header)
    pub author: String,
    /// Article date string
    pub date: String,
    /// Unique message ID
    pub message_id: String,
    /// References to parent articles (for threading)
    pub references: String,
    /// Article size in bytes
    pub bytes: u64,
    /// Number of lines in the article
    pub lines: u64,
    /// Additional fields listed after `:lines` in LIST OVERVIEW.FMT (e.g. Xref)
    pub extra: Vec<String>,
}

/// Parse an overview line into its fields
///
/// Format: "article-number\tsubject\tauthor\tdate\tmessage-id\treferences\tbytes\tlines[\textra...]"
pub fn parse_overview_line(line: &str) -> Result<OverviewEntry> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 8 {
        return Err(NntpError::InvalidResponse(format!(
            "Invalid overview line: {}",
            line
        )));
    }

    let number = |field: &str| -> Result<u64> {
        let field = field.trim();
        // Servers leave :bytes / :lines empty when unknown
        if field.is_empty() {
            return Ok(0);
        }
        field
            .parse()
            .map_err(|_| NntpError::InvalidResponse(format!("Invalid overview line: {}", line)))
    };

    let article_number = parts[0]
        .trim()
        .parse()
        .map_err(|_| NntpError::InvalidResponse(format!("Invalid overview line: {}", line)))?;

    Ok(OverviewEntry {
        article_number,
        subject: parts[1].to_string(),
        author: parts[2].to_string(),
        date: parts[3].to_string(),
        message_id: parts[4].to_string(),
        references: parts[5].to_string(),
        bytes: number(parts[6])?,
        lines: number(parts[7])?,
        extra: parts[8..].iter().map(|s| s.to_string()).collect(),
    })
}

/// One field of the overview format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewField {
    /// Field name (e.g. "Subject", "bytes", "Xref")
    pub name: String,
    /// Whether the field data includes the header name ("Xref:full")
    pub full: bool,
}

/// Parse one LIST OVERVIEW.FMT line
///
/// Example lines: "Subject:", ":bytes", "Xref:full"
pub fn parse_overview_fmt_line(line: &str) -> Result<OverviewField> {
    let invalid = || NntpError::InvalidResponse(format!("Invalid LIST OVERVIEW.FMT: {}", line));
    let (name, suffix) = line.trim_end().split_once(':').ok_or_else(invalid)?;

    // ":bytes" style metadata items
    let (name, suffix) = if name.is_empty() {
        (suffix, "")
    } else {
        (name, suffix)
    };

    if name.is_empty() || (!suffix.is_empty() && !suffix.eq_ignore_ascii_case("full")) {
        return Err(invalid());
    }

    Ok(OverviewField {
        name: name.to_string(),
        full: !suffix.is_empty(),
    })
}
