//! Article retrieval commands and article status / header parsing

use super::{Request, Verb};
use crate::error::{NntpError, Result};
use crate::response::StatusReply;

/// Build ARTICLE command for a message-id or article number
///
/// With `None` the current article is retrieved.
pub fn article(id: Option<&str>) -> Request {
    Request::new(Verb::Article, id)
}

/// Build HEAD command
pub fn head(id: Option<&str>) -> Request {
    Request::new(Verb::Head, id)
}

/// Build BODY command
pub fn body(id: Option<&str>) -> Request {
    Request::new(Verb::Body, id)
}

/// Build STAT command (RFC 3977 §6.2.4)
pub fn stat(id: Option<&str>) -> Request {
    Request::new(Verb::Stat, id)
}

/// Build NEXT command (RFC 3977 §6.1.4)
pub fn next() -> Request {
    Request::new(Verb::Next, None)
}

/// Build LAST command (RFC 3977 §6.1.3)
pub fn last() -> Request {
    Request::new(Verb::Last, None)
}

/// Article number and message-id reported by ARTICLE/HEAD/BODY/STAT/NEXT/LAST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleInfo {
    /// Article number (0 when the article was requested by message-id)
    pub number: u64,
    /// Message-ID of the article
    pub message_id: String,
}

/// Parse an article status line
///
/// Response format: "223 n message-id"
pub fn parse_article_status(reply: &StatusReply) -> Result<ArticleInfo> {
    let invalid =
        || NntpError::InvalidResponse(format!("Invalid article status: {}", reply.message));
    let mut parts = reply.message.split_whitespace();

    let number = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
    let message_id = parts
        .next()
        .filter(|id| id.starts_with('<') && id.ends_with('>'))
        .ok_or_else(invalid)?
        .to_string();

    Ok(ArticleInfo { number, message_id })
}

/// Parse header lines (as produced by HEAD or the head of ARTICLE)
///
/// Continuation lines (starting with space or tab) are folded into the
/// previous header. Parsing stops at the first empty line.
pub fn parse_headers<I, S>(lines: I) -> Result<Vec<(String, String)>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            break;
        }

        if line.starts_with([' ', '\t']) {
            let Some((_, value)) = headers.last_mut() else {
                return Err(NntpError::InvalidResponse(
                    "First header is a continuation".to_string(),
                ));
            };
            value.push_str(line.trim_end());
            continue;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| NntpError::InvalidResponse(format!("Invalid header: {}", line)))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(headers)
}
