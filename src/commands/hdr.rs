//! HDR/XHDR/XZHDR/XPAT commands and header field retrieval

use super::{Request, Verb};
use crate::error::{NntpError, Result};

fn field_args(field: &str, target: Option<&str>) -> String {
    match target {
        Some(target) => format!("{} {}", field, target),
        None => field.to_string(),
    }
}

/// Build HDR command (RFC 3977 §8.5)
///
/// Format: HDR header-name [range|message-id]
pub fn hdr(field: &str, target: Option<&str>) -> Request {
    Request::new(Verb::Hdr, Some(&field_args(field, target)))
}

/// Build XHDR command (RFC 2980 §2.6)
pub fn xhdr(field: &str, target: Option<&str>) -> Request {
    Request::new(Verb::XHdr, Some(&field_args(field, target)))
}

/// Build XZHDR command: XHDR with a yEnc-wrapped deflate body
pub fn xzhdr(field: &str, target: Option<&str>) -> Request {
    Request::new(Verb::XzHdr, Some(&field_args(field, target)))
}

/// Build XPAT command (RFC 2980 §2.9)
///
/// Format: XPAT header range|message-id pattern [pattern ...]
pub fn xpat(field: &str, target: &str, patterns: &[&str]) -> Request {
    let mut args = format!("{} {}", field, target);
    for pattern in patterns {
        args.push(' ');
        args.push_str(pattern);
    }
    Request::new(Verb::XPat, Some(&args))
}

/// Build LIST HEADERS command (RFC 3977 §8.6)
///
/// `variant` is "MSGID" or "RANGE"; `None` lists fields for both forms.
pub fn list_headers(variant: Option<&str>) -> Request {
    let args = match variant {
        Some(variant) => format!("HEADERS {}", variant),
        None => "HEADERS".to_string(),
    };
    Request::new(Verb::List, Some(&args))
}

/// Article number and header value from an HDR-family response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdrEntry {
    /// Article number within the newsgroup (0 if queried by message-id)
    pub article_number: u64,
    /// Header field value for this article
    pub value: String,
}

/// Parse HDR/XHDR/XZHDR response line into HdrEntry
///
/// Format: "article-number header-value". Header values may contain
/// spaces; an absent value is returned as an empty string.
///
/// # Examples
///
/// ```
/// # use nntp_stream::commands::parse_hdr_line;
/// let entry = parse_hdr_line("12345 Re: Test Subject").unwrap();
/// assert_eq!(entry.article_number, 12345);
/// assert_eq!(entry.value, "Re: Test Subject");
/// ```
pub fn parse_hdr_line(line: &str) -> Result<HdrEntry> {
    let (number, value) = match line.split_once([' ', '\t']) {
        Some((number, value)) => (number, value),
        None => (line, ""),
    };

    let article_number = number
        .trim()
        .parse()
        .map_err(|_| NntpError::InvalidResponse(format!("Invalid header line: {}", line)))?;

    Ok(HdrEntry {
        article_number,
        value: value.to_string(),
    })
}
