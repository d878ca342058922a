//! NNTP status replies, reply classification and status codes

use crate::error::{NntpError, Result};

/// A parsed status line: 3-digit code plus free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    /// 3-digit NNTP response code
    pub code: u16,
    /// Status message from server
    pub message: String,
}

/// What a status code means for the command that provoked it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    /// 1xx/2xx with no body following
    Immediate,
    /// A multiline body follows the status line
    MultilineFollows,
    /// 3xx: the server waits for more input from the client
    Continuation,
    /// 4xx: the command failed, retrying later may succeed
    TemporaryFailure,
    /// 5xx: the command failed and will keep failing
    PermanentFailure,
}

impl StatusReply {
    /// Parse a status line (terminator already stripped)
    ///
    /// The line must start with exactly three ASCII digits forming a code
    /// in 100..=599. A single space after the code is dropped; the rest is
    /// the message.
    pub fn parse(line: &str) -> Result<Self> {
        // Strip UTF-8 BOM if present (some broken servers/proxies add it)
        let line = line.trim_start_matches('\u{FEFF}');
        let malformed =
            || NntpError::ProtocolViolation(format!("malformed status line: {}", truncate(line)));

        let bytes = line.as_bytes();
        if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return Err(malformed());
        }

        // "99999" must not parse as 999 with message "99"
        if bytes.len() > 3 && bytes[3].is_ascii_digit() {
            return Err(malformed());
        }

        let code: u16 = line[..3].parse().map_err(|_| malformed())?;
        if !(100..600).contains(&code) {
            return Err(malformed());
        }

        let message = match line[3..].strip_prefix(' ') {
            Some(rest) => rest.to_string(),
            None => line[3..].to_string(),
        };

        Ok(Self { code, message })
    }

    /// Classify this reply given the codes that mean "body follows" for the
    /// command that was sent
    pub fn classify(&self, multiline_codes: &[u16]) -> ReplyClass {
        classify(self.code, multiline_codes)
    }

    /// Check if response indicates success (1xx or 2xx)
    pub fn is_success(&self) -> bool {
        self.code >= 100 && self.code < 300
    }

    /// Check if response indicates continuation (3xx)
    pub fn is_continuation(&self) -> bool {
        self.code >= 300 && self.code < 400
    }

    /// Check if response indicates error (4xx or 5xx)
    pub fn is_error(&self) -> bool {
        self.code >= 400
    }

    /// Convert a 4xx/5xx reply into the matching error
    pub fn into_rejection(self) -> NntpError {
        NntpError::CommandRejected {
            code: self.code,
            message: self.message,
        }
    }
}

/// Map a reply code to its class.
///
/// `code` is assumed to be in 100..=599, which [`StatusReply::parse`]
/// guarantees.
pub fn classify(code: u16, multiline_codes: &[u16]) -> ReplyClass {
    match code {
        _ if multiline_codes.contains(&code) => ReplyClass::MultilineFollows,
        100..=299 => ReplyClass::Immediate,
        300..=399 => ReplyClass::Continuation,
        400..=499 => ReplyClass::TemporaryFailure,
        _ => ReplyClass::PermanentFailure,
    }
}

fn truncate(line: &str) -> String {
    line.chars().take(100).collect()
}

/// NNTP response codes (RFC 3977, RFC 2980 and vendor extensions)
#[allow(dead_code)]
pub mod codes {
    // 1xx - Informational
    /// Help text follows
    pub const HELP_TEXT_FOLLOWS: u16 = 100;
    /// Capability list follows (RFC 3977 Section 5.2)
    pub const CAPABILITY_LIST: u16 = 101;
    /// Server date/time (RFC 3977 Section 7.1)
    pub const SERVER_DATE: u16 = 111;

    // 2xx - Success
    /// Server ready, posting allowed
    pub const READY_POSTING_ALLOWED: u16 = 200;
    /// Server ready, no posting
    pub const READY_NO_POSTING: u16 = 201;
    /// Extension list follows (LIST EXTENSIONS, pre-RFC 3977)
    pub const EXTENSIONS_FOLLOW: u16 = 202;
    /// Closing connection
    pub const CLOSING_CONNECTION: u16 = 205;
    /// Group selected (GROUP) or article numbers follow (LISTGROUP)
    pub const GROUP_SELECTED: u16 = 211;
    /// List of newsgroups follows (RFC 3977 Section 7.6)
    pub const LIST_INFORMATION_FOLLOWS: u16 = 215;
    /// Article follows
    pub const ARTICLE_FOLLOWS: u16 = 220;
    /// Head follows (also HDR/XHDR/XPAT data follows)
    pub const HEAD_FOLLOWS: u16 = 221;
    /// Body follows
    pub const BODY_FOLLOWS: u16 = 222;
    /// Article stat
    pub const ARTICLE_STAT: u16 = 223;
    /// Overview information follows
    pub const OVERVIEW_INFO_FOLLOWS: u16 = 224;
    /// Headers follow
    pub const HEADERS_FOLLOW: u16 = 225;
    /// List of new articles follows (RFC 3977 Section 7.4)
    pub const NEW_ARTICLE_LIST_FOLLOWS: u16 = 230;
    /// List of new newsgroups follows (RFC 3977 Section 7.3)
    pub const NEW_NEWSGROUPS_FOLLOW: u16 = 231;
    /// Article posted successfully (RFC 3977 Section 6.3.1)
    pub const ARTICLE_POSTED: u16 = 240;
    /// Authentication accepted
    pub const AUTH_ACCEPTED: u16 = 281;
    /// XFEATURE enabled
    pub const FEATURE_ENABLED: u16 = 290;

    // 3xx - Continuation
    /// Send article to be posted
    pub const SEND_ARTICLE: u16 = 340;
    /// Continue with authentication
    pub const AUTH_CONTINUE: u16 = 381;

    // 4xx - Temporary errors
    /// Service temporarily unavailable
    pub const SERVICE_UNAVAILABLE: u16 = 400;
    /// Internal fault or server resource problem
    pub const INTERNAL_FAULT: u16 = 403;
    /// No such newsgroup
    pub const NO_SUCH_GROUP: u16 = 411;
    /// No newsgroup selected
    pub const NO_GROUP_SELECTED: u16 = 412;
    /// No current article
    pub const NO_CURRENT_ARTICLE: u16 = 420;
    /// No next article
    pub const NO_NEXT_ARTICLE: u16 = 421;
    /// No previous article
    pub const NO_PREV_ARTICLE: u16 = 422;
    /// No article with that number
    pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;
    /// No article with that message-id
    pub const NO_SUCH_ARTICLE_ID: u16 = 430;
    /// Posting not permitted (RFC 3977 Section 6.3.1)
    pub const POSTING_NOT_PERMITTED: u16 = 440;
    /// Posting failed (RFC 3977 Section 6.3.1)
    pub const POSTING_FAILED: u16 = 441;
    /// Authentication required (RFC 4643)
    pub const AUTH_REQUIRED: u16 = 480;
    /// Authentication rejected
    pub const AUTH_REJECTED: u16 = 481;

    // 5xx - Permanent errors
    /// Command not recognized
    pub const COMMAND_NOT_RECOGNIZED: u16 = 500;
    /// Command syntax error
    pub const COMMAND_SYNTAX_ERROR: u16 = 501;
    /// Access denied / command unavailable
    pub const ACCESS_DENIED: u16 = 502;
    /// Feature not supported / optional functionality absent (RFC 3977)
    pub const FEATURE_NOT_SUPPORTED: u16 = 503;

    /// Codes that announce a multiline body no matter which command was sent
    ///
    /// 211 is deliberately absent: it is single-line for GROUP and
    /// multiline only for LISTGROUP.
    pub const ALWAYS_MULTILINE: &[u16] = &[
        HELP_TEXT_FOLLOWS,
        CAPABILITY_LIST,
        LIST_INFORMATION_FOLLOWS,
        ARTICLE_FOLLOWS,
        HEAD_FOLLOWS,
        BODY_FOLLOWS,
        OVERVIEW_INFO_FOLLOWS,
        HEADERS_FOLLOW,
        NEW_ARTICLE_LIST_FOLLOWS,
        NEW_NEWSGROUPS_FOLLOW,
    ];
}
