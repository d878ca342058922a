//! NNTP command builders, the per-command response table and payload parsers

// Module declarations
pub mod article;
pub mod group;
pub mod hdr;
pub mod list;
pub mod over;

pub use article::*;
pub use group::*;
pub use hdr::*;
pub use list::*;
pub use over::*;

use crate::response::codes;
use std::fmt;

/// Command verbs understood by the client.
///
/// The verb decides how the reply is read: which status codes announce a
/// multiline body, whether that body may arrive compressed, and whether a
/// 3xx continuation is a legitimate answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// AUTHINFO USER / PASS (RFC 4643)
    AuthInfo,
    /// CAPABILITIES (RFC 3977 §5.2)
    Capabilities,
    /// MODE READER (RFC 3977 §5.3)
    ModeReader,
    /// QUIT (RFC 3977 §5.4)
    Quit,
    /// DATE (RFC 3977 §7.1)
    Date,
    /// HELP (RFC 3977 §7.2)
    Help,
    /// NEWGROUPS (RFC 3977 §7.3)
    NewGroups,
    /// NEWNEWS (RFC 3977 §7.4)
    NewNews,
    /// LIST and its keyword variants answering 215 (RFC 3977 §7.6)
    List,
    /// LIST EXTENSIONS (answers 202)
    ListExtensions,
    /// GROUP (RFC 3977 §6.1.1)
    Group,
    /// LISTGROUP (RFC 3977 §6.1.2)
    ListGroup,
    /// NEXT (RFC 3977 §6.1.4)
    Next,
    /// LAST (RFC 3977 §6.1.3)
    Last,
    /// STAT (RFC 3977 §6.2.4)
    Stat,
    /// ARTICLE (RFC 3977 §6.2.1)
    Article,
    /// HEAD (RFC 3977 §6.2.2)
    Head,
    /// BODY (RFC 3977 §6.2.3)
    Body,
    /// HDR (RFC 3977 §8.5)
    Hdr,
    /// XHDR (RFC 2980 §2.6)
    XHdr,
    /// XZHDR: XHDR with a yEnc-wrapped deflate body
    XzHdr,
    /// OVER (RFC 3977 §8.3)
    Over,
    /// XOVER (RFC 2980 §2.8)
    XOver,
    /// XZVER: XOVER with a yEnc-wrapped deflate body
    XzVer,
    /// XPAT (RFC 2980 §2.9)
    XPat,
    /// XFEATURE COMPRESS GZIP
    XFeature,
    /// POST (RFC 3977 §6.3.1)
    Post,
}

/// How a multiline body for a verb is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// Always plain dot-framed text
    Plain,
    /// Plain text, or a zlib block once gzip compression is negotiated
    Compressible,
    /// Dot-framed yEnc lines carrying a raw deflate stream
    YencDeflate,
}

impl Verb {
    /// Command keyword as sent on the wire
    pub fn keyword(self) -> &'static str {
        match self {
            Verb::AuthInfo => "AUTHINFO",
            Verb::Capabilities => "CAPABILITIES",
            Verb::ModeReader => "MODE READER",
            Verb::Quit => "QUIT",
            Verb::Date => "DATE",
            Verb::Help => "HELP",
            Verb::NewGroups => "NEWGROUPS",
            Verb::NewNews => "NEWNEWS",
            Verb::List => "LIST",
            Verb::ListExtensions => "LIST EXTENSIONS",
            Verb::Group => "GROUP",
            Verb::ListGroup => "LISTGROUP",
            Verb::Next => "NEXT",
            Verb::Last => "LAST",
            Verb::Stat => "STAT",
            Verb::Article => "ARTICLE",
            Verb::Head => "HEAD",
            Verb::Body => "BODY",
            Verb::Hdr => "HDR",
            Verb::XHdr => "XHDR",
            Verb::XzHdr => "XZHDR",
            Verb::Over => "OVER",
            Verb::XOver => "XOVER",
            Verb::XzVer => "XZVER",
            Verb::XPat => "XPAT",
            Verb::XFeature => "XFEATURE",
            Verb::Post => "POST",
        }
    }

    /// Status codes that announce a multiline body for this verb
    pub fn multiline_codes(self) -> &'static [u16] {
        match self {
            Verb::Capabilities => &[codes::CAPABILITY_LIST],
            Verb::Help => &[codes::HELP_TEXT_FOLLOWS],
            Verb::NewGroups => &[codes::NEW_NEWSGROUPS_FOLLOW],
            Verb::NewNews => &[codes::NEW_ARTICLE_LIST_FOLLOWS],
            Verb::List => &[codes::LIST_INFORMATION_FOLLOWS],
            Verb::ListExtensions => &[codes::EXTENSIONS_FOLLOW],
            Verb::ListGroup => &[codes::GROUP_SELECTED],
            Verb::Article => &[codes::ARTICLE_FOLLOWS],
            Verb::Head => &[codes::HEAD_FOLLOWS],
            Verb::Body => &[codes::BODY_FOLLOWS],
            Verb::Hdr => &[codes::HEADERS_FOLLOW],
            Verb::XHdr | Verb::XzHdr | Verb::XPat => &[codes::HEAD_FOLLOWS],
            Verb::Over | Verb::XOver | Verb::XzVer => &[codes::OVERVIEW_INFO_FOLLOWS],
            Verb::AuthInfo
            | Verb::ModeReader
            | Verb::Quit
            | Verb::Date
            | Verb::Group
            | Verb::Next
            | Verb::Last
            | Verb::Stat
            | Verb::XFeature
            | Verb::Post => &[],
        }
    }

    /// Whether a successful reply carries a multiline body
    pub fn expects_body(self) -> bool {
        !self.multiline_codes().is_empty()
    }

    /// Encoding of the body, if any
    pub fn body_format(self) -> BodyFormat {
        match self {
            Verb::XzHdr | Verb::XzVer => BodyFormat::YencDeflate,
            Verb::NewGroups
            | Verb::NewNews
            | Verb::List
            | Verb::ListGroup
            | Verb::Head
            | Verb::Hdr
            | Verb::XHdr
            | Verb::Over
            | Verb::XOver
            | Verb::XPat => BodyFormat::Compressible,
            _ => BodyFormat::Plain,
        }
    }

    /// Whether a 3xx reply is a legitimate answer to this verb
    pub fn accepts_continuation(self) -> bool {
        matches!(self, Verb::AuthInfo | Verb::Post)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single command line plus the verb that decides how its reply is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    verb: Verb,
    line: String,
}

impl Request {
    /// Build a request from a verb and optional arguments
    pub fn new(verb: Verb, args: Option<&str>) -> Self {
        let line = match args {
            Some(args) if !args.is_empty() => format!("{} {}", verb.keyword(), args),
            _ => verb.keyword().to_string(),
        };
        Self { verb, line }
    }

    /// Verb of this request
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Command line without the CRLF terminator
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Command line as sent on the wire
    pub fn to_wire(&self) -> String {
        format!("{}\r\n", self.line)
    }

    /// Whether the reply is expected to carry a multiline body
    pub fn expects_body(&self) -> bool {
        self.verb.expects_body()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never leak credentials into logs
        if self.verb == Verb::AuthInfo && self.line.starts_with("AUTHINFO PASS") {
            f.write_str("AUTHINFO PASS ****")
        } else {
            f.write_str(&self.line)
        }
    }
}

// Session administration commands

/// Build AUTHINFO USER command
pub fn authinfo_user(username: &str) -> Request {
    Request::new(Verb::AuthInfo, Some(&format!("USER {}", username)))
}

/// Build AUTHINFO PASS command
pub fn authinfo_pass(password: &str) -> Request {
    Request::new(Verb::AuthInfo, Some(&format!("PASS {}", password)))
}

/// Build CAPABILITIES command (RFC 3977 §5.2)
///
/// Response is multi-line, starting with 101.
pub fn capabilities() -> Request {
    Request::new(Verb::Capabilities, None)
}

/// Build MODE READER command (RFC 3977 §5.3)
pub fn mode_reader() -> Request {
    Request::new(Verb::ModeReader, None)
}

/// Build QUIT command
pub fn quit() -> Request {
    Request::new(Verb::Quit, None)
}

/// Build DATE command (RFC 3977 §7.1)
///
/// Response: 111 yyyymmddhhmmss
pub fn date() -> Request {
    Request::new(Verb::Date, None)
}

/// Build HELP command (RFC 3977 §7.2)
pub fn help() -> Request {
    Request::new(Verb::Help, None)
}

/// Build XFEATURE COMPRESS GZIP command
///
/// With `terminator`, the server places the terminating line inside the
/// compressed data instead of after it.
pub fn xfeature_compress_gzip(terminator: bool) -> Request {
    let args = if terminator {
        "COMPRESS GZIP TERMINATOR"
    } else {
        "COMPRESS GZIP"
    };
    Request::new(Verb::XFeature, Some(args))
}

/// Build POST command (RFC 3977 §6.3.1)
///
/// Server responds with 340 if ready to accept the article.
pub fn post() -> Request {
    Request::new(Verb::Post, None)
}
