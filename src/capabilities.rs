//! Server capabilities (RFC 3977 Section 5.2)
//!
//! The CAPABILITIES body lists one capability per line, each with optional
//! arguments. The accessors below answer the questions the client asks
//! before choosing a command: OVER or XOVER, HDR or XHDR, whether gzip
//! compression can be negotiated.

use std::collections::HashMap;

/// Capability advertising XFEATURE compression (e.g. "XFEATURE-COMPRESS GZIP TERMINATOR")
const XFEATURE_COMPRESS: &str = "XFEATURE-COMPRESS";

/// Capabilities advertised by an NNTP server
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Capability label (upper-cased) to its arguments
    entries: HashMap<String, Vec<String>>,
}

impl Capabilities {
    /// Build from the lines of a CAPABILITIES body
    ///
    /// Labels are case-insensitive; blank lines are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nntp_stream::Capabilities;
    /// let caps = Capabilities::parse(["VERSION 2", "READER", "OVER MSGID"]);
    /// assert_eq!(caps.version(), Some(2));
    /// assert!(caps.has("reader"));
    /// assert!(caps.has_arg("OVER", "msgid"));
    /// ```
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();

        for line in lines {
            let mut parts = line.as_ref().split_whitespace();
            let Some(label) = parts.next() else {
                continue;
            };
            let args = parts.map(str::to_string).collect();
            entries.insert(label.to_ascii_uppercase(), args);
        }

        Self { entries }
    }

    /// Check if a capability is advertised
    #[must_use]
    pub fn has(&self, capability: &str) -> bool {
        self.entries.contains_key(&capability.to_ascii_uppercase())
    }

    /// Arguments of a capability, `None` if it is not advertised
    #[must_use]
    pub fn get_args(&self, capability: &str) -> Option<&[String]> {
        self.entries
            .get(&capability.to_ascii_uppercase())
            .map(Vec::as_slice)
    }

    /// Whether a capability is advertised with the given argument
    #[must_use]
    pub fn has_arg(&self, capability: &str, arg: &str) -> bool {
        self.get_args(capability)
            .is_some_and(|args| args.iter().any(|a| a.eq_ignore_ascii_case(arg)))
    }

    /// Capability labels, sorted
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Highest protocol version from the VERSION line
    #[must_use]
    pub fn version(&self) -> Option<u32> {
        self.get_args("VERSION")?
            .iter()
            .filter_map(|v| v.parse().ok())
            .max()
    }

    /// Whether the server is in reader mode
    #[must_use]
    pub fn is_reader(&self) -> bool {
        self.has("READER")
    }

    /// Whether OVER and LIST OVERVIEW.FMT are available
    #[must_use]
    pub fn has_over(&self) -> bool {
        self.has("OVER")
    }

    /// Whether HDR and LIST HEADERS are available
    #[must_use]
    pub fn has_hdr(&self) -> bool {
        self.has("HDR")
    }

    /// Whether `XFEATURE COMPRESS GZIP` can be negotiated
    #[must_use]
    pub fn supports_gzip(&self) -> bool {
        self.has_arg(XFEATURE_COMPRESS, "GZIP")
    }

    /// Whether the gzip block may carry the body terminator itself
    #[must_use]
    pub fn supports_gzip_terminator(&self) -> bool {
        self.supports_gzip() && self.has_arg(XFEATURE_COMPRESS, "TERMINATOR")
    }
}
