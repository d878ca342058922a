#![doc = include_str!("../README.md")]

mod capabilities;
mod client;
/// NNTP command builders and payload parsers
pub mod commands;
mod config;
mod error;
mod response;
/// yEnc line decoding for XZVER/XZHDR and binary article bodies
pub mod yenc;

pub use capabilities::Capabilities;
pub use client::{
    stuff_line, unstuff_line, BodyDecoding, DecodedBody, Headers, NntpClient, NntpIo, Outcome,
    Records, ResponseStream, MAX_LINE_LENGTH, MULTILINE_TIMEOUT, SINGLE_LINE_TIMEOUT,
};
pub use commands::{
    ActiveGroup, ArticleInfo, ArticleRange, GroupInfo, GroupTime, HdrEntry, NewsgroupInfo,
    OverviewEntry, OverviewField, Request, Verb,
};
pub use config::{ServerConfig, NNTPS_PORT, NNTP_PORT};
pub use error::{NntpError, Result};
pub use response::{classify, codes, ReplyClass, StatusReply};
