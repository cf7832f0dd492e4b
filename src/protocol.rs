//! JSON line protocol for requests and responses.
//!
//! Each message is one JSON object with a single string field
//! (`command` for requests, `result` for responses), terminated by one
//! newline byte. serde_json escapes any newline inside a field value,
//! so the delimiter byte can only ever appear at the end of a frame.

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str;

/// Byte marking the end of every frame.
pub const FRAME_DELIMITER: u8 = b'\n';

/// A command to execute, sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub command: String,
}

/// The outcome of one command, sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Response {
    pub result: String,
}

/// Serialize a message into one delimited frame.
pub fn encode<T: Serialize>(message: &T) -> Result<BytesMut, EncodeError> {
    let body = serde_json::to_vec(message).map_err(EncodeError)?;
    let mut frame = BytesMut::with_capacity(body.len() + 1);
    frame.extend_from_slice(&body);
    frame.put_u8(FRAME_DELIMITER);
    Ok(frame)
}

/// Parse one received frame back into a message.
///
/// The frame must include its trailing delimiter; everything before it
/// must be one well-formed message object with exactly the expected
/// field.
pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, DecodeError> {
    let text = str::from_utf8(frame).map_err(DecodeError::InvalidUtf8)?;
    let body = text
        .strip_suffix('\n')
        .ok_or(DecodeError::MissingDelimiter)?;
    serde_json::from_str(body.trim_end_matches('\r')).map_err(DecodeError::Malformed)
}

/// Frame decoding errors
#[derive(Debug)]
pub enum DecodeError {
    /// Frame is not valid UTF-8
    InvalidUtf8(str::Utf8Error),
    /// Frame does not end with the delimiter byte
    MissingDelimiter,
    /// Frame body is not a well-formed message object
    Malformed(serde_json::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidUtf8(e) => write!(f, "Frame is not valid UTF-8: {e}"),
            DecodeError::MissingDelimiter => write!(f, "Frame is missing its trailing delimiter"),
            DecodeError::Malformed(e) => write!(f, "Malformed message: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Message encoding error
#[derive(Debug)]
pub struct EncodeError(serde_json::Error);

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to serialize message: {}", self.0)
    }
}

impl std::error::Error for EncodeError {}
