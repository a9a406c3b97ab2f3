//! Reading requests off a byte stream.
//!
//! Bytes are accumulated in a caller-owned buffer until a complete frame can be decoded.
//! Whatever follows that frame stays buffered for the next call, so pipelined requests are
//! served in order.

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::resp::{FrameScanner, RespError, RespValue};

/// Most unread bytes a client may queue up while one of its commands is still running.
pub const MAX_PENDING_INPUT: usize = 1024 * 1024;

/// Errors that can occur while reading and decoding a request from a stream.
#[derive(Error, Debug, PartialEq)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("connection closed")]
    ConnectionClosed,
    #[error(transparent)]
    Resp(#[from] RespError),
    #[error("more than {} bytes sent while a command was running", MAX_PENDING_INPUT)]
    PendingInputTooLarge,
}

impl CommandReadError {
    /// Reply sent to the peer before dropping the connection, if one makes sense.
    pub fn as_resp(&self) -> Option<RespValue> {
        match self {
            CommandReadError::Resp(error) => Some(error.as_resp()),
            CommandReadError::PendingInputTooLarge => {
                Some(RespValue::SimpleError(format!("ERR {}", self)))
            }
            CommandReadError::IoError(_) | CommandReadError::ConnectionClosed => None,
        }
    }
}

/// Returns the next complete value from `stream`, reading more bytes into `buffer` until
/// one can be decoded.
///
/// # Returns
///
/// * `Ok(RespValue)` - The decoded value; its bytes have been consumed from `buffer`
/// * `Err(CommandReadError::ConnectionClosed)` - If the peer closed the stream between frames
/// * `Err(CommandReadError::Resp)` - If the bytes are not a valid frame, or the stream ended
///   halfway through one
/// * `Err(CommandReadError::IoError)` - If reading from the stream fails
pub async fn read_and_parse_resp<R>(
    stream: &mut R,
    buffer: &mut BytesMut,
) -> Result<RespValue, CommandReadError>
where
    R: AsyncRead + Unpin,
{
    let mut scanner = FrameScanner::new();

    loop {
        if let Some((value, consumed)) = scanner.decode(buffer)? {
            buffer.advance(consumed);
            return Ok(value);
        }

        let number_of_bytes = stream
            .read_buf(buffer)
            .await
            .map_err(|e| CommandReadError::IoError(e.to_string()))?;

        if number_of_bytes == 0 {
            if buffer.is_empty() {
                return Err(CommandReadError::ConnectionClosed);
            }

            return Err(RespError::UnexpectedEof.into());
        }
    }
}
