// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing: 4-byte big-endian length prefix + JSON payload, giving the
//! control surface (spec §6) a transport without building an HTTP API.

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Largest single message this protocol will read, guarding against a
/// corrupt or hostile length prefix causing an unbounded allocation.
pub const MAX_MESSAGE_BYTES: u32 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON encode/decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: u32, max: u32 },
}

/// Serializes `value` to JSON and writes it to `writer` with a 4-byte
/// big-endian length prefix.
pub async fn write_message<W, T>(writer: &mut W, value: &T) -> Result<(), ProtocolError>
where
    W: tokio::io::AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(value)?;
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::TooLarge {
        len: u32::MAX,
        max: MAX_MESSAGE_BYTES,
    })?;
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::TooLarge { len, max: MAX_MESSAGE_BYTES });
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads a 4-byte big-endian length prefix followed by that many bytes of
/// JSON, and deserializes it as `T`.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T, ProtocolError>
where
    R: tokio::io::AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::TooLarge { len, max: MAX_MESSAGE_BYTES });
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(serde_json::from_slice(&payload)?)
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
