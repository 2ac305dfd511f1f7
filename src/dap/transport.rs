//! Content-Length framed DAP message transport.
//!
//! DAP frames look like LSP frames:
//!
//! ```text
//! Content-Length: 119\r\n
//! \r\n
//! {"seq":1,"type":"request","command":"initialize",...}
//! ```
//!
//! The reader tolerates unknown headers (`Content-Type` is the usual one) and
//! stray blank lines between messages.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{BridgeError, BridgeResult};

/// Read one framed message. `Ok(None)` means clean EOF between messages;
/// EOF inside a frame is an error.
pub async fn read_message<R>(reader: &mut R) -> BridgeResult<Option<Value>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            if content_length.is_some() {
                return Err(BridgeError::frame("unexpected EOF inside frame header"));
            }
            return Ok(None);
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if content_length.is_some() {
                break;
            }
            // Stray blank line between messages.
            continue;
        }

        if let Some(raw) = line.strip_prefix("Content-Length:") {
            let parsed = raw
                .trim()
                .parse()
                .map_err(|_| BridgeError::frame(format!("invalid Content-Length: {raw}")))?;
            content_length = Some(parsed);
        }
        // Other headers are ignored.
    }

    // content_length is Some here; the header loop only breaks after it is set.
    let length = content_length.unwrap_or_default();
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;

    let message = serde_json::from_slice(&body)
        .map_err(|err| BridgeError::frame(format!("malformed message body: {err}")))?;
    Ok(Some(message))
}

/// Write one framed message and flush.
pub async fn write_message<W>(writer: &mut W, message: &Value) -> BridgeResult<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(message)?;
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}
