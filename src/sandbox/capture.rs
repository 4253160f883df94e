// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Bounded capture of a child's output stream.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// Appended to a stream that hit the capture cap.
pub const TRUNCATION_MARKER: &str = "[output truncated]";

const CHUNK_SIZE: usize = 8 * 1024;

/// Bytes captured from one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl Captured {
    /// Decode lossily, marking truncation at the end.
    pub fn into_text(self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(TRUNCATION_MARKER);
        }
        text
    }
}

/// Read `reader` to EOF keeping at most `limit` bytes.
///
/// Bytes past the limit are read and discarded so the writer never blocks
/// on a full pipe. Reading stops early, keeping what was captured, once
/// `stop` is cancelled.
pub async fn read_bounded<R>(mut reader: R, limit: usize, stop: CancellationToken) -> std::io::Result<Captured>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Captured {
        bytes: Vec::with_capacity(limit.min(CHUNK_SIZE)),
        truncated: false,
    };
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = tokio::select! {
            biased;
            read = reader.read(&mut buf) => read?,
            _ = stop.cancelled() => break,
        };
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(captured.bytes.len());
        if n > room {
            captured.bytes.extend_from_slice(&buf[..room]);
            captured.truncated = true;
        } else {
            captured.bytes.extend_from_slice(&buf[..n]);
        }
    }

    Ok(captured)
}
