//! Final blob assembly
//!
//! Exports build every payload in memory first and only then hand them to
//! [`write_blob`], so a failed export never leaves a partial chunk stream in
//! the sink.

use std::fmt;
use std::io::Write;

use scene_common::{ChunkTag, ChunkWriter};

use crate::error::ExportError;

/// What an export wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Payload size of every chunk, in write order
    pub chunks: Vec<(ChunkTag, usize)>,
    /// Total bytes including chunk headers
    pub bytes_written: u64,
}

impl ExportStats {
    pub fn payload_len(&self, tag: ChunkTag) -> Option<usize> {
        self.chunks
            .iter()
            .find(|(chunk, _)| *chunk == tag)
            .map(|(_, len)| *len)
    }
}

impl fmt::Display for ExportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes [== ", self.bytes_written)?;
        for (i, (tag, len)) in self.chunks.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{} bytes of {}", len, tag)?;
        }
        write!(f, "]")
    }
}

/// Write `chunks` to `sink` in order and flush it
pub fn write_blob<W: Write>(
    sink: W,
    chunks: &[(ChunkTag, &[u8])],
) -> Result<ExportStats, ExportError> {
    let mut writer = ChunkWriter::new(sink);
    let mut stats = ExportStats::default();

    for &(tag, payload) in chunks {
        if writer.write_chunk(tag, payload)? {
            tracing::debug!("Wrote chunk '{}' ({} bytes)", tag, payload.len());
            stats.chunks.push((tag, payload.len()));
        }
    }

    stats.bytes_written = writer.bytes_written();
    writer.finish()?;
    Ok(stats)
}
