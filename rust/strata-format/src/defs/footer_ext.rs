//! Serialization of the footer and the trailer.

use prost::Message;
use strata_common::{error::Error, verify_data};

use crate::checksum;

use super::{
    CHECKSUM_SIZE, FOOTER_LEN_SIZE, MAX_ROW_GROUP_ROWS, STRATA_MAGIC, TRAILER_SIZE,
    footer::{ColumnChunkDescriptor, FileFooter, KeyValue, RowGroupDescriptor},
};

impl FileFooter {
    /// Encodes the footer message followed by its checksum.
    pub fn encode_with_checksum(&self) -> Vec<u8> {
        let payload = self.encode_to_vec();
        let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_SIZE);
        checksum::append_checksummed(&payload, &mut buf);
        buf
    }

    /// Decodes a footer produced by [`encode_with_checksum`](Self::encode_with_checksum).
    pub fn decode_with_checksum(buf: &[u8], verify_checksum: bool) -> strata_common::Result<FileFooter> {
        let payload = if verify_checksum {
            checksum::validate_checksummed(buf, "footer")?
        } else {
            checksum::split_checksummed(buf, "footer")?.0
        };
        let footer = FileFooter::decode(payload)
            .map_err(|e| Error::corrupt_file("footer", format!("failed to decode: {e}")))?;
        footer.validate()?;
        Ok(footer)
    }

    /// Checks the structural consistency of a decoded footer.
    ///
    /// Offsets and counts come from storage: every sum is checked, so a
    /// footer with out-of-range numbers is `CorruptFile` rather than an
    /// overflow.
    pub fn validate(&self) -> strata_common::Result<()> {
        let column_count = self
            .schema
            .as_ref()
            .map(|schema| schema.columns.len())
            .unwrap_or(0);
        verify_data!("footer.schema", column_count > 0);
        let mut rows = 0u64;
        let mut next_offset = 0u64;
        for row_group in &self.row_groups {
            verify_data!("row_group", row_group.columns.len() == column_count);
            verify_data!("row_group.offset", row_group.offset >= next_offset);
            verify_data!("row_group.row_count", row_group.row_count <= MAX_ROW_GROUP_ROWS);
            next_offset = row_group
                .checked_end_offset()
                .ok_or_else(|| overflow("row_group.length"))?;
            for chunk in &row_group.columns {
                let end = chunk
                    .checked_end_offset()
                    .ok_or_else(|| overflow("column_chunk.length"))?;
                verify_data!("column_chunk", end <= row_group.length);
            }
            rows = rows
                .checked_add(row_group.row_count)
                .ok_or_else(|| overflow("total_row_count"))?;
        }
        verify_data!("total_row_count", rows == self.total_row_count);
        Ok(())
    }

    /// Looks up a metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    /// Sets a metadata value, replacing an existing entry with the same key.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.metadata.iter_mut().find(|kv| kv.key == key) {
            Some(kv) => kv.value = value,
            None => self.metadata.push(KeyValue { key, value }),
        }
    }
}

impl RowGroupDescriptor {
    /// End of the row group in the file. Saturates on footers that did not
    /// pass [`FileFooter::validate`].
    pub fn end_offset(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    pub fn checked_end_offset(&self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }

    /// Absolute file range of the column chunk at `index`.
    pub fn chunk_range(&self, index: usize) -> Option<std::ops::Range<u64>> {
        let chunk = self.columns.get(index)?;
        let start = self.offset.checked_add(chunk.offset)?;
        Some(start..start.checked_add(chunk.length)?)
    }
}

impl ColumnChunkDescriptor {
    pub fn end_offset(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    pub fn checked_end_offset(&self) -> Option<u64> {
        self.offset.checked_add(self.length)
    }
}

fn overflow(element: &str) -> Error {
    Error::corrupt_file(element, "value out of range")
}

/// Encodes the trailer for a footer of `footer_len` bytes (checksum included).
pub fn encode_trailer(footer_len: u32) -> [u8; TRAILER_SIZE] {
    let mut trailer = [0u8; TRAILER_SIZE];
    trailer[..FOOTER_LEN_SIZE].copy_from_slice(&footer_len.to_le_bytes());
    trailer[FOOTER_LEN_SIZE..].copy_from_slice(&STRATA_MAGIC);
    trailer
}

/// Decodes the trailer, returning the footer length.
///
/// Fails with `CorruptFile` when the magic marker does not match.
pub fn decode_trailer(trailer: &[u8]) -> strata_common::Result<u32> {
    verify_data!("trailer", trailer.len() == TRAILER_SIZE);
    verify_data!("magic", trailer[FOOTER_LEN_SIZE..] == STRATA_MAGIC);
    let len = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    verify_data!("footer_len", len as usize >= CHECKSUM_SIZE);
    Ok(len)
}
