use strata_common::error::ErrorKind;

use crate::defs::CHECKSUM_SIZE;

/// Computes the 32-bit checksum of a buffer: xxh3-64 folded to 32 bits.
pub fn compute(buf: &[u8]) -> u32 {
    let h = xxhash_rust::xxh3::xxh3_64(buf);
    (h as u32) ^ ((h >> 32) as u32)
}

/// Validates a buffer against the expected checksum.
///
/// `name` identifies the element in the `ChecksumMismatch` error.
pub fn validate_buffer(buf: &[u8], checksum: u32, name: &str) -> strata_common::Result<()> {
    if compute(buf) == checksum {
        Ok(())
    } else {
        Err(ErrorKind::ChecksumMismatch {
            element: name.to_string(),
        }
        .into())
    }
}

/// Appends `payload` followed by its little-endian checksum to `out`.
pub fn append_checksummed(payload: &[u8], out: &mut Vec<u8>) {
    out.reserve(payload.len() + CHECKSUM_SIZE);
    out.extend_from_slice(payload);
    out.extend_from_slice(&compute(payload).to_le_bytes());
}

/// Splits a `[payload][checksum: u32]` buffer, returning the payload and the
/// stored checksum.
pub fn split_checksummed<'a>(buf: &'a [u8], name: &str) -> strata_common::Result<(&'a [u8], u32)> {
    if buf.len() < CHECKSUM_SIZE {
        return Err(strata_common::error::Error::corrupt_file(
            name,
            format!("{} bytes is too short for a checksummed buffer", buf.len()),
        ));
    }
    let (payload, checksum) = buf.split_at(buf.len() - CHECKSUM_SIZE);
    let checksum = u32::from_le_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
    Ok((payload, checksum))
}

/// Splits and validates a `[payload][checksum: u32]` buffer.
pub fn validate_checksummed<'a>(buf: &'a [u8], name: &str) -> strata_common::Result<&'a [u8]> {
    let (payload, checksum) = split_checksummed(buf, name)?;
    validate_buffer(payload, checksum, name)?;
    Ok(payload)
}
