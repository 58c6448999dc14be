//! PLAIN encoding of value sequences.

use strata_common::verify_data;
use strata_format::PhysicalType;

use crate::bitpacking;

/// Longest byte array a column chunk can hold: the PLAIN length prefix is a
/// `u32`.
pub const MAX_BYTE_ARRAY_LEN: usize = u32::MAX as usize;

/// A Rust type storable in a column chunk, with its PLAIN representation.
pub trait PlainType: Sized + Clone + PartialOrd + Send + Sync + 'static {
    const PHYSICAL_TYPE: PhysicalType;

    /// Appends the PLAIN encoding of `values` to `out`.
    fn encode_plain(values: &[Self], out: &mut Vec<u8>);

    /// Decodes `count` values from the start of `buf`, returning them with the
    /// number of bytes consumed.
    fn decode_plain(buf: &[u8], count: usize) -> strata_common::Result<(Vec<Self>, usize)>;

    /// Size of the value in the PLAIN encoding, used for row group size
    /// estimation.
    fn plain_size(&self) -> usize;
}

impl PlainType for bool {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::Boolean;

    fn encode_plain(values: &[Self], out: &mut Vec<u8>) {
        let bits = values.iter().map(|&v| v as u32).collect::<Vec<_>>();
        bitpacking::pack(&bits, 1, out);
    }

    fn decode_plain(buf: &[u8], count: usize) -> strata_common::Result<(Vec<Self>, usize)> {
        let bits = bitpacking::unpack(buf, 1, count)?;
        Ok((
            bits.into_iter().map(|b| b != 0).collect(),
            bitpacking::packed_len(count, 1),
        ))
    }

    fn plain_size(&self) -> usize {
        1
    }
}

macro_rules! impl_fixed_width_plain {
    ($ty:ty, $physical:ident) => {
        impl PlainType for $ty {
            const PHYSICAL_TYPE: PhysicalType = PhysicalType::$physical;

            fn encode_plain(values: &[Self], out: &mut Vec<u8>) {
                out.reserve(values.len() * std::mem::size_of::<$ty>());
                for value in values {
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }

            fn decode_plain(
                buf: &[u8],
                count: usize,
            ) -> strata_common::Result<(Vec<Self>, usize)> {
                const SIZE: usize = std::mem::size_of::<$ty>();
                let len = count.checked_mul(SIZE).unwrap_or(usize::MAX);
                verify_data!(buf, buf.len() >= len);
                let values = buf[..len]
                    .chunks_exact(SIZE)
                    .map(|chunk| {
                        let mut bytes = [0u8; SIZE];
                        bytes.copy_from_slice(chunk);
                        <$ty>::from_le_bytes(bytes)
                    })
                    .collect();
                Ok((values, len))
            }

            fn plain_size(&self) -> usize {
                std::mem::size_of::<$ty>()
            }
        }
    };
}

impl_fixed_width_plain!(i32, Int32);
impl_fixed_width_plain!(i64, Int64);
impl_fixed_width_plain!(f32, Float);
impl_fixed_width_plain!(f64, Double);

impl PlainType for Vec<u8> {
    const PHYSICAL_TYPE: PhysicalType = PhysicalType::ByteArray;

    fn encode_plain(values: &[Self], out: &mut Vec<u8>) {
        out.reserve(values.iter().map(PlainType::plain_size).sum());
        for value in values {
            debug_assert!(value.len() <= MAX_BYTE_ARRAY_LEN);
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value);
        }
    }

    fn decode_plain(buf: &[u8], count: usize) -> strata_common::Result<(Vec<Self>, usize)> {
        let mut values = Vec::with_capacity(count.min(buf.len() / 4));
        let mut pos = 0usize;
        for _ in 0..count {
            verify_data!(length_prefix, buf.len() - pos >= 4);
            let len =
                u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]]) as usize;
            pos += 4;
            verify_data!(byte_array, buf.len() - pos >= len);
            values.push(buf[pos..pos + len].to_vec());
            pos += len;
        }
        Ok((values, pos))
    }

    fn plain_size(&self) -> usize {
        4 + self.len()
    }
}
