//! Fixed-width bit-packing of unsigned integers, LSB-first.

use strata_common::verify_data;

/// Number of bits needed to represent `max_value` (0 for 0).
pub fn bit_width(max_value: u32) -> u8 {
    (u32::BITS - max_value.leading_zeros()) as u8
}

/// Size in bytes of `count` values packed with `width` bits each.
pub fn packed_len(count: usize, width: u8) -> usize {
    (count * width as usize).div_ceil(8)
}

/// Appends `values` packed with `width` bits each. Values must fit in
/// `width` bits; higher bits are discarded.
pub fn pack(values: &[u32], width: u8, out: &mut Vec<u8>) {
    debug_assert!(width <= 32);
    if width == 0 {
        return;
    }
    let width = width as u32;
    let mask = low_bits_mask(width);
    out.reserve(packed_len(values.len(), width as u8));
    let mut acc = 0u64;
    let mut acc_bits = 0u32;
    for &value in values {
        acc |= (value as u64 & mask) << acc_bits;
        acc_bits += width;
        while acc_bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            acc_bits -= 8;
        }
    }
    if acc_bits > 0 {
        out.push(acc as u8);
    }
}

/// Unpacks `count` values of `width` bits from the start of `buf`.
pub fn unpack(buf: &[u8], width: u8, count: usize) -> strata_common::Result<Vec<u32>> {
    verify_data!(width, width <= 32);
    let needed = count
        .checked_mul(width as usize)
        .map_or(usize::MAX, |bits| bits.div_ceil(8));
    verify_data!(buf, buf.len() >= needed);
    if width == 0 {
        return Ok(vec![0; count]);
    }
    let width = width as u32;
    let mask = low_bits_mask(width);
    let mut values = Vec::with_capacity(count);
    let mut bytes = buf.iter();
    let mut acc = 0u64;
    let mut acc_bits = 0u32;
    for _ in 0..count {
        while acc_bits < width {
            let byte = bytes.next().copied().unwrap_or_default();
            acc |= (byte as u64) << acc_bits;
            acc_bits += 8;
        }
        values.push((acc & mask) as u32);
        acc >>= width;
        acc_bits -= width;
    }
    Ok(values)
}

fn low_bits_mask(width: u32) -> u64 {
    (1u64 << width) - 1
}
