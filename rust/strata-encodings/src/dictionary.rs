//! DICTIONARY encoding: distinct values in first-seen order plus bit-packed
//! per-row indices.

use std::hash::Hash;

use ahash::AHashMap;
use strata_common::{error::Error, verify_data};

use crate::{bitpacking, plain::PlainType};

/// A value type that can be dictionary-encoded.
///
/// `Key` identifies equal values. Floating point values are keyed by their
/// bit pattern, so `-0.0` and `0.0` (and distinct NaN payloads) stay apart and
/// decode exactly as written.
pub trait DictionaryValue: PlainType {
    type Key: Hash + Eq;

    fn dictionary_key(&self) -> Self::Key;
}

impl DictionaryValue for i32 {
    type Key = i32;

    fn dictionary_key(&self) -> i32 {
        *self
    }
}

impl DictionaryValue for i64 {
    type Key = i64;

    fn dictionary_key(&self) -> i64 {
        *self
    }
}

impl DictionaryValue for f32 {
    type Key = u32;

    fn dictionary_key(&self) -> u32 {
        self.to_bits()
    }
}

impl DictionaryValue for f64 {
    type Key = u64;

    fn dictionary_key(&self) -> u64 {
        self.to_bits()
    }
}

impl DictionaryValue for Vec<u8> {
    type Key = Vec<u8>;

    fn dictionary_key(&self) -> Vec<u8> {
        self.clone()
    }
}

/// An insertion-ordered set of distinct values with reverse lookup.
///
/// Indices are assigned in first-seen order and never change, which keeps
/// encoding deterministic for a given input sequence.
pub struct ValueDictionary<T: DictionaryValue> {
    entries: Vec<T>,
    lookup: AHashMap<T::Key, u32>,
}

impl<T: DictionaryValue> ValueDictionary<T> {
    pub fn new() -> Self {
        ValueDictionary {
            entries: Vec::new(),
            lookup: AHashMap::new(),
        }
    }

    /// Builds the dictionary and index sequence for `values`, or returns
    /// `None` as soon as the number of distinct values exceeds `max_distinct`.
    pub fn try_build(values: &[T], max_distinct: usize) -> Option<(Self, Vec<u32>)> {
        let mut dictionary = Self::new();
        let mut indices = Vec::with_capacity(values.len());
        for value in values {
            let index = dictionary.insert(value);
            if dictionary.len() > max_distinct {
                return None;
            }
            indices.push(index);
        }
        Some((dictionary, indices))
    }

    /// Returns the index of `value`, adding it if it is new.
    pub fn insert(&mut self, value: &T) -> u32 {
        let next = self.entries.len() as u32;
        let index = *self.lookup.entry(value.dictionary_key()).or_insert(next);
        if index == next {
            self.entries.push(value.clone());
        }
        index
    }

    pub fn index_of(&self, value: &T) -> Option<u32> {
        self.lookup.get(&value.dictionary_key()).copied()
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.entries.get(index as usize)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bit width of the index stream: enough to represent the largest index.
    pub fn index_bit_width(&self) -> u8 {
        bitpacking::bit_width(self.entries.len().saturating_sub(1) as u32)
    }

    /// Appends the encoded chunk: entry count, PLAIN entries, index bit width
    /// and the packed `indices`.
    pub fn encode(&self, indices: &[u32], out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        T::encode_plain(&self.entries, out);
        let width = self.index_bit_width();
        out.push(width);
        bitpacking::pack(indices, width, out);
    }
}

impl<T: DictionaryValue> Default for ValueDictionary<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes a DICTIONARY chunk of `count` rows, returning the values and the
/// number of bytes consumed.
pub fn decode_dictionary<T: PlainType>(
    buf: &[u8],
    count: usize,
) -> strata_common::Result<(Vec<T>, usize)> {
    verify_data!(dictionary_header, buf.len() >= 4);
    let entry_count = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let mut pos = 4;
    let (entries, consumed) = T::decode_plain(&buf[pos..], entry_count)?;
    pos += consumed;
    verify_data!(bit_width, buf.len() > pos);
    let width = buf[pos];
    pos += 1;
    let indices = bitpacking::unpack(&buf[pos..], width, count)?;
    pos += bitpacking::packed_len(count, width);
    let values = indices
        .into_iter()
        .map(|index| {
            entries.get(index as usize).cloned().ok_or_else(|| {
                Error::corrupt_file(
                    "dictionary_index",
                    format!("index {index} out of {} entries", entries.len()),
                )
            })
        })
        .collect::<strata_common::Result<Vec<_>>>()?;
    Ok((values, pos))
}

#[cfg(test)]
mod tests {
    use super::{ValueDictionary, decode_dictionary};

    #[test]
    fn test_first_seen_order() {
        let values = [30i64, 10, 30, 20, 10, 30];
        let (dict, indices) = ValueDictionary::try_build(&values, 16).unwrap();
        assert_eq!(dict.entries(), &[30, 10, 20]);
        assert_eq!(indices, [0, 1, 0, 2, 1, 0]);
        assert_eq!(dict.index_of(&20), Some(2));
        assert_eq!(dict.index_of(&99), None);
        assert_eq!(dict.get(1), Some(&10));
        assert_eq!(dict.index_bit_width(), 2);
    }

    #[test]
    fn test_max_distinct_budget() {
        let values = [1i32, 2, 3, 1, 2, 3];
        assert!(ValueDictionary::try_build(&values, 3).is_some());
        assert!(ValueDictionary::try_build(&values, 2).is_none());
        assert!(ValueDictionary::<i32>::try_build(&[], 0).is_some());
    }

    #[test]
    fn test_encode_layout_and_decode() {
        let values = ["b", "a", "b", "b", "c"]
            .iter()
            .map(|s| s.as_bytes().to_vec())
            .collect::<Vec<_>>();
        let (dict, indices) = ValueDictionary::try_build(&values, 8).unwrap();
        let mut buf = Vec::new();
        dict.encode(&indices, &mut buf);
        assert_eq!(&buf[..4], &[3, 0, 0, 0]);
        // entries: 3 x (4 + 1) bytes, then width 2, then 5 x 2 bits.
        assert_eq!(buf[4 + 15], 2);
        assert_eq!(buf.len(), 4 + 15 + 1 + 2);

        let (decoded, consumed) = decode_dictionary::<Vec<u8>>(&buf, values.len()).unwrap();
        assert_eq!(decoded, values);
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn test_single_entry_uses_zero_width() {
        let values = vec![7.5f32; 100];
        let (dict, indices) = ValueDictionary::try_build(&values, 8).unwrap();
        assert_eq!(dict.index_bit_width(), 0);
        let mut buf = Vec::new();
        dict.encode(&indices, &mut buf);
        assert_eq!(buf.len(), 4 + 4 + 1);
        let (decoded, _) = decode_dictionary::<f32>(&buf, 100).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_signed_zero_kept_apart() {
        let values = [0.0f64, -0.0, 0.0];
        let (dict, _) = ValueDictionary::try_build(&values, 8).unwrap();
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_corrupt_index() {
        let (dict, _) = ValueDictionary::try_build(&[1i32, 2], 8).unwrap();
        let mut buf = Vec::new();
        dict.encode(&[1, 0, 1], &mut buf);
        assert!(decode_dictionary::<i32>(&buf, 3).is_ok());
        assert!(decode_dictionary::<i32>(&buf[..3], 3).is_err());

        // one entry, width 1, indices [0, 1]
        let mut buf = vec![1, 0, 0, 0];
        buf.extend_from_slice(&5i32.to_le_bytes());
        buf.push(1);
        buf.push(0b10);
        assert!(decode_dictionary::<i32>(&buf, 2).unwrap_err().is_corrupt_file());
    }
}
