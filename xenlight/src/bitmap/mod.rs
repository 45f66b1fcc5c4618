//! CPU/node bitmaps
//!
//! [`Bitmap`] mirrors the layout of `libxl_bitmap`: a flat byte buffer where
//! bit `i` lives in byte `i / 8` under mask `1 << (i & 7)`. The buffer only
//! grows; it is sized to hold the highest bit ever set.
//!
//! The canonical textual form is the range notation used by `xl`, e.g.
//! `"2,4-8,10"`.

use std::{
    fmt::{self, Write},
    hash::{Hash, Hasher},
    ops::{BitAnd, BitOr},
    str::FromStr,
};

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Equality and hashing go by the set of bits: trailing zero bytes are
/// ignored, so `"3"` equals a zero-extended `"3"` of any length.
#[derive(Clone, Debug, Default)]
pub struct Bitmap {
    bytes: Vec<u8>,
}

impl Bitmap {
    /// Highest bit index accepted when parsing, plus one.
    pub const MAX_BITS: usize = 1 << 16;

    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bitmap over a raw byte buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes in the backing buffer.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether `bit` is set. Bits past the end of the buffer read as unset.
    pub fn test(&self, bit: usize) -> bool {
        self.bytes
            .get(bit / 8)
            .is_some_and(|byte| byte & mask(bit) != 0)
    }

    /// Set `bit`, growing the buffer with zeroes if needed.
    ///
    /// Unlike parsing, this does not check `bit` against [`Bitmap::MAX_BITS`].
    pub fn set(&mut self, bit: usize) {
        let index = bit / 8;

        if index >= self.bytes.len() {
            self.bytes.resize(index + 1, 0);
        }

        self.bytes[index] |= mask(bit);
    }

    /// Clear `bit`. Never grows the buffer.
    pub fn clear(&mut self, bit: usize) {
        if let Some(byte) = self.bytes.get_mut(bit / 8) {
            *byte &= !mask(bit);
        }
    }

    /// Set every bit of `start..=end`.
    pub fn set_range(&mut self, start: usize, end: usize) {
        (start..=end).for_each(|bit| self.set(bit));
    }

    /// Clear every bit of `start..=end`.
    pub fn clear_range(&mut self, start: usize, end: usize) {
        (start..=end).for_each(|bit| self.clear(bit));
    }

    /// Highest addressable bit, `-1` for an empty buffer.
    pub fn max(&self) -> isize {
        (self.bytes.len() * 8) as isize - 1
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|&byte| byte == 0)
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.bytes.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Intersection of both bitmaps.
    ///
    /// The shorter operand is zero-extended: the result is as long as the
    /// longer one, with its trailing bytes cleared.
    pub fn and(&self, other: &Bitmap) -> Bitmap {
        let len = self.bytes.len().max(other.bytes.len());
        let mut bytes = vec![0u8; len];

        for (out, (a, b)) in bytes.iter_mut().zip(self.bytes.iter().zip(&other.bytes)) {
            *out = a & b;
        }

        Bitmap { bytes }
    }

    /// Union of both bitmaps, as long as the longer one.
    pub fn or(&self, other: &Bitmap) -> Bitmap {
        let (long, short) = if self.bytes.len() >= other.bytes.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut bytes = long.bytes.clone();
        for (out, b) in bytes.iter_mut().zip(&short.bytes) {
            *out |= b;
        }

        Bitmap { bytes }
    }

    /// Bits of `self` that are not in `other`. Keeps the length of `self`.
    pub fn difference(&self, other: &Bitmap) -> Bitmap {
        let mut bytes = self.bytes.clone();
        for (out, b) in bytes.iter_mut().zip(&other.bytes) {
            *out &= !b;
        }

        Bitmap { bytes }
    }

    /// The buffer without its trailing zero bytes.
    fn significant(&self) -> &[u8] {
        let len = self
            .bytes
            .iter()
            .rposition(|&byte| byte != 0)
            .map_or(0, |last| last + 1);

        &self.bytes[..len]
    }

    /// Iterate over set bits, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bytes.iter().enumerate().flat_map(|(index, &byte)| {
            (0..8)
                .filter(move |shift| byte & (1 << shift) != 0)
                .map(move |shift| index * 8 + shift)
        })
    }

    /// Maximal runs of set bits, as inclusive `(start, end)` pairs.
    fn runs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut bits = self.iter().peekable();

        std::iter::from_fn(move || {
            let start = bits.next()?;
            let mut end = start;

            while bits.next_if_eq(&(end + 1)).is_some() {
                end += 1;
            }

            Some((start, end))
        })
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for Bitmap {}

impl Hash for Bitmap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

#[inline]
fn mask(bit: usize) -> u8 {
    1 << (bit & 7)
}

impl fmt::Display for Bitmap {
    /// `--x-xxxxx-x` is displayed as `2,4-8,10`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (start, end)) in self.runs().enumerate() {
            if i != 0 {
                f.write_char(',')?;
            }

            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseBitmapError {
    #[error("invalid bit index {0:?}")]
    InvalidIndex(String),

    #[error("invalid range {start}-{end}")]
    InvalidRange { start: usize, end: usize },

    #[error("bit index {0} is out of range")]
    TooLarge(usize),
}

impl FromStr for Bitmap {
    type Err = ParseBitmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_index = |token: &str| -> Result<usize, ParseBitmapError> {
            let token = token.trim();
            let bit = token
                .parse::<usize>()
                .map_err(|_| ParseBitmapError::InvalidIndex(token.to_string()))?;

            if bit >= Bitmap::MAX_BITS {
                return Err(ParseBitmapError::TooLarge(bit));
            }

            Ok(bit)
        };

        let mut bitmap = Bitmap::new();

        for token in s.split(',').filter(|token| !token.trim().is_empty()) {
            match token.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (parse_index(start)?, parse_index(end)?);

                    if end < start {
                        return Err(ParseBitmapError::InvalidRange { start, end });
                    }

                    bitmap.set_range(start, end);
                }
                None => bitmap.set(parse_index(token)?),
            }
        }

        Ok(bitmap)
    }
}

impl FromIterator<usize> for Bitmap {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bitmap = Bitmap::new();
        iter.into_iter().for_each(|bit| bitmap.set(bit));
        bitmap
    }
}

impl BitAnd for &Bitmap {
    type Output = Bitmap;

    fn bitand(self, rhs: Self) -> Bitmap {
        self.and(rhs)
    }
}

impl BitOr for &Bitmap {
    type Output = Bitmap;

    fn bitor(self, rhs: Self) -> Bitmap {
        self.or(rhs)
    }
}

impl Serialize for Bitmap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
