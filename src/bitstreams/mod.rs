use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::error::{PineError, Result};

/// Number of zero bits needed in front of `bit_len` bits to reach a byte boundary.
#[inline(always)]
pub fn padding_for(bit_len: usize) -> u8 {
    ((8 - bit_len % 8) % 8) as u8
}

/// A sequence of logical bits, oldest first. Used for code words.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn is_prefix_of(&self, other: &BitString) -> bool {
        other.bits.starts_with(&self.bits)
    }

    /// Prepends zero bits until the length is a multiple of 8 and returns how many were added.
    pub fn left_pad(&mut self) -> u8 {
        let pad = padding_for(self.len());
        self.bits.splice(0..0, std::iter::repeat(false).take(pad as usize));
        pad
    }

    /// Converts each run of 8 bits, most significant first, to one byte.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut writer = BinaryWriterBuilder::with_capacity(self.len() / 8);
        writer.push_code(self);
        writer.build()
    }

    /// Left-pads a copy of the bits and packs it, returning the pad count with the bytes.
    pub fn to_padded_bytes(&self) -> (u8, Vec<u8>) {
        let mut padded = self.clone();
        let pad = padded.left_pad();
        let mut writer = BinaryWriterBuilder::with_capacity(padded.len() / 8);
        writer.push_code(&padded);
        // aligned by construction
        (pad, writer.into_bytes())
    }

    /// Inverse of [`BitString::to_padded_bytes`]: unpacks `bytes` and drops the first `pad` bits.
    pub fn from_padded_bytes(bytes: &[u8], pad: u8) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes);
        reader.skip(pad as usize)?;

        let mut bits = BitString { bits: Vec::with_capacity(reader.remaining_bits()) };
        while let Some(bit) = reader.read_bit() {
            bits.push(bit);
        }
        Ok(bits)
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        BitString { bits: iter.into_iter().collect() }
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString(\"{}\")", self)
    }
}

impl FromStr for BitString {
    type Err = PineError;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(PineError::malformed(format!("invalid bit '{c}' in code {s}"))),
            })
            .collect()
    }
}

impl Serialize for BitString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub struct BinaryWriterBuilder {
    os: Vec<u8>,
    pub written_bits: usize,
    current: u8,
    free: usize,
}

impl Default for BinaryWriterBuilder {
    fn default() -> Self {
        BinaryWriterBuilder {
            os: Vec::default(),
            written_bits: 0,
            current: 0,
            free: 8,
        }
    }
}

impl BinaryWriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self { os: Vec::with_capacity(bytes), ..Default::default() }
    }

    /// Returns the packed bytes. Fails if the written bits do not end on a byte boundary.
    pub fn build(self) -> Result<Vec<u8>> {
        if !self.is_aligned() {
            return Err(PineError::malformed(format!(
                "{} bits are not byte aligned",
                self.written_bits
            )));
        }
        Ok(self.os)
    }

    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        self.free == 8
    }

    fn into_bytes(mut self) -> Vec<u8> {
        if !self.is_aligned() {
            self.write(self.current);
        }
        self.os
    }

    #[inline(always)]
    fn write(&mut self, b: u8) {
        self.os.push(b);
    }

    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) {
        self.free -= 1;
        self.current |= (bit as u8) << self.free;

        if self.free == 0 {
            self.write(self.current);
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += 1;
    }

    pub fn push_zeros(&mut self, n: usize) {
        for _ in 0..n {
            self.push_bit(false);
        }
    }

    #[inline(always)]
    pub fn push_code(&mut self, code: &BitString) {
        for bit in code.iter() {
            self.push_bit(bit);
        }
    }
}

/// Reads bits, most significant first, from a borrowed byte slice.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BinaryReader<'a> {
    is: &'a [u8],
    position: usize,
    pub read_bits: usize,
    current: u8,
    fill: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(input_stream: &'a [u8]) -> Self {
        BinaryReader {
            is: input_stream,
            position: 0,
            read_bits: 0,
            current: 0,
            fill: 0,
        }
    }

    #[inline(always)]
    fn read(&mut self) -> Option<u8> {
        let byte = *self.is.get(self.position)?;
        self.position += 1;
        Some(byte)
    }

    pub fn remaining_bits(&self) -> usize {
        (self.is.len() - self.position) * 8 + self.fill
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Discards the next `n` bits.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.remaining_bits() {
            return Err(PineError::malformed(format!(
                "cannot skip {n} bits, only {} left",
                self.remaining_bits()
            )));
        }
        for _ in 0..n {
            self.read_bit();
        }
        Ok(())
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.fill == 0 {
            self.current = self.read()?;
            self.fill = 8;
        }

        self.fill -= 1;
        self.read_bits += 1;
        Some((self.current >> self.fill) & 1 == 1)
    }
}
