//! The `.pine` container.
//!
//! Using `<number of bytes:name>`, a file is laid out as
//!
//! ```text
//! <TREE_MAGNITUDE:table_size> <1:tail_padding> <table_size:table> <rest:payload>
//! ```
//!
//! `table_size` is big endian. Its width and the table layout are not recorded in
//! the file: encoder and decoder must agree on them through [`crate::PineProperties`].

pub mod table;

use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use tracing::debug;

use crate::error::{PineError, Result};

/// Width in bytes of the `table_size` header field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TreeMagnitude {
    #[default]
    Two,
    Four,
}

impl TreeMagnitude {
    pub fn width(self) -> usize {
        match self {
            TreeMagnitude::Two => 2,
            TreeMagnitude::Four => 4,
        }
    }

    /// Largest table the header can describe.
    pub fn max_table_size(self) -> usize {
        match self {
            TreeMagnitude::Two => u16::MAX as usize,
            TreeMagnitude::Four => u32::MAX as usize,
        }
    }

    fn encode_size(self, size: usize) -> Result<Vec<u8>> {
        let too_large = || PineError::TableTooLarge { size, max: self.max_table_size() };
        Ok(match self {
            TreeMagnitude::Two => {
                u16::try_from(size).map_err(|_| too_large())?.to_be_bytes().to_vec()
            }
            TreeMagnitude::Four => {
                u32::try_from(size).map_err(|_| too_large())?.to_be_bytes().to_vec()
            }
        })
    }

    fn decode_size(self, header: &[u8]) -> usize {
        header.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize)
    }
}

impl TryFrom<usize> for TreeMagnitude {
    type Error = PineError;

    fn try_from(width: usize) -> Result<Self> {
        match width {
            2 => Ok(TreeMagnitude::Two),
            4 => Ok(TreeMagnitude::Four),
            _ => Err(PineError::properties(format!(
                "tree magnitude must be 2 or 4, found {width}"
            ))),
        }
    }
}

impl fmt::Display for TreeMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.width())
    }
}

/// How table entries are delimited inside the container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableLayout {
    /// `[pad][code bytes][symbol][0xFF]` per entry
    Sentinel,
    /// `[pad][n][n code bytes][symbol]` per entry
    #[default]
    LengthPrefixed,
}

impl FromStr for TableLayout {
    type Err = PineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sentinel" => Ok(TableLayout::Sentinel),
            "lengthprefixed" | "length_prefixed" | "length-prefixed" => {
                Ok(TableLayout::LengthPrefixed)
            }
            _ => Err(PineError::properties(format!("unknown table layout {s}"))),
        }
    }
}

impl fmt::Display for TableLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableLayout::Sentinel => write!(f, "sentinel"),
            TableLayout::LengthPrefixed => write!(f, "lengthprefixed"),
        }
    }
}

/// A parsed or assembled `.pine` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PineContainer {
    /// Zero bits in front of the first payload bit, 0 to 7
    pub tail_padding: u8,
    pub table_bytes: Vec<u8>,
    pub payload: Vec<u8>,
}

impl PineContainer {
    /// Payload bits without the padding.
    pub fn encoded_bit_len(&self) -> usize {
        (self.payload.len() * 8).saturating_sub(self.tail_padding as usize)
    }

    /// Size of the file this container serializes to.
    pub fn file_len(&self, magnitude: TreeMagnitude) -> usize {
        magnitude.width() + 1 + self.table_bytes.len() + self.payload.len()
    }

    pub fn to_bytes(&self, magnitude: TreeMagnitude) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.file_len(magnitude));
        self.write_to(&mut out, magnitude)?;
        Ok(out)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W, magnitude: TreeMagnitude) -> Result<()> {
        if self.tail_padding > 7 {
            return Err(PineError::malformed(format!(
                "tail padding {} exceeds 7",
                self.tail_padding
            )));
        }

        writer.write_all(&magnitude.encode_size(self.table_bytes.len())?)?;
        writer.write_all(&[self.tail_padding])?;
        writer.write_all(&self.table_bytes)?;
        writer.write_all(&self.payload)?;

        debug!(
            table_size = self.table_bytes.len(),
            tail_padding = self.tail_padding,
            payload = self.payload.len(),
            "wrote pine container"
        );
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8], magnitude: TreeMagnitude) -> Result<Self> {
        let width = magnitude.width();
        if bytes.len() < width + 1 {
            return Err(PineError::malformed(format!(
                "{} bytes cannot hold a {}-byte header",
                bytes.len(),
                width + 1
            )));
        }

        let table_size = magnitude.decode_size(&bytes[..width]);
        let tail_padding = bytes[width];
        let rest = &bytes[width + 1..];

        if tail_padding > 7 {
            return Err(PineError::malformed(format!("tail padding {tail_padding} exceeds 7")));
        }
        if rest.len() < table_size {
            return Err(PineError::malformed(format!(
                "header declares a {table_size}-byte table but only {} bytes follow",
                rest.len()
            )));
        }

        let (table_bytes, payload) = rest.split_at(table_size);
        if payload.is_empty() {
            return Err(PineError::malformed("the container holds no payload"));
        }

        debug!(table_size, tail_padding, payload = payload.len(), "parsed pine container");
        Ok(Self {
            tail_padding,
            table_bytes: table_bytes.to_vec(),
            payload: payload.to_vec(),
        })
    }

    pub fn read_from<R: Read>(reader: &mut R, magnitude: TreeMagnitude) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes, magnitude)
    }
}

#[cfg(test)]
mod tests;
