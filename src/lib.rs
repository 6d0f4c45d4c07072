//! Static Huffman compression into self-describing `.pine` containers.
//!
//! ```no_run
//! use pine_huffman::{HuffmanCoding, PineProperties};
//!
//! let coding = HuffmanCoding::new(PineProperties::default());
//! let packed = coding.encode_to_bytes(b"aaab")?;
//! assert_eq!(coding.decode_bytes(&packed)?, b"aaab");
//! # Ok::<(), pine_huffman::PineError>(())
//! ```

pub mod bitstreams;
pub mod coding;
pub mod error;
pub mod huffman;
pub mod pine;
pub mod properties;

pub use coding::{CompressionStats, HuffmanCoding};
pub use error::{PineError, Result};
pub use huffman::{CodeTable, SymbolTree};
pub use pine::{PineContainer, TableLayout, TreeMagnitude};
pub use properties::PineProperties;
