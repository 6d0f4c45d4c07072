//! Error types for pine_huffman

use thiserror::Error;

/// Result type alias using our error
pub type Result<T> = std::result::Result<T, PineError>;

#[derive(Error, Debug)]
pub enum PineError {
    /// The container or its embedded table cannot be parsed
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// A tree node is neither a leaf nor an internal node with two children
    #[error("Invalid tree structure: {0}")]
    InvalidTreeStructure(String),

    #[error("Cannot encode an empty input")]
    EmptyInput,

    /// The source yielded a symbol on the emit pass that was not counted
    #[error("Symbol {0:#04x} is not in the code table")]
    SymbolNotInTable(u8),

    /// The source emitted a different number of bits than it was counted for
    #[error("Source changed between passes: counted {expected} bits, emitted {emitted}")]
    SourceChanged { expected: usize, emitted: usize },

    #[error("Serialized table of {size} bytes does not fit a header holding at most {max}")]
    TableTooLarge { size: usize, max: usize },

    /// The sentinel layout cannot carry a 0xFF byte inside an entry
    #[error("Entry for symbol {0:#04x} contains the 0xFF sentinel")]
    SentinelCollision(u8),

    #[error("Properties error: {0}")]
    Properties(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PineError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        PineError::MalformedContainer(msg.into())
    }

    pub fn invalid_tree(msg: impl Into<String>) -> Self {
        PineError::InvalidTreeStructure(msg.into())
    }

    pub fn properties(msg: impl Into<String>) -> Self {
        PineError::Properties(msg.into())
    }
}
