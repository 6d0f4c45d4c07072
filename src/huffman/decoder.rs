use crate::{
    bitstreams::BinaryReader,
    error::{PineError, Result},
};

use super::{Node, NodeId, SymbolTree};

/// Lazily decodes a payload by walking the tree one bit at a time.
///
/// Yields `Err` at most once, then stops.
pub struct Decoder<'a> {
    tree: &'a SymbolTree,
    reader: BinaryReader<'a>,
    done: bool,
}

impl<'a> Decoder<'a> {
    /// Skips the `tail_padding` zero bits in front of the first payload byte.
    pub fn new(tree: &'a SymbolTree, payload: &'a [u8], tail_padding: u8) -> Result<Self> {
        if tail_padding > 7 {
            return Err(PineError::malformed(format!("tail padding {tail_padding} exceeds 7")));
        }
        let mut reader = BinaryReader::new(payload);
        reader.skip(tail_padding as usize)?;

        Ok(Self { tree, reader, done: false })
    }

    fn next_symbol(&mut self) -> Option<Result<u8>> {
        if self.reader.is_exhausted() {
            return None;
        }

        // A lone leaf has the fixed 1-bit code: every bit is one symbol.
        if let Some(symbol) = self.tree.single_symbol() {
            self.reader.read_bit();
            return Some(Ok(symbol));
        }

        let mut current: NodeId = self.tree.root();
        loop {
            let Some(bit) = self.reader.read_bit() else {
                return Some(Err(PineError::malformed("payload ends in the middle of a code")));
            };

            current = match self.tree.child(current, bit) {
                Ok(next) => next,
                Err(e) => return Some(Err(e)),
            };

            if let Some(Node::Leaf(symbol)) = self.tree.node(current) {
                return Some(Ok(*symbol));
            }
        }
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = self.next_symbol();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}
