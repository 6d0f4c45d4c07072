use std::{cmp::Reverse, collections::BinaryHeap, io::Read};

use crate::error::{PineError, Result};

use super::{Node, NodeId, SymbolTree};

/// Occurrence count of every byte value in a source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymbolCounts {
    counts: [u64; 256],
}

impl Default for SymbolCounts {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl SymbolCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut counts = Self::new();
        counts.add(bytes);
        counts
    }

    /// Counts a source chunk by chunk, so it never has to be held in memory at once.
    pub fn from_reader<R: Read>(reader: &mut R, chunk_size: usize) -> Result<Self> {
        let mut counts = Self::new();
        let mut buf = vec![0u8; chunk_size.max(1)];
        loop {
            let read = reader.read(&mut buf)?;
            if read == 0 {
                break;
            }
            counts.add(&buf[..read]);
        }
        Ok(counts)
    }

    #[inline(always)]
    pub fn add(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.counts[b as usize] += 1;
        }
    }

    /// Adds the counts of an independently counted partition.
    pub fn merge(&mut self, other: &SymbolCounts) {
        for (c, o) in self.counts.iter_mut().zip(other.counts.iter()) {
            *c += o;
        }
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// (symbol, count) for every symbol that occurs, in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }
}

/// Heap entry: a subtree root keyed by its cumulative weight. Ties are broken by
/// `key`, the symbol for leaves and 256 + merge index for internal nodes.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct HeapNode {
    weight: u64,
    key: usize,
    node: NodeId,
}

/// Builds the prefix-code tree by repeatedly merging the two lightest subtrees.
///
/// The first entry taken off the heap becomes the right child and the second the
/// left one, so the heavier of the two sits on the `0` side.
pub fn build_tree(counts: &SymbolCounts) -> Result<SymbolTree> {
    let mut nodes = Vec::with_capacity(2 * counts.distinct());
    let mut freq_tree = BinaryHeap::with_capacity(counts.distinct());

    for (symbol, weight) in counts.iter() {
        nodes.push(Node::Leaf(symbol));
        freq_tree.push(Reverse(HeapNode { weight, key: symbol as usize, node: nodes.len() - 1 }));
    }

    match freq_tree.len() {
        0 => return Err(PineError::EmptyInput),
        1 => return Ok(SymbolTree::from_parts(nodes, 0)),
        _ => {}
    }

    let mut merges = 0;
    while let (Some(Reverse(first)), Some(Reverse(second))) = (freq_tree.pop(), freq_tree.pop()) {
        nodes.push(Node::Internal { left: Some(second.node), right: Some(first.node) });
        freq_tree.push(Reverse(HeapNode {
            weight: first.weight + second.weight,
            key: 256 + merges,
            node: nodes.len() - 1,
        }));
        merges += 1;
    }

    // Stops with one entry left, the node pushed by the last merge.
    let root = nodes.len() - 1;
    Ok(SymbolTree::from_parts(nodes, root))
}
