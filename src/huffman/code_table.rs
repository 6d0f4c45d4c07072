use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    bitstreams::BitString,
    error::{PineError, Result},
};

use super::{Node, NodeId, SymbolCounts, SymbolTree};

/// Maps every symbol to its root-to-leaf path: `0` for a left step, `1` for a right one.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodeTable {
    codes: BTreeMap<u8, BitString>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks the tree depth first. A lone leaf gets the fixed code `0`.
    pub fn from_tree(tree: &SymbolTree) -> Result<Self> {
        let mut table = CodeTable::new();

        if let Some(symbol) = tree.single_symbol() {
            table.codes.insert(symbol, "0".parse()?);
            return Ok(table);
        }

        let mut stack: Vec<(NodeId, BitString)> = vec![(tree.root(), BitString::new())];
        while let Some((id, path)) = stack.pop() {
            let node = tree
                .node(id)
                .ok_or_else(|| PineError::invalid_tree(format!("node {id} is not in the tree")))?;
            match node {
                Node::Leaf(symbol) => table.insert(*symbol, path)?,
                Node::Internal { left: Some(left), right: Some(right) } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    stack.push((*right, right_path));

                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((*left, left_path));
                }
                Node::Internal { .. } => {
                    return Err(PineError::invalid_tree(format!(
                        "internal node {id} at path \"{path}\" does not have two children"
                    )))
                }
            }
        }

        Ok(table)
    }

    /// Adds an entry, refusing a symbol that already has a code.
    pub(crate) fn insert(&mut self, symbol: u8, code: BitString) -> Result<()> {
        if self.codes.contains_key(&symbol) {
            return Err(PineError::invalid_tree(format!("symbol {symbol:#04x} appears twice")));
        }
        self.codes.insert(symbol, code);
        Ok(())
    }

    pub fn get(&self, symbol: u8) -> Option<&BitString> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitString)> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c))
    }

    /// Number of payload bits the counted source encodes to, before padding.
    pub fn encoded_bit_len(&self, counts: &SymbolCounts) -> Result<usize> {
        counts.iter().try_fold(0usize, |acc, (symbol, count)| {
            let code = self.get(symbol).ok_or(PineError::SymbolNotInTable(symbol))?;
            Ok(acc + code.len() * count as usize)
        })
    }

    /// True when no code is a prefix of another one.
    pub fn is_prefix_free(&self) -> bool {
        // In lexicographic order a prefix sorts right before the codes it prefixes.
        let mut codes: Vec<&BitString> = self.codes.values().collect();
        codes.sort();
        codes.windows(2).all(|w| !w[0].is_prefix_of(w[1]))
    }
}
