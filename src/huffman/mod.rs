pub mod code_table;
pub mod decoder;
pub mod tree_builder;

use crate::{
    bitstreams::BitString,
    error::{PineError, Result},
};

pub use code_table::CodeTable;
pub use decoder::Decoder;
pub use tree_builder::SymbolCounts;

/// Index of a node inside a [`SymbolTree`] arena.
pub type NodeId = usize;

/// A leaf owns one symbol. An internal node owns two children; a child is only
/// `None` while a tree is being rebuilt from a serialized table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf(u8),
    Internal {
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
}

impl Node {
    fn vacant() -> Self {
        Node::Internal { left: None, right: None }
    }
}

/// Prefix-code tree stored as an arena of nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SymbolTree {
    /// A tree made of one leaf, produced when the input has a single distinct symbol.
    pub fn single_leaf(symbol: u8) -> Self {
        Self { nodes: vec![Node::Leaf(symbol)], root: 0 }
    }

    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    #[inline(always)]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns `None` for an id outside the arena.
    #[inline(always)]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf(_))).count()
    }

    /// The symbol of a root that is itself a leaf: the single-symbol alphabet case.
    pub fn single_symbol(&self) -> Option<u8> {
        match self.node(self.root) {
            Some(Node::Leaf(symbol)) => Some(*symbol),
            _ => None,
        }
    }

    /// Descends one step from `id`, left on `false` and right on `true`.
    #[inline(always)]
    pub fn child(&self, id: NodeId, bit: bool) -> Result<NodeId> {
        let node = self
            .node(id)
            .ok_or_else(|| PineError::invalid_tree(format!("node {id} is not in the tree")))?;
        match *node {
            Node::Internal { left, right } => {
                let next = if bit { right } else { left };
                match next {
                    Some(next) if next < self.nodes.len() => Ok(next),
                    Some(next) => Err(PineError::invalid_tree(format!(
                        "node {id} points to node {next} outside the tree"
                    ))),
                    None => Err(PineError::invalid_tree(format!(
                        "node {id} has no {} child",
                        if bit { "right" } else { "left" }
                    ))),
                }
            }
            Node::Leaf(symbol) => Err(PineError::invalid_tree(format!(
                "cannot descend below leaf {symbol:#04x}"
            ))),
        }
    }

    /// Checks that every internal node has both children.
    pub fn validate(&self) -> Result<()> {
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Internal { left, right } = node {
                if left.is_none() || right.is_none() {
                    return Err(PineError::invalid_tree(format!(
                        "internal node {id} does not have two children"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rebuilds a tree by inserting every (symbol, code) pair along its path.
    /// A one-entry table becomes a lone leaf again.
    pub fn from_code_table(table: &CodeTable) -> Result<Self> {
        let mut entries = table.iter();
        let (first, first_code) = entries
            .next()
            .ok_or_else(|| PineError::malformed("the code table is empty"))?;

        if table.len() == 1 {
            if first_code.len() != 1 {
                return Err(PineError::malformed(format!(
                    "lone symbol {first:#04x} must have a 1-bit code, found {first_code}"
                )));
            }
            return Ok(Self::single_leaf(first));
        }

        let mut tree = Self { nodes: vec![Node::vacant()], root: 0 };
        for (symbol, code) in table.iter() {
            tree.insert_code(symbol, code)?;
        }
        tree.validate()?;

        Ok(tree)
    }

    fn insert_code(&mut self, symbol: u8, code: &BitString) -> Result<()> {
        let Some(last) = code.len().checked_sub(1) else {
            return Err(PineError::malformed(format!("symbol {symbol:#04x} has an empty code")));
        };

        let mut current = self.root;
        for (i, bit) in code.iter().enumerate() {
            let slot = match &self.nodes[current] {
                Node::Internal { left, right } => if bit { *right } else { *left },
                Node::Leaf(other) => {
                    return Err(PineError::invalid_tree(format!(
                        "code {code} of {symbol:#04x} runs through the leaf of {other:#04x}"
                    )))
                }
            };

            if i == last {
                if slot.is_some() {
                    return Err(PineError::invalid_tree(format!(
                        "code {code} of {symbol:#04x} collides with another code"
                    )));
                }
                let leaf = self.push(Node::Leaf(symbol));
                self.attach(current, bit, leaf);
            } else {
                current = match slot {
                    Some(next) => next,
                    None => {
                        let next = self.push(Node::vacant());
                        self.attach(current, bit, next);
                        next
                    }
                };
            }
        }

        Ok(())
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn attach(&mut self, parent: NodeId, bit: bool, child: NodeId) {
        if let Node::Internal { left, right } = &mut self.nodes[parent] {
            if bit {
                *right = Some(child);
            } else {
                *left = Some(child);
            }
        }
    }
}
