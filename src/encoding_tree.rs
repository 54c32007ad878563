//! Byte trie of a character set's encoding.
//!
//! Each path from the root spells one valid encoded sequence of the external
//! character set; the leaf at the end of the path carries the bytes that
//! sequence decodes to. Leaves carry data, inner nodes never do, so a sequence
//! can be decoded by following bytes until a payload is found.

use crate::error::{ConflictKind, ExtractError, Result};
use ahash::AHashMap as HashMap;
use slotmap::{new_key_type, SlotMap};

/// Longest encoded sequence any supported character set produces.
pub const MAX_ENCODING_LEN: usize = 4;

new_key_type! {
    /// Handle to a node inside an [`EncodingTree`].
    pub struct NodeKey;
}

/// A single trie node.
#[derive(Debug, Default)]
pub(crate) struct EncodingNode {
    children: HashMap<u8, NodeKey>,
    payload: Option<Vec<u8>>,
    min: u8,
    max: u8,
}

impl EncodingNode {
    /// Payload of a leaf; inner nodes never report one.
    fn leaf_payload(&self) -> Option<&[u8]> {
        match &self.payload {
            Some(payload) if self.children.is_empty() => Some(payload),
            _ => None,
        }
    }
}

/// Arena-backed trie. Nodes are owned by the tree and addressed by
/// [`NodeKey`]; the root always exists.
#[derive(Debug)]
pub struct EncodingTree {
    nodes: SlotMap<NodeKey, EncodingNode>,
    root: NodeKey,
    leaves: usize,
}

impl EncodingTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(EncodingNode::default());

        Self {
            nodes,
            root,
            leaves: 0,
        }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of payloads stored.
    pub fn len(&self) -> usize {
        self.leaves
    }

    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    /// Returns the child of `node` for `value`, creating it when missing.
    ///
    /// The node's min/max bookkeeping is updated in both cases.
    pub fn add_child(&mut self, node: NodeKey, value: u8) -> NodeKey {
        let parent = &mut self.nodes[node];
        if parent.children.is_empty() {
            parent.min = value;
            parent.max = value;
        } else if value < parent.min {
            parent.min = value;
        } else if value > parent.max {
            parent.max = value;
        }

        if let Some(&child) = parent.children.get(&value) {
            return child;
        }

        let child = self.nodes.insert(EncodingNode::default());
        self.nodes[node].children.insert(value, child);
        child
    }

    /// Stores `payload` on `node`.
    ///
    /// Fails if the node already has children or a payload.
    pub fn set_payload(
        &mut self,
        node: NodeKey,
        payload: Vec<u8>,
    ) -> std::result::Result<(), ConflictKind> {
        let target = &mut self.nodes[node];
        if !target.children.is_empty() {
            return Err(ConflictKind::HasChildren);
        }
        if target.payload.is_some() {
            return Err(ConflictKind::PayloadAlreadySet);
        }

        target.payload = Some(payload);
        self.leaves += 1;
        Ok(())
    }

    pub fn child(&self, node: NodeKey, value: u8) -> Option<NodeKey> {
        self.nodes.get(node)?.children.get(&value).copied()
    }

    /// Payload stored on `node`, if it is a leaf carrying one.
    pub fn payload(&self, node: NodeKey) -> Option<&[u8]> {
        self.nodes.get(node)?.leaf_payload()
    }

    /// Inserts the full `path`, storing `payload` on its last node.
    ///
    /// Passing through a node that already carries a payload is a conflict,
    /// as is ending on a node that has children or a payload. `path` and
    /// `payload` must both be 1 to [`MAX_ENCODING_LEN`] bytes long.
    pub fn insert(&mut self, path: &[u8], payload: Vec<u8>) -> Result<()> {
        let valid_len = 1..=MAX_ENCODING_LEN;
        if !valid_len.contains(&path.len()) || !valid_len.contains(&payload.len()) {
            return Err(ExtractError::StructuralConflict {
                path: path.to_vec(),
                kind: ConflictKind::InvalidLength,
            });
        }

        let mut node = self.root;
        for &value in path {
            if self.nodes[node].payload.is_some() {
                return Err(ExtractError::StructuralConflict {
                    path: path.to_vec(),
                    kind: ConflictKind::PayloadAlreadySet,
                });
            }
            node = self.add_child(node, value);
        }

        self.set_payload(node, payload)
            .map_err(|kind| ExtractError::StructuralConflict {
                path: path.to_vec(),
                kind,
            })
    }

    /// Follows `path` from the root and returns the payload at its end.
    pub fn get(&self, path: &[u8]) -> Option<&[u8]> {
        let node = path
            .iter()
            .try_fold(self.root, |node, &value| self.child(node, value))?;
        self.payload(node)
    }

    /// Iterates over all `(input, output)` pairs, shortest inputs first and
    /// ascending within each length.
    pub fn iter(&self) -> EncodingIter<'_> {
        EncodingIter::new(self)
    }
}

impl Default for EncodingTree {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a EncodingTree {
    type Item = (Vec<u8>, Vec<u8>);
    type IntoIter = EncodingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ordered walk over an [`EncodingTree`].
///
/// The walk runs one depth-first pass per sequence length and only reports
/// leaves found exactly at that length, which gives the (length, bytes)
/// ordering `RangeMapBuilder` relies on.
pub struct EncodingIter<'a> {
    tree: &'a EncodingTree,
    /// `(node, next byte to probe)` for every level of the current path.
    stack: Vec<(NodeKey, u16)>,
    /// Level at which leaves are reported during the current pass.
    depth: usize,
}

impl<'a> EncodingIter<'a> {
    fn new(tree: &'a EncodingTree) -> Self {
        let root = &tree.nodes[tree.root];
        let mut stack = Vec::with_capacity(MAX_ENCODING_LEN);
        stack.push((tree.root, root.min as u16));

        Self {
            tree,
            stack,
            depth: 0,
        }
    }

    /// Restarts the walk from the shortest sequences.
    pub fn reset(&mut self) {
        *self = Self::new(self.tree);
    }
}

impl<'a> Iterator for EncodingIter<'a> {
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let nodes = &tree.nodes;

        loop {
            if self.depth >= MAX_ENCODING_LEN {
                return None;
            }

            let level = self.stack.len() - 1;
            let (key, progress) = self.stack[level];
            let node = &nodes[key];

            if node.children.is_empty() || progress > node.max as u16 {
                if level == 0 {
                    // pass finished, start over one level deeper
                    self.depth += 1;
                    self.stack[0].1 = node.min as u16;
                } else {
                    self.stack.pop();
                    self.stack[level - 1].1 += 1;
                }
                continue;
            }

            let Some(&child_key) = node.children.get(&(progress as u8)) else {
                self.stack[level].1 += 1;
                continue;
            };
            let child = &nodes[child_key];

            if level == self.depth {
                if let Some(payload) = child.leaf_payload() {
                    let input = self.stack.iter().map(|&(_, p)| p as u8).collect();
                    self.stack[level].1 += 1;
                    return Some((input, payload.to_vec()));
                }
                self.stack[level].1 += 1;
                continue;
            }

            if child.children.is_empty() {
                self.stack[level].1 += 1;
            } else {
                self.stack.push((child_key, child.min as u16));
            }
        }
    }
}
