//! # Merkle Tree
//!
//! A balanced binary hash tree over a block's transaction ids, built on
//! demand to answer one inclusion query and then dropped. The full node uses
//! it to hand light clients an inclusion path; the SPV client re-folds that
//! path against the Merkle root stored in its headers.
//!
//! Three construction rules, all load-bearing:
//!
//! 1. **Odd leaf counts duplicate the last leaf**, so every internal node
//!    has exactly two children:
//!
//!    ```text
//!                    root
//!                  /      \
//!              hash0123   hash44
//!              /    \      /  \
//!           h01    h23   h4   h4
//!           /\     /\
//!          h0 h1  h2 h3
//!    ```
//!
//! 2. **The split puts a pure power of two on the right.** A subrange of
//!    length `m` splits at `m − 2^⌊log2 m⌋ / 2`; the left child carries the
//!    remainder. An off-by-one here yields trees whose paths do not verify.
//!
//! 3. **Sibling hashes combine by integer sum**, which commutes — so an
//!    inclusion path needs no left/right flags. See [`crate::crypto::hash::combine`].
//!
//! Nodes live in an arena and refer to each other by index; parent links are
//! plain indices, no interior mutability required.

use thiserror::Error;

use crate::config::EMPTY_TREE_ROOT;
use crate::crypto::hash::{combine, sha1_digest, Digest};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures from inclusion-path queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    /// The tree was built over no leaves; there is nothing to prove.
    #[error("tree is empty")]
    EmptyTree,

    /// No leaf carries the requested value.
    #[error("no matching leaf in tree for {0}")]
    LeafNotFound(String),
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// One arena slot. Leaves remember the transaction id they were built from;
/// internal nodes remember their children.
#[derive(Debug, Clone)]
struct MerkleNode {
    value: Digest,
    parent: Option<usize>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf { content: Digest },
    Internal { left: usize, right: usize },
}

// ---------------------------------------------------------------------------
// MerkleTree
// ---------------------------------------------------------------------------

/// A fully built tree over an ordered sequence of transaction ids.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    nodes: Vec<MerkleNode>,
    /// Leaf arena indices in insertion order, duplicate included.
    leaves: Vec<usize>,
    root: Option<usize>,
}

impl MerkleTree {
    /// Build the tree for an ordered list of transaction ids.
    pub fn from_tx_ids(tx_ids: &[Digest]) -> Self {
        let mut tree = MerkleTree {
            nodes: Vec::with_capacity(tx_ids.len() * 2 + 1),
            leaves: Vec::with_capacity(tx_ids.len() + 1),
            root: None,
        };

        for id in tx_ids {
            let idx = tree.push_leaf(*id);
            tree.leaves.push(idx);
        }

        // Odd leaf count: append a second leaf with the same content so the
        // count is even before any splitting happens.
        if tree.leaves.len() % 2 == 1 {
            let last = *tree.leaves.last().expect("non-empty by the parity check");
            let content = match tree.nodes[last].kind {
                NodeKind::Leaf { content } => content,
                NodeKind::Internal { .. } => unreachable!("leaves vec only holds leaves"),
            };
            let dup = tree.push_leaf(content);
            tree.leaves.push(dup);
        }

        if !tree.leaves.is_empty() {
            let order: Vec<usize> = tree.leaves.clone();
            let root = tree.build(&order);
            tree.root = Some(root);
        }
        tree
    }

    /// The root digest. An empty tree answers with the stored sentinel.
    pub fn root(&self) -> Digest {
        match self.root {
            Some(idx) => self.nodes[idx].value,
            None => EMPTY_TREE_ROOT
                .parse()
                .expect("sentinel constant is valid hex"),
        }
    }

    /// The inclusion path for the leaf whose content equals `tx_id`: the
    /// sibling digests from the leaf up to (but excluding) the root.
    pub fn path(&self, tx_id: &Digest) -> Result<Vec<Digest>, MerkleError> {
        if self.leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut current = self
            .leaves
            .iter()
            .copied()
            .find(|&idx| match self.nodes[idx].kind {
                NodeKind::Leaf { content } => content == *tx_id,
                NodeKind::Internal { .. } => false,
            })
            .ok_or_else(|| MerkleError::LeafNotFound(tx_id.to_string()))?;

        let mut path = Vec::new();
        while let Some(parent) = self.nodes[current].parent {
            path.push(self.nodes[self.sibling_of(current, parent)].value);
            current = parent;
        }
        Ok(path)
    }

    /// Number of leaves, counting the duplicate for odd inputs.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    fn push_leaf(&mut self, content: Digest) -> usize {
        self.nodes.push(MerkleNode {
            value: leaf_hash(&content),
            parent: None,
            kind: NodeKind::Leaf { content },
        });
        self.nodes.len() - 1
    }

    fn push_internal(&mut self, left: usize, right: usize) -> usize {
        let value = combine(&self.nodes[left].value, &self.nodes[right].value);
        self.nodes.push(MerkleNode {
            value,
            parent: None,
            kind: NodeKind::Internal { left, right },
        });
        let idx = self.nodes.len() - 1;
        self.nodes[left].parent = Some(idx);
        self.nodes[right].parent = Some(idx);
        idx
    }

    /// Recursive top-down construction over a slice of node indices whose
    /// length is always even and at least two (duplication guarantees it).
    fn build(&mut self, range: &[usize]) -> usize {
        if range.len() == 2 {
            return self.push_internal(range[0], range[1]);
        }
        // Left child takes the remainder, right child a pure power of two.
        let split = range.len() - (1usize << range.len().ilog2()) / 2;
        let left = self.build(&range[..split]);
        let right = self.build(&range[split..]);
        self.push_internal(left, right)
    }

    fn sibling_of(&self, child: usize, parent: usize) -> usize {
        match self.nodes[parent].kind {
            NodeKind::Internal { left, right } => {
                if left == child {
                    right
                } else {
                    left
                }
            }
            NodeKind::Leaf { .. } => unreachable!("a parent is always internal"),
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf hashing & path verification
// ---------------------------------------------------------------------------

/// Hash a leaf value: `H` over the UTF-8 bytes of the id's hex rendering.
pub fn leaf_hash(tx_id: &Digest) -> Digest {
    sha1_digest(tx_id.to_string().as_bytes())
}

/// Fold an inclusion path from the leaf upward and compare against a stored
/// root. This is the entire SPV trust step: the client knows only `root`.
pub fn verify_path(tx_id: &Digest, path: &[Digest], root: &Digest) -> bool {
    fold_path(tx_id, path) == *root
}

/// The fold itself, exposed so callers can report the mismatching digest.
pub fn fold_path(tx_id: &Digest, path: &[Digest]) -> Digest {
    let mut acc = leaf_hash(tx_id);
    for sibling in path {
        acc = combine(&acc, sibling);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Digest> {
        (0..n)
            .map(|i| sha1_digest(format!("tx-{i}").as_bytes()))
            .collect()
    }

    #[test]
    fn every_leaf_path_verifies() {
        for n in 1..=9 {
            let leaves = ids(n);
            let tree = MerkleTree::from_tx_ids(&leaves);
            let root = tree.root();
            for id in &leaves {
                let path = tree.path(id).expect("leaf is present");
                assert!(
                    verify_path(id, &path, &root),
                    "path for leaf failed at n={n}"
                );
            }
        }
    }

    #[test]
    fn absent_leaf_is_an_error() {
        let leaves = ids(6);
        let tree = MerkleTree::from_tx_ids(&leaves);
        let missing = sha1_digest(b"not-in-tree");
        assert_eq!(
            tree.path(&missing),
            Err(MerkleError::LeafNotFound(missing.to_string()))
        );
    }

    #[test]
    fn empty_tree_root_is_the_sentinel() {
        let tree = MerkleTree::from_tx_ids(&[]);
        assert_eq!(tree.root().to_string(), EMPTY_TREE_ROOT);
        assert_eq!(tree.path(&sha1_digest(b"x")), Err(MerkleError::EmptyTree));
    }

    #[test]
    fn odd_count_duplicates_the_last_leaf() {
        let odd = ids(5);
        let mut padded = odd.clone();
        padded.push(*odd.last().unwrap());

        let from_odd = MerkleTree::from_tx_ids(&odd);
        let from_padded = MerkleTree::from_tx_ids(&padded);
        assert_eq!(from_odd.root(), from_padded.root());
        assert_eq!(from_odd.leaf_count(), 6);
    }

    #[test]
    fn split_shape_is_full_on_the_right() {
        // Five leaves duplicate to six; the root splits 4|2, so leaves on
        // the left climb three levels and the duplicated pair climbs two.
        let leaves = ids(5);
        let tree = MerkleTree::from_tx_ids(&leaves);
        assert_eq!(tree.path(&leaves[0]).unwrap().len(), 3);
        assert_eq!(tree.path(&leaves[4]).unwrap().len(), 2);
    }

    #[test]
    fn single_leaf_pairs_with_its_duplicate() {
        let leaves = ids(1);
        let tree = MerkleTree::from_tx_ids(&leaves);
        let expected = combine(&leaf_hash(&leaves[0]), &leaf_hash(&leaves[0]));
        assert_eq!(tree.root(), expected);

        let path = tree.path(&leaves[0]).unwrap();
        assert_eq!(path, vec![leaf_hash(&leaves[0])]);
    }

    #[test]
    fn path_rejects_wrong_root() {
        let leaves = ids(4);
        let tree = MerkleTree::from_tx_ids(&leaves);
        let path = tree.path(&leaves[2]).unwrap();
        let wrong_root = sha1_digest(b"imposter");
        assert!(!verify_path(&leaves[2], &path, &wrong_root));
    }

    #[test]
    fn corrupted_sibling_breaks_the_fold() {
        let leaves = ids(8);
        let tree = MerkleTree::from_tx_ids(&leaves);
        let mut path = tree.path(&leaves[3]).unwrap();
        path[1] = sha1_digest(b"flipped");
        assert!(!verify_path(&leaves[3], &path, &tree.root()));
    }
}
