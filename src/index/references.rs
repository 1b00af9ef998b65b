//! NodeReferences - the node keys matching one index key

use std::collections::btree_set;
use std::collections::BTreeSet;

use crate::storage::NodeKey;

/// Set of node keys that all match one index key.
///
/// Iteration is ascending by key. Index lookups never produce empty groups,
/// but consumers must tolerate them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeReferences {
    keys: BTreeSet<NodeKey>,
}

impl NodeReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key`. Returns false if it was already present.
    pub fn add(&mut self, key: NodeKey) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: NodeKey) -> bool {
        self.keys.remove(&key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.keys.iter().copied()
    }
}

impl FromIterator<NodeKey> for NodeReferences {
    fn from_iter<T: IntoIterator<Item = NodeKey>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[NodeKey; N]> for NodeReferences {
    fn from(keys: [NodeKey; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl IntoIterator for NodeReferences {
    type Item = NodeKey;
    type IntoIter = btree_set::IntoIter<NodeKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let mut refs = NodeReferences::new();
        assert!(refs.add(7));
        assert!(!refs.add(7));
        assert!(refs.add(5));
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn test_iterates_ascending() {
        let refs = NodeReferences::from([9, 2, 5]);
        assert_eq!(refs.iter().collect::<Vec<_>>(), vec![2, 5, 9]);
        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec![2, 5, 9]);
    }

    #[test]
    fn test_remove() {
        let mut refs = NodeReferences::from([1, 2]);
        assert!(refs.remove(1));
        assert!(!refs.contains(1));
        assert!(!refs.remove(1));
        assert!(!refs.is_empty());
    }
}
