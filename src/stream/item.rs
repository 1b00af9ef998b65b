//! Item - a query-consumable view of one stored node

use serde::Serialize;

use crate::collection::CollectionId;
use crate::revision::RevisionNumber;
use crate::storage::{NodeCursor, NodeKey, NodeKind, StorageResult};

/// One node as seen by the query layer, tagged with the collection and
/// revision it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    collection: CollectionId,
    node_key: NodeKey,
    revision: RevisionNumber,
    kind: NodeKind,
}

impl Item {
    /// Materializes the node under `cursor`.
    pub fn from_cursor<C: NodeCursor + ?Sized>(
        cursor: &C,
        collection: CollectionId,
    ) -> StorageResult<Self> {
        let node = cursor.node()?;
        Ok(Self {
            collection,
            node_key: node.key(),
            revision: cursor.revision_number(),
            kind: node.kind().clone(),
        })
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    pub fn node_key(&self) -> NodeKey {
        self.node_key
    }

    pub fn revision(&self) -> RevisionNumber {
        self.revision
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}
