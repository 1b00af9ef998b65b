//! SnapshotDocument - a positioned transaction plus its collection

use std::fmt;

use chrono::{DateTime, Utc};

use crate::collection::{CollectionId, DocumentResult};
use crate::revision::RevisionNumber;
use crate::storage::{NodeKey, ResourceManager};
use crate::stream::{Item, NodeKeyStream, Stream};

use super::{Trx, TrxCursor};

/// One resource of a collection, bound to one revision.
///
/// Owns its transaction. Closing a read-only document closes the
/// transaction; closing an updatable one only gives back this handle.
pub struct SnapshotDocument<R: ResourceManager> {
    trx: Trx<R>,
    collection: CollectionId,
    resource: String,
}

impl<R: ResourceManager> SnapshotDocument<R> {
    pub fn new(trx: Trx<R>, collection: CollectionId, resource: impl Into<String>) -> Self {
        Self {
            trx,
            collection,
            resource: resource.into(),
        }
    }

    pub fn collection_id(&self) -> CollectionId {
        self.collection
    }

    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    pub fn revision_number(&self) -> RevisionNumber {
        self.trx.revision_number()
    }

    pub fn revision_timestamp(&self) -> DateTime<Utc> {
        self.trx.revision_timestamp()
    }

    pub fn is_updatable(&self) -> bool {
        self.trx.is_updatable()
    }

    pub fn trx(&self) -> &Trx<R> {
        &self.trx
    }

    pub fn trx_mut(&mut self) -> &mut Trx<R> {
        &mut self.trx
    }

    pub fn cursor(&mut self) -> TrxCursor<'_, R> {
        self.trx.cursor()
    }

    /// Materializes every node named by `groups`, group by group.
    ///
    /// Empty groups are skipped.
    pub fn items<G>(&mut self, groups: G) -> DocumentResult<Vec<Item>>
    where
        G: IntoIterator,
        G::Item: IntoIterator<Item = NodeKey>,
    {
        let collection = self.collection;
        let mut cursor = self.trx.cursor();
        let mut stream = NodeKeyStream::new(groups, &mut cursor, collection);

        let mut items = Vec::new();
        loop {
            match stream.next()? {
                Some(item) => items.push(item),
                None if stream.is_exhausted() => break,
                None => continue,
            }
        }
        Ok(items)
    }

    pub fn close(self) {
        self.trx.close();
    }
}

impl<R: ResourceManager> fmt::Debug for SnapshotDocument<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotDocument")
            .field("collection", &self.collection)
            .field("resource", &self.resource)
            .field("trx", &self.trx)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::IdSequence;
    use crate::index::NodeReferences;
    use crate::storage::memory::{MemoryDatabase, MemoryResource};
    use crate::storage::{lock_trx, Database, NodeKind, NodeWriteTrx, ResourceConfig};

    fn resource() -> MemoryResource {
        let db = MemoryDatabase::new("db");
        db.create_resource(&ResourceConfig::new("doc")).unwrap();
        let resource = db.open_resource("doc").unwrap();
        let wtx = resource.begin_write_trx().unwrap();
        {
            let mut wtx = lock_trx(&wtx);
            wtx.insert_child(NodeKind::Element { name: "book".into() }).unwrap();
            wtx.insert_child(NodeKind::Text { value: "Dune".into() }).unwrap();
            wtx.commit().unwrap();
        }
        resource.close_write_trx();
        resource
    }

    #[test]
    fn test_read_only_document() {
        let resource = resource();
        let collection = IdSequence::new().next_id();
        let trx: Trx<MemoryResource> =
            Trx::ReadOnly(resource.begin_read_trx(RevisionNumber::new(2).unwrap()).unwrap());
        let document = SnapshotDocument::new(trx, collection, "doc");

        assert_eq!(document.collection_id(), collection);
        assert_eq!(document.resource_name(), "doc");
        assert_eq!(document.revision_number().value(), 2);
        assert!(!document.is_updatable());

        document.close();
        assert_eq!(resource.stats().live_read_trx(), 0);
    }

    #[test]
    fn test_items_skip_empty_groups() {
        let resource = resource();
        let collection = IdSequence::new().next_id();
        let trx: Trx<MemoryResource> =
            Trx::ReadOnly(resource.begin_read_trx(RevisionNumber::new(2).unwrap()).unwrap());
        let mut document = SnapshotDocument::new(trx, collection, "doc");

        let groups = vec![NodeReferences::from([2]), NodeReferences::new(), NodeReferences::from([1])];
        let items = document.items(groups).unwrap();
        let keys: Vec<_> = items.iter().map(|item| item.node_key()).collect();
        assert_eq!(keys, vec![2, 1]);
        assert_eq!(items[0].kind(), &NodeKind::Text { value: "Dune".into() });
    }

    #[test]
    fn test_items_through_write_trx() {
        let resource = resource();
        let collection = IdSequence::new().next_id();
        let trx: Trx<MemoryResource> = Trx::Write(resource.begin_write_trx().unwrap());
        let mut document = SnapshotDocument::new(trx, collection, "doc");

        let items = document.items([[1u64]]).unwrap();
        assert_eq!(items.len(), 1);
        assert!(document.is_updatable());

        document.close();
        assert!(resource.has_running_write_trx());
    }
}
