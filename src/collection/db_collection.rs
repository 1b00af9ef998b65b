//! DbCollection - a database of versioned resources seen as one collection

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::CollectionSettings;
use crate::observability::{log_event, Event, MetricsRegistry, ObservationScope};
use crate::revision::RevisionRef;
use crate::snapshot::{lease_write, Access, RevisionResolver, SnapshotDocument, Trx};
use crate::storage::{
    lock_trx, Database, NodeCursor, NodeWriteTrx, ResourceConfig, ResourceManager,
    StorageResult, SubtreeShredder,
};
use crate::stream::VecStream;

use super::capabilities::{Closeable, DocumentAddable, SnapshotResolvable};
use super::{CollectionId, DocumentError, DocumentResult};

/// Snapshot document of a collection over `D`.
pub type Document<D> = SnapshotDocument<<D as Database>::Resource>;

/// Write transaction type of the resources of `D`.
pub type WriteTrxOf<D> = <<D as Database>::Resource as ResourceManager>::WriteTrx;

/// The collection adapter.
///
/// Two collections are equal when they wrap the same database instance.
pub struct DbCollection<D: Database> {
    id: CollectionId,
    name: String,
    database: Arc<D>,
    settings: CollectionSettings,
    resolver: RevisionResolver,
}

impl<D: Database> DbCollection<D> {
    pub(super) fn new(
        id: CollectionId,
        name: String,
        database: Arc<D>,
        settings: CollectionSettings,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            id,
            name,
            database,
            settings,
            resolver: RevisionResolver::new(metrics),
        }
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> &Arc<D> {
        &self.database
    }

    pub fn settings(&self) -> &CollectionSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        self.resolver.metrics()
    }

    /// Number of resources in the collection.
    pub fn document_count(&self) -> usize {
        self.database.list_resources().len()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Latest revision of the only resource, read-only.
    pub fn document(&self) -> DocumentResult<Document<D>> {
        self.document_at_revision(RevisionRef::Latest, Access::ReadOnly)
    }

    pub fn document_updatable(&self, updatable: bool) -> DocumentResult<Document<D>> {
        self.document_at_revision(RevisionRef::Latest, Access::from_updatable(updatable))
    }

    /// `revision` of the only resource.
    ///
    /// Fails with `AmbiguousResource` when the collection holds more than
    /// one resource.
    pub fn document_at_revision(
        &self,
        revision: RevisionRef,
        access: Access,
    ) -> DocumentResult<Document<D>> {
        let name = self.single_resource()?;
        self.named_document_at_revision(&name, revision, access)
    }

    /// Latest revision of resource `name`, read-only.
    pub fn named_document(&self, name: &str) -> DocumentResult<Document<D>> {
        self.named_document_at_revision(name, RevisionRef::Latest, Access::ReadOnly)
    }

    pub fn named_document_at_revision(
        &self,
        name: &str,
        revision: RevisionRef,
        access: Access,
    ) -> DocumentResult<Document<D>> {
        let resource = self.database.open_resource(name)?;
        let trx = self.resolver.resolve_revision(&resource, revision, access)?;
        Ok(SnapshotDocument::new(trx, self.id, name))
    }

    /// Snapshot as of `point_in_time` of the resource named like the
    /// collection.
    pub fn document_at(
        &self,
        point_in_time: DateTime<Utc>,
        access: Access,
    ) -> DocumentResult<Option<Document<D>>> {
        self.named_document_at(&self.name, point_in_time, access)
    }

    /// Snapshot of resource `name` as of `point_in_time`.
    ///
    /// `Ok(None)` if the resource has no revision that old.
    pub fn named_document_at(
        &self,
        name: &str,
        point_in_time: DateTime<Utc>,
        access: Access,
    ) -> DocumentResult<Option<Document<D>>> {
        let resource = self.database.open_resource(name)?;
        let trx = self.resolver.resolve_at(&resource, point_in_time, access)?;
        Ok(trx.map(|trx| SnapshotDocument::new(trx, self.id, name)))
    }

    /// Latest revision of every resource, in creation order.
    pub fn documents(&self, access: Access) -> DocumentResult<VecStream<Document<D>>> {
        let mut documents = Vec::new();
        for name in self.database.list_resources() {
            documents.push(self.named_document_at_revision(&name, RevisionRef::Latest, access)?);
        }
        Ok(VecStream::new(documents))
    }

    fn single_resource(&self) -> DocumentResult<String> {
        let mut resources = self.database.list_resources();
        match resources.len() {
            0 => Err(DocumentError::EmptyCollection(self.name.clone())),
            1 => Ok(resources.remove(0)),
            count => {
                let count_str = count.to_string();
                log_event(
                    Event::AmbiguousResource,
                    &[("collection", &self.name), ("resources", &count_str)],
                );
                Err(DocumentError::AmbiguousResource {
                    collection: self.name.clone(),
                    count,
                })
            }
        }
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Adds a document as resource `{resource_prefix}{count + 1}`.
    pub fn add<S>(&self, shredder: S) -> DocumentResult<Document<D>>
    where
        S: SubtreeShredder<WriteTrxOf<D>>,
    {
        let name = format!("{}{}", self.settings.resource_prefix, self.document_count() + 1);
        self.add_named(&name, shredder)
    }

    /// Creates resource `name`, runs `shredder` in its write transaction and
    /// commits.
    ///
    /// Returns the document backed by that write transaction. If the build
    /// fails the new resource is removed again.
    pub fn add_named<S>(&self, name: &str, mut shredder: S) -> DocumentResult<Document<D>>
    where
        S: SubtreeShredder<WriteTrxOf<D>>,
    {
        let scope =
            ObservationScope::with_fields("INGEST", &[("collection", &self.name), ("resource", name)]);

        match self.ingest(name, &mut shredder) {
            Ok(document) => {
                let revision = document.revision_number().to_string();
                scope.complete_with_fields(&[("revision", &revision)]);
                self.metrics().increment_documents_added();
                log_event(
                    Event::DocumentAdded,
                    &[("collection", &self.name), ("resource", name), ("revision", &revision)],
                );
                Ok(document)
            }
            Err(source) => {
                scope.fail(source.message());
                self.metrics().increment_ingestion_failures();
                log_event(
                    Event::IngestionFailed,
                    &[
                        ("collection", &self.name),
                        ("resource", name),
                        ("code", source.code().code()),
                    ],
                );
                Err(DocumentError::Ingestion {
                    resource: name.to_string(),
                    source,
                })
            }
        }
    }

    fn ingest<S>(&self, name: &str, shredder: &mut S) -> StorageResult<Document<D>>
    where
        S: SubtreeShredder<WriteTrxOf<D>>,
    {
        let config = ResourceConfig::new(name).with_options(self.settings.resource.clone());
        self.database.create_resource(&config)?;

        self.build(name, shredder).or_else(|err| {
            self.database.remove_resource(name)?;
            Err(err)
        })
    }

    fn build<S>(&self, name: &str, shredder: &mut S) -> StorageResult<Document<D>>
    where
        S: SubtreeShredder<WriteTrxOf<D>>,
    {
        let resource = self.database.open_resource(name)?;
        let wtx = lease_write(&resource, self.metrics())?;
        {
            let mut guard = lock_trx(&wtx);
            guard.move_to_document_root()?;
            shredder.shred(&mut *guard)?;
            guard.commit()?;
            guard.move_to_document_root()?;
        }
        Ok(SnapshotDocument::new(Trx::Write(wtx), self.id, name))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Removes the resource created with `document_id`.
    ///
    /// Negative and unknown ids are ignored. Returns whether a resource was
    /// removed.
    pub fn remove(&self, document_id: i64) -> DocumentResult<bool> {
        let Ok(id) = u64::try_from(document_id) else {
            return Ok(false);
        };
        let Some(name) = self.database.resource_name(id) else {
            return Ok(false);
        };

        let removed = self.database.remove_resource(&name)?;
        if removed {
            log_event(
                Event::ResourceRemoved,
                &[("collection", &self.name), ("resource", &name)],
            );
        }
        Ok(removed)
    }

    /// Deletes the underlying database.
    pub fn delete(&self) -> DocumentResult<()> {
        self.database.remove()?;
        log_event(Event::CollectionDeleted, &[("collection", &self.name)]);
        Ok(())
    }

    pub fn close(&self) -> DocumentResult<()> {
        self.database.close()?;
        log_event(Event::CollectionClosed, &[("collection", &self.name)]);
        Ok(())
    }
}

impl<D: Database> Clone for DbCollection<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            database: Arc::clone(&self.database),
            settings: self.settings.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<D: Database> PartialEq for DbCollection<D> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.database, &other.database)
    }
}

impl<D: Database> Eq for DbCollection<D> {}

impl<D: Database> Hash for DbCollection<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(Arc::as_ptr(&self.database), state);
    }
}

impl<D: Database> fmt::Debug for DbCollection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCollection")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("database", &self.database.name())
            .finish()
    }
}

impl<D: Database> SnapshotResolvable for DbCollection<D> {
    type Document = Document<D>;

    fn document_at_revision(
        &self,
        revision: RevisionRef,
        access: Access,
    ) -> DocumentResult<Document<D>> {
        DbCollection::document_at_revision(self, revision, access)
    }

    fn named_document_at_revision(
        &self,
        name: &str,
        revision: RevisionRef,
        access: Access,
    ) -> DocumentResult<Document<D>> {
        DbCollection::named_document_at_revision(self, name, revision, access)
    }

    fn named_document_at(
        &self,
        name: &str,
        point_in_time: DateTime<Utc>,
        access: Access,
    ) -> DocumentResult<Option<Document<D>>> {
        DbCollection::named_document_at(self, name, point_in_time, access)
    }
}

impl<D, S> DocumentAddable<S> for DbCollection<D>
where
    D: Database,
    S: SubtreeShredder<WriteTrxOf<D>>,
{
    type Document = Document<D>;

    fn add(&self, shredder: S) -> DocumentResult<Document<D>> {
        DbCollection::add(self, shredder)
    }

    fn add_named(&self, name: &str, shredder: S) -> DocumentResult<Document<D>> {
        DbCollection::add_named(self, name, shredder)
    }
}

impl<D: Database> Closeable for DbCollection<D> {
    fn close(&self) -> DocumentResult<()> {
        DbCollection::close(self)
    }
}
