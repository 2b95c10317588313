// ABOUTME: Persistence layer for folio: the binary blob store and the outline snapshot.
// ABOUTME: Blob stores are async trait objects; the snapshot store is a synchronous JSON slot.

pub mod blob;
pub mod snapshot;
pub mod sqlite;

pub use blob::{BlobError, BlobStore, MemoryBlobStore};
pub use snapshot::{SNAPSHOT_VERSION, SnapshotData, SnapshotError, SnapshotStore};
pub use sqlite::SqliteBlobStore;
