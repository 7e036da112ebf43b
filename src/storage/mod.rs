//! Persistence adapters. The services only see the `EntityStore` and
//! `ObjectStore` traits; backends are chosen at startup.

pub mod entity;
pub mod object;

pub use entity::{EntityStore, MemoryEntityStore, PgEntityStore};
pub use object::{MemoryObjectStore, ObjectStore, S3ObjectStore, StoredObject};
