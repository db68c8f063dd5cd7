//! Generated documentation: per-contribution pages, tree synchronization and
//! the contribution catalog.

pub mod catalog;
pub mod pages;
pub mod sync;

pub use catalog::write_catalog;
pub use pages::{GeneratedDocs, PageGenerator};
pub use sync::{DocSynchronizer, SyncMode, SyncReport};
