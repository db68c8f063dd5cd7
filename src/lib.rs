//! contribkit - Scaffolding, validation and documentation for contributions
//!
//! Each contribution is a self-contained directory under a source root. This
//! crate creates the standard files of a contribution, checks its metadata
//! descriptor for required fields, and keeps a generated documentation tree
//! (per-module pages, a README summary, and an index) in step with the
//! source tree.

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod metadata;
pub mod scaffold;
pub mod util;
pub mod validator;
