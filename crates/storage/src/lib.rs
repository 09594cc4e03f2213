//! # Repoatlas Storage
//!
//! Storage adapter and repository metadata layout shared by the note and
//! view stores.
//!
//! ## Layout
//!
//! ```text
//! <repo root>/.repoatlas/
//!     ├── notes.json          note collection
//!     ├── config.json         limits + tag enforcement
//!     ├── views/<id>.json     one file per view
//!     └── tags/<tag>.md       one description per tag
//! ```
//!
//! All access goes through [`StorageAdapter`]; [`LocalStore`] is the disk
//! implementation, [`MemoryStore`] the test double.

mod adapter;
mod error;
mod local;
mod memory;
mod repository;

pub mod paths;

pub use adapter::StorageAdapter;
pub use error::{Result, StorageError};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use repository::Repository;
