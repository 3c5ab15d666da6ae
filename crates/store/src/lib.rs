//! Entity store for authors and their courses.
//!
//! Reads go against committed state. Writes are staged on a
//! [`LibrarySession`] and become visible together on [`LibrarySession::save`].

pub mod entities;
pub mod error;
pub mod filter;
pub mod seed;
mod session;
mod tables;

pub use entities::{Author, Course};
pub use error::{StoreError, StoreResult};
pub use filter::AuthorFilter;
pub use session::{LibrarySession, LibraryStore};
