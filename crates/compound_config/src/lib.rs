//! Configuration binding for Compound components.
//!
//! `compound_config` writes values from configuration documents into the
//! fields of ordinary Rust structs:
//!
//! - [`document`] - Tree-shaped configuration documents addressed by dotted keys
//! - [`store`] - Where documents come from (memory, a directory of JSON files)
//! - [`schema`] - Per-type descriptions of which fields are bound, and how
//! - [`resolver`] - Custom conversions from raw values to field types
//! - [`binder`] - The binder that ties the above together
//!
//! Types describe themselves either by implementing [`Configurable`] by hand
//! or with `#[derive(Configurable)]`.
//!
//! # Example
//!
//! ```
//! use compound_config::prelude::*;
//!
//! #[derive(Default, Configurable)]
//! #[config(path = "database.json")]
//! struct Database {
//!     #[config(key = "connection.host")]
//!     host: String,
//!     #[config(required = false)]
//!     pool_size: u32,
//! }
//!
//! let store = MemoryStore::new().with_document(
//!     "database.json",
//!     ConfigDocument::new().with("connection.host", "db.internal"),
//! );
//!
//! let mut db = Database { pool_size: 4, ..Default::default() };
//! Binder::new(store).bind(&mut db).unwrap();
//! assert_eq!(db.host, "db.internal");
//! assert_eq!(db.pool_size, 4);
//! ```

// Self-reference so `#[derive(Configurable)]` output resolves inside this crate.
extern crate self as compound_config;

/// The configuration binder.
pub mod binder;

/// Color-code translation for text fields.
pub mod colorize;

/// Configuration documents.
pub mod document;

/// Error types.
pub mod error;

/// Resolvers: custom raw-value conversions.
pub mod resolver;

/// Binding schemas for configurable types.
pub mod schema;

/// Document stores.
pub mod store;

/// Raw value kinds and conversions.
pub mod value;

/// Re-export the `#[derive(Configurable)]` macro.
pub use compound_config_macros::Configurable;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::binder::*;
    pub use crate::colorize::*;
    pub use crate::document::*;
    pub use crate::error::*;
    pub use crate::resolver::*;
    pub use crate::schema::*;
    pub use crate::store::*;
    pub use crate::value::*;
    pub use compound_config_macros::Configurable;
}
