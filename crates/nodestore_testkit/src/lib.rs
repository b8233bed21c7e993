//! # Nodestore Testkit
//!
//! Test utilities for the node store.
//!
//! This crate provides:
//! - A catalog fixture backed by a temporary snapshot directory
//! - A ready-made issue-tracker schema exercising every relationship kind
//! - Node builders for the tracker entities
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nodestore_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_catalog() {
//!     let catalog = TestCatalog::new();
//!     let projects = catalog.projects();
//!     // ... store operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::{issue, project, tracker_schema, user, TestCatalog};
}
