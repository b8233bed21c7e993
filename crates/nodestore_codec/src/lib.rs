//! # Nodestore Codec
//!
//! Snapshot value model and text codec for the node store.
//!
//! This crate converts an in-memory node graph to and from its durable
//! textual snapshot:
//! - Pretty-printed JSON, one document per store
//! - Node keys written as decimal object keys, in ascending order
//! - Calendar dates and times of day rendered in fixed ISO-8601 forms
//!   and parsed back exactly on load
//!
//! ## Usage
//!
//! ```
//! use nodestore_codec::{decode_snapshot, encode_snapshot, Snapshot};
//!
//! let snapshot = Snapshot::new();
//! let text = encode_snapshot(&snapshot).unwrap();
//! let decoded = decode_snapshot(&text).unwrap();
//! assert_eq!(decoded, snapshot);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod snapshot;
mod value;

pub use decoder::decode_snapshot;
pub use encoder::encode_snapshot;
pub use error::{CodecError, CodecResult};
pub use snapshot::{Snapshot, SnapshotNode, SnapshotReference};
pub use value::{Value, DATE_FORMAT, DATE_TIME_FORMAT, TIME_FORMAT};
