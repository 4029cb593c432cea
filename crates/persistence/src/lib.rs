//! Durable persistence for catalogs: the record codec and file-backed
//! save/load.
//!
//! The codec is exact-fields-only and all-or-nothing: a single bad record
//! fails the whole decode, so callers replace their in-memory catalog only
//! after a decode succeeds.

pub mod codec;
pub mod file;

pub use codec::{decode, encode};
pub use file::{PersistError, PersistResult, load_from_path, save_to_path};
