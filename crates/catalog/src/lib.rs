//! Catalog domain: the product model and the store that owns it.
//!
//! This crate is pure, deterministic domain logic (no IO, no clock reads).
//! Persistence lives in `stockroom-persistence`; all date-sensitive
//! behavior takes the date as an argument.

pub mod product;
pub mod store;

pub use product::{Product, ProductDetails, ProductKind};
pub use store::Catalog;
