//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, stock
/// invariants, id conflicts, malformed records). Infrastructure concerns
/// such as file IO belong to the persistence layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A caller-supplied value failed validation (e.g. negative amount).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A sell would drive stock below zero. State is left unchanged.
    #[error("insufficient stock for {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: ProductId,
        requested: u64,
        available: u64,
    },

    /// An insert collided with an existing product id.
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),

    /// No product with the given id.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// A persisted record was missing fields, carried extra fields, or held
    /// a malformed value.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A persisted record's kind tag is outside the closed variant set.
    #[error("unknown product kind: {0}")]
    UnknownVariant(String),
}

impl CatalogError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    pub fn unknown_variant(kind: impl Into<String>) -> Self {
        Self::UnknownVariant(kind.into())
    }
}
