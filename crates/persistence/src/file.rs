use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use stockroom_catalog::Catalog;
use stockroom_core::CatalogError;

/// Persistence-layer error: domain/codec failures plus file IO.
///
/// Kept separate from [`CatalogError`] so the domain error stays `Clone`
/// and `Eq` and free of infrastructure concerns.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Encode `catalog` and write it to `path`. A failed write fails the whole
/// save; no partial-write recovery beyond that.
pub fn save_to_path(catalog: &Catalog, path: impl AsRef<Path>) -> PersistResult<()> {
    let path = path.as_ref();
    let bytes = crate::codec::encode(catalog)?;
    fs::write(path, bytes)?;
    info!(path = %path.display(), products = catalog.len(), "catalog saved");
    Ok(())
}

/// Read and decode the catalog stored at `path`.
///
/// Returns a fresh catalog; callers replace their current one only on
/// success, so a failed load never disturbs in-memory state.
pub fn load_from_path(path: impl AsRef<Path>) -> PersistResult<Catalog> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let catalog = crate::codec::decode(&bytes)?;
    info!(path = %path.display(), products = catalog.len(), "catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use stockroom_catalog::Product;

    fn test_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add(
                Product::grocery(
                    "G1",
                    "Milk",
                    Decimal::new(250, 2),
                    4,
                    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                )
                .unwrap(),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");

        let catalog = test_catalog();
        save_to_path(&catalog, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn load_of_missing_file_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }

    #[test]
    fn load_of_corrupt_file_is_a_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, b"not json").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Catalog(CatalogError::InvalidRecord(_))
        ));
    }
}
