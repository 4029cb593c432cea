//! Catalog <-> JSON record-sequence codec.
//!
//! The persisted form is a JSON array of flat objects, one per product,
//! tagged with their variant kind:
//!
//! ```json
//! { "kind": "Grocery", "id": "G1", "name": "Milk",
//!   "unitPrice": 2.5, "quantityInStock": 4, "expiryDate": "2024-06-01" }
//! ```
//!
//! Exactly the documented fields, no header, no version, no checksum.
//! Prices travel as JSON numbers, i.e. through `f64`: values with up to
//! 15 significant digits round-trip exactly, which comfortably covers
//! currency amounts at any realistic scale.
//! Serde's internally-tagged enums cannot combine with
//! `deny_unknown_fields`, so decoding reads the `kind` tag out of a
//! `serde_json::Value` first (distinguishing `UnknownVariant` from
//! `InvalidRecord`) and then deserializes the whole object into the
//! per-kind record struct.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockroom_catalog::{Catalog, Product, ProductDetails, ProductKind};
use stockroom_core::{CatalogError, CatalogResult, ProductId};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ElectronicsRecord {
    kind: ProductKind,
    id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity_in_stock: u32,
    warranty_years: u32,
    brand: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GroceryRecord {
    kind: ProductKind,
    id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity_in_stock: u32,
    expiry_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ClothingRecord {
    kind: ProductKind,
    id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity_in_stock: u32,
    size: String,
    material: String,
}

/// Encode a catalog as a pretty-printed JSON record array, in catalog
/// iteration order. Lossless over every field of every variant.
pub fn encode(catalog: &Catalog) -> CatalogResult<Vec<u8>> {
    let records: Vec<Value> = catalog
        .iter()
        .map(encode_record)
        .collect::<CatalogResult<_>>()?;
    serde_json::to_vec_pretty(&records)
        .map_err(|e| CatalogError::invalid_record(format!("encode failed: {e}")))
}

/// Decode a record array into a fresh catalog.
///
/// All-or-nothing: the first bad record (`InvalidRecord`,
/// `UnknownVariant`, or a `DuplicateId` collision between records) fails
/// the whole decode and no catalog is returned.
pub fn decode(bytes: &[u8]) -> CatalogResult<Catalog> {
    let records: Vec<Value> = serde_json::from_slice(bytes)
        .map_err(|e| CatalogError::invalid_record(format!("not a record array: {e}")))?;
    let mut catalog = Catalog::new();
    for record in &records {
        catalog.add(decode_record(record)?)?;
    }
    Ok(catalog)
}

fn encode_record(product: &Product) -> CatalogResult<Value> {
    let id = product.id().clone();
    let name = product.name().to_owned();
    let unit_price = product.unit_price();
    let quantity_in_stock = product.quantity_in_stock();

    let value = match product.details() {
        ProductDetails::Electronics {
            warranty_years,
            brand,
        } => serde_json::to_value(ElectronicsRecord {
            kind: ProductKind::Electronics,
            id,
            name,
            unit_price,
            quantity_in_stock,
            warranty_years: *warranty_years,
            brand: brand.clone(),
        }),
        ProductDetails::Grocery { expiry_date } => serde_json::to_value(GroceryRecord {
            kind: ProductKind::Grocery,
            id,
            name,
            unit_price,
            quantity_in_stock,
            expiry_date: *expiry_date,
        }),
        ProductDetails::Clothing { size, material } => serde_json::to_value(ClothingRecord {
            kind: ProductKind::Clothing,
            id,
            name,
            unit_price,
            quantity_in_stock,
            size: size.clone(),
            material: material.clone(),
        }),
    };
    value.map_err(|e| CatalogError::invalid_record(format!("encode failed: {e}")))
}

fn decode_record(record: &Value) -> CatalogResult<Product> {
    let tag = record
        .get("kind")
        .ok_or_else(|| CatalogError::invalid_record("record is missing its kind tag"))?;
    let tag = tag
        .as_str()
        .ok_or_else(|| CatalogError::invalid_record("kind tag must be a string"))?;
    let kind: ProductKind = tag.parse()?;

    let product = match kind {
        ProductKind::Electronics => {
            let r: ElectronicsRecord = from_record(record)?;
            Product::electronics(
                r.id,
                r.name,
                r.unit_price,
                r.quantity_in_stock,
                r.warranty_years,
                r.brand,
            )
        }
        ProductKind::Grocery => {
            let r: GroceryRecord = from_record(record)?;
            Product::grocery(r.id, r.name, r.unit_price, r.quantity_in_stock, r.expiry_date)
        }
        ProductKind::Clothing => {
            let r: ClothingRecord = from_record(record)?;
            Product::clothing(
                r.id,
                r.name,
                r.unit_price,
                r.quantity_in_stock,
                r.size,
                r.material,
            )
        }
    };

    // A persisted field that fails domain validation (empty name, negative
    // price) is a malformed record, not a caller mistake.
    product.map_err(|e| match e {
        CatalogError::InvalidArgument(msg) => CatalogError::InvalidRecord(msg),
        other => other,
    })
}

fn from_record<'de, T: Deserialize<'de>>(record: &'de Value) -> CatalogResult<T> {
    T::deserialize(record).map_err(|e| CatalogError::invalid_record(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn price(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn test_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add(Product::electronics("E1", "Laptop", price("999.5"), 5, 2, "Dell").unwrap())
            .unwrap();
        catalog
            .add(Product::grocery("G1", "Milk", price("2.50"), 4, date("2024-06-01")).unwrap())
            .unwrap();
        catalog
            .add(Product::clothing("C1", "Shirt", price("15"), 3, "M", "Cotton").unwrap())
            .unwrap();
        catalog
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let catalog = test_catalog();
        let decoded = decode(&encode(&catalog).unwrap()).unwrap();
        assert_eq!(decoded, catalog);
    }

    #[test]
    fn high_precision_prices_round_trip_within_the_float_bound() {
        // 13 significant digits, well inside the 15-digit bound the
        // JSON-number representation guarantees.
        let mut catalog = Catalog::new();
        catalog
            .add(
                Product::clothing("C1", "Coat", price("1234567.890123"), 2, "L", "Wool").unwrap(),
            )
            .unwrap();
        let decoded = decode(&encode(&catalog).unwrap()).unwrap();
        assert_eq!(decoded, catalog);
        assert_eq!(
            decoded.get(&ProductId::from("C1")).unwrap().unit_price(),
            price("1234567.890123")
        );
    }

    #[test]
    fn empty_catalog_round_trips() {
        let decoded = decode(&encode(&Catalog::new()).unwrap()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn encoded_records_carry_exactly_the_documented_fields() {
        let bytes = encode(&test_catalog()).unwrap();
        let records: Vec<Value> = serde_json::from_slice(&bytes).unwrap();

        let keys = |v: &Value| -> Vec<String> {
            let mut k: Vec<String> = v.as_object().unwrap().keys().cloned().collect();
            k.sort();
            k
        };
        // Sorted by id: C1, E1, G1.
        assert_eq!(
            keys(&records[1]),
            ["brand", "id", "kind", "name", "quantityInStock", "unitPrice", "warrantyYears"]
        );
        assert_eq!(
            keys(&records[2]),
            ["expiryDate", "id", "kind", "name", "quantityInStock", "unitPrice"]
        );
        assert_eq!(
            keys(&records[0]),
            ["id", "kind", "material", "name", "quantityInStock", "size", "unitPrice"]
        );
        assert_eq!(records[2]["expiryDate"], "2024-06-01");
        assert_eq!(records[1]["unitPrice"], 999.5);
    }

    #[test]
    fn unknown_kind_fails_with_unknown_variant() {
        let bytes = br#"[{ "kind": "Furniture", "id": "F1", "name": "Desk",
                           "unitPrice": 10, "quantityInStock": 1 }]"#;
        assert_eq!(
            decode(bytes).unwrap_err(),
            CatalogError::UnknownVariant("Furniture".to_owned())
        );
    }

    #[test]
    fn missing_field_is_an_invalid_record() {
        // Grocery without its expiryDate.
        let bytes = br#"[{ "kind": "Grocery", "id": "G1", "name": "Milk",
                           "unitPrice": 2.5, "quantityInStock": 4 }]"#;
        assert!(matches!(
            decode(bytes).unwrap_err(),
            CatalogError::InvalidRecord(_)
        ));
    }

    #[test]
    fn extra_field_is_an_invalid_record() {
        let bytes = br#"[{ "kind": "Clothing", "id": "C1", "name": "Shirt",
                           "unitPrice": 15, "quantityInStock": 3,
                           "size": "M", "material": "Cotton", "color": "blue" }]"#;
        assert!(matches!(
            decode(bytes).unwrap_err(),
            CatalogError::InvalidRecord(_)
        ));
    }

    #[test]
    fn malformed_date_is_an_invalid_record() {
        let bytes = br#"[{ "kind": "Grocery", "id": "G1", "name": "Milk",
                           "unitPrice": 2.5, "quantityInStock": 4,
                           "expiryDate": "tomorrow" }]"#;
        assert!(matches!(
            decode(bytes).unwrap_err(),
            CatalogError::InvalidRecord(_)
        ));
    }

    #[test]
    fn non_string_kind_is_an_invalid_record() {
        let bytes = br#"[{ "kind": 7, "id": "X", "name": "X",
                           "unitPrice": 1, "quantityInStock": 1 }]"#;
        assert!(matches!(
            decode(bytes).unwrap_err(),
            CatalogError::InvalidRecord(_)
        ));
    }

    #[test]
    fn negative_persisted_price_is_an_invalid_record() {
        let bytes = br#"[{ "kind": "Clothing", "id": "C1", "name": "Shirt",
                           "unitPrice": -15, "quantityInStock": 3,
                           "size": "M", "material": "Cotton" }]"#;
        assert!(matches!(
            decode(bytes).unwrap_err(),
            CatalogError::InvalidRecord(_)
        ));
    }

    #[test]
    fn duplicate_record_ids_abort_the_decode() {
        let bytes = br#"[
            { "kind": "Clothing", "id": "C1", "name": "Shirt",
              "unitPrice": 15, "quantityInStock": 3, "size": "M", "material": "Cotton" },
            { "kind": "Clothing", "id": "C1", "name": "Shirt",
              "unitPrice": 15, "quantityInStock": 3, "size": "L", "material": "Wool" }
        ]"#;
        assert_eq!(
            decode(bytes).unwrap_err(),
            CatalogError::DuplicateId(ProductId::from("C1"))
        );
    }

    #[test]
    fn decode_failure_leaves_the_callers_catalog_untouched() {
        // The replace-on-success discipline: the old catalog is only
        // reassigned when decode returns Ok.
        let mut current = test_catalog();
        let bad = br#"[{ "kind": "Furniture" }]"#;
        if let Ok(fresh) = decode(bad) {
            current = fresh;
        }
        assert_eq!(current, test_catalog());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_product() -> impl Strategy<Value = Product> {
            let base = (
                "[A-Za-z0-9-]{1,12}",
                "[A-Za-z][A-Za-z0-9 ]{0,20}",
                0i64..1_000_000,
                0u32..100_000,
            );
            prop_oneof![
                (base.clone(), 0u32..30, "[A-Za-z]{1,10}").prop_map(
                    |((id, name, cents, qty), years, brand)| {
                        Product::electronics(
                            id,
                            name,
                            Decimal::new(cents, 2),
                            qty,
                            years,
                            brand,
                        )
                        .unwrap()
                    }
                ),
                (base.clone(), 2000i32..2100, 1u32..=12, 1u32..=28).prop_map(
                    |((id, name, cents, qty), y, m, d)| {
                        Product::grocery(
                            id,
                            name,
                            Decimal::new(cents, 2),
                            qty,
                            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
                        )
                        .unwrap()
                    }
                ),
                (base, "[SML]|XL", "[A-Za-z]{1,10}").prop_map(
                    |((id, name, cents, qty), size, material)| {
                        Product::clothing(id, name, Decimal::new(cents, 2), qty, size, material)
                            .unwrap()
                    }
                ),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: decode(encode(catalog)) reproduces the catalog
            /// field-for-field for any mix of variants.
            #[test]
            fn decode_inverts_encode(products in proptest::collection::vec(arb_product(), 0..12)) {
                let mut catalog = Catalog::new();
                for product in products {
                    // Random ids may collide; first writer wins.
                    let _ = catalog.add(product);
                }
                let decoded = decode(&encode(&catalog).unwrap()).unwrap();
                prop_assert_eq!(decoded, catalog);
            }
        }
    }
}
