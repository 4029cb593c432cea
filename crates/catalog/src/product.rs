use core::fmt;
use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{CatalogError, CatalogResult, ProductId};

/// Product kind tag.
///
/// Closed set; doubles as the `kind` tag in persisted records. Adding a
/// variant is a single-point change the compiler chases through every
/// match site.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    Electronics,
    Grocery,
    Clothing,
}

impl ProductKind {
    pub const ALL: [ProductKind; 3] = [
        ProductKind::Electronics,
        ProductKind::Grocery,
        ProductKind::Clothing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Electronics => "Electronics",
            ProductKind::Grocery => "Grocery",
            ProductKind::Clothing => "Clothing",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Electronics" => Ok(ProductKind::Electronics),
            "Grocery" => Ok(ProductKind::Grocery),
            "Clothing" => Ok(ProductKind::Clothing),
            other => Err(CatalogError::unknown_variant(other)),
        }
    }
}

/// Variant-specific payload carried alongside the shared base fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductDetails {
    Electronics { warranty_years: u32, brand: String },
    Grocery { expiry_date: NaiveDate },
    Clothing { size: String, material: String },
}

impl ProductDetails {
    pub fn kind(&self) -> ProductKind {
        match self {
            ProductDetails::Electronics { .. } => ProductKind::Electronics,
            ProductDetails::Grocery { .. } => ProductKind::Grocery,
            ProductDetails::Clothing { .. } => ProductKind::Clothing,
        }
    }
}

/// A catalog product: shared base fields plus a variant payload.
///
/// `quantity_in_stock` is the only field that changes after construction,
/// and only through [`Product::restock`] and [`Product::sell`], which keep
/// it non-negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity_in_stock: u32,
    details: ProductDetails,
}

impl Product {
    /// Create a product, validating the shared base fields.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity_in_stock: u32,
        details: ProductDetails,
    ) -> CatalogResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::invalid_argument("name cannot be empty"));
        }
        if unit_price.is_sign_negative() {
            return Err(CatalogError::invalid_argument(
                "unit price cannot be negative",
            ));
        }
        Ok(Self {
            id: id.into(),
            name,
            unit_price,
            quantity_in_stock,
            details,
        })
    }

    pub fn electronics(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity_in_stock: u32,
        warranty_years: u32,
        brand: impl Into<String>,
    ) -> CatalogResult<Self> {
        Self::new(
            id,
            name,
            unit_price,
            quantity_in_stock,
            ProductDetails::Electronics {
                warranty_years,
                brand: brand.into(),
            },
        )
    }

    pub fn grocery(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity_in_stock: u32,
        expiry_date: NaiveDate,
    ) -> CatalogResult<Self> {
        Self::new(
            id,
            name,
            unit_price,
            quantity_in_stock,
            ProductDetails::Grocery { expiry_date },
        )
    }

    pub fn clothing(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity_in_stock: u32,
        size: impl Into<String>,
        material: impl Into<String>,
    ) -> CatalogResult<Self> {
        Self::new(
            id,
            name,
            unit_price,
            quantity_in_stock,
            ProductDetails::Clothing {
                size: size.into(),
                material: material.into(),
            },
        )
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity_in_stock(&self) -> u32 {
        self.quantity_in_stock
    }

    pub fn details(&self) -> &ProductDetails {
        &self.details
    }

    pub fn kind(&self) -> ProductKind {
        self.details.kind()
    }

    /// Increase stock by `amount`. No upper bound beyond the counter range.
    pub fn restock(&mut self, amount: i64) -> CatalogResult<()> {
        let amount = stock_amount(amount, "restock amount")?;
        self.quantity_in_stock = self
            .quantity_in_stock
            .checked_add(amount)
            .ok_or_else(|| CatalogError::invalid_argument("restock overflows the stock counter"))?;
        Ok(())
    }

    /// Decrease stock by `quantity`, refusing to go below zero.
    pub fn sell(&mut self, quantity: i64) -> CatalogResult<()> {
        let quantity = stock_amount(quantity, "sell quantity")?;
        if quantity > self.quantity_in_stock {
            return Err(CatalogError::InsufficientStock {
                id: self.id.clone(),
                requested: u64::from(quantity),
                available: u64::from(self.quantity_in_stock),
            });
        }
        self.quantity_in_stock -= quantity;
        Ok(())
    }

    /// Value of the stock on hand: `unit_price * quantity_in_stock`.
    pub fn total_value(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity_in_stock)
    }

    /// Whether this product has passed its expiry date.
    ///
    /// Strict comparison: a product expiring today is still sellable.
    /// Always false for non-grocery kinds. The date is an argument, not a
    /// clock read, so expiry behavior is fully deterministic.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match &self.details {
            ProductDetails::Grocery { expiry_date } => today > *expiry_date,
            ProductDetails::Electronics { .. } | ProductDetails::Clothing { .. } => false,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ID={}, Name={}, Price={}, Stock={}",
            self.kind(),
            self.id,
            self.name,
            self.unit_price,
            self.quantity_in_stock
        )?;
        match &self.details {
            ProductDetails::Electronics {
                warranty_years,
                brand,
            } => write!(f, ", Warranty={warranty_years} years, Brand={brand}"),
            ProductDetails::Grocery { expiry_date } => write!(f, ", Expiry={expiry_date}"),
            ProductDetails::Clothing { size, material } => {
                write!(f, ", Size={size}, Material={material}")
            }
        }
    }
}

fn stock_amount(value: i64, what: &str) -> CatalogResult<u32> {
    if value < 0 {
        return Err(CatalogError::invalid_argument(format!(
            "{what} cannot be negative"
        )));
    }
    u32::try_from(value).map_err(|_| {
        CatalogError::invalid_argument(format!("{what} exceeds the stock counter range"))
    })
}
