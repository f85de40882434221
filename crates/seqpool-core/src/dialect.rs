//! SQL dialect descriptors.
//!
//! A [`DatabaseType`] identifies one database product and the features it
//! offers. Descriptors are process-wide constants; sources hand out
//! `&'static` references to them.

use serde::{Deserialize, Serialize};

/// Database product a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Sqlite,
}

/// Dialect metadata for a database product.
#[derive(Debug, PartialEq, Eq)]
pub struct DatabaseType {
    /// The product this descriptor describes
    pub product: Product,
    /// Human-readable name
    pub name: &'static str,
    /// Whether the product has a native bulk loading facility
    pub supports_bulk_load: bool,
}

static SQLITE: DatabaseType = DatabaseType {
    product: Product::Sqlite,
    name: "SQLite",
    supports_bulk_load: false,
};

impl DatabaseType {
    /// The SQLite descriptor.
    pub fn sqlite() -> &'static DatabaseType {
        &SQLITE
    }

    /// Look up the descriptor for a product.
    pub fn for_product(product: Product) -> &'static DatabaseType {
        match product {
            Product::Sqlite => &SQLITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_descriptor_is_shared() {
        let a = DatabaseType::sqlite();
        let b = DatabaseType::for_product(Product::Sqlite);
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.name, "SQLite");
        assert!(!a.supports_bulk_load);
    }
}
