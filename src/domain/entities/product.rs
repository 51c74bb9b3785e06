//! Product entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// An item listed by a vendor.
///
/// `price` is the list price (MRP); `selling_price` is what the customer
/// pays and never exceeds `price`.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    pub selling_price: Decimal,
    pub in_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns true if the product can currently be ordered.
    pub fn is_orderable(&self) -> bool {
        self.is_active && self.in_stock
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub vendor_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    pub selling_price: Decimal,
    pub in_stock: bool,
}

/// Partial update for a product.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(is_active: bool, in_stock: bool) -> Product {
        Product {
            id: 1,
            vendor_id: 1,
            name: "Paneer Tikka".to_string(),
            description: None,
            image: None,
            price: Decimal::new(25000, 2),
            selling_price: Decimal::new(22000, 2),
            in_stock,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_orderable_requires_active_and_stock() {
        assert!(product(true, true).is_orderable());
        assert!(!product(false, true).is_orderable());
        assert!(!product(true, false).is_orderable());
    }
}
