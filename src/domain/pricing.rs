//! Checkout pricing for a vendor-scoped cart.
//!
//! All arithmetic is done in [`Decimal`] and every published figure is
//! rounded half away from zero to two decimal places.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::entities::{CartLine, Vendor};

/// One priced line of a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLine {
    pub price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i32,
}

impl From<&CartLine> for PriceLine {
    fn from(line: &CartLine) -> Self {
        Self {
            price: line.price,
            selling_price: line.selling_price,
            quantity: line.quantity,
        }
    }
}

/// Charges applied on top of the item total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charges {
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    /// Item total at or above which delivery is free.
    pub free_delivery_above: Option<Decimal>,
    pub convenience_fee: Decimal,
}

impl Charges {
    /// Charges of `vendor` plus the platform convenience fee.
    pub fn for_vendor(vendor: &Vendor, convenience_fee: Decimal) -> Self {
        Self {
            packaging_charge: vendor.packaging_charge,
            delivery_charge: vendor.delivery_charge,
            free_delivery_above: vendor.free_delivery_above,
            convenience_fee,
        }
    }
}

/// Result of pricing a cart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceBreakdown {
    /// Sum of list prices.
    pub subtotal: Decimal,
    /// Sum of `price - selling_price` over all units.
    pub discount: Decimal,
    /// `subtotal - discount`.
    pub item_total: Decimal,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub convenience_fee: Decimal,
    pub payable: Decimal,
}

impl PriceBreakdown {
    /// Returns true if the item total reaches the vendor's minimum order.
    pub fn meets_minimum(&self, min_order_amount: Decimal) -> bool {
        self.item_total >= min_order_amount
    }

    /// Payable amount in minor currency units (paise, cents).
    pub fn payable_minor_units(&self) -> Option<i64> {
        (self.payable * Decimal::ONE_HUNDRED).trunc().to_i64()
    }
}

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Prices a cart. An empty cart prices to all zeros.
pub fn compute(lines: &[PriceLine], charges: &Charges) -> PriceBreakdown {
    if lines.is_empty() {
        return PriceBreakdown::default();
    }

    let (subtotal, discount) =
        lines
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(subtotal, discount), line| {
                let quantity = Decimal::from(line.quantity);
                (
                    subtotal + line.price * quantity,
                    discount + (line.price - line.selling_price) * quantity,
                )
            });

    let subtotal = money(subtotal);
    let discount = money(discount);
    let item_total = subtotal - discount;

    let delivery_charge = match charges.free_delivery_above {
        Some(threshold) if item_total >= threshold => Decimal::ZERO,
        _ => money(charges.delivery_charge),
    };
    let packaging_charge = money(charges.packaging_charge);
    let convenience_fee = money(charges.convenience_fee);

    PriceBreakdown {
        subtotal,
        discount,
        item_total,
        packaging_charge,
        delivery_charge,
        convenience_fee,
        payable: item_total + packaging_charge + delivery_charge + convenience_fee,
    }
}
