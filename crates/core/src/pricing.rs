//! Publication pricing arithmetic.
//!
//! A publication costs the package base price plus the selected addons.
//! Users holding an unused free-tier allowance for the current week pay
//! no base price. All amounts are exact decimals; the payment gateway
//! receives integer minor units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::CoreError;

/// Addon selection attached to a publication or payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddonSelection {
    pub photo: bool,
    pub highlight: bool,
    pub auto_bump: bool,
}

impl AddonSelection {
    pub fn any(self) -> bool {
        self.photo || self.highlight || self.auto_bump
    }
}

/// The price columns of a package, detached from persistence.
#[derive(Debug, Clone, Copy)]
pub struct PackagePricing {
    pub price_per_post: Decimal,
    pub photo_addon_price: Decimal,
    pub highlight_addon_price: Decimal,
    pub auto_bump_addon_price: Decimal,
}

/// Base price of a publication: zero when the free-tier allowance applies.
pub fn base_price(can_post_free: bool, pricing: &PackagePricing) -> Decimal {
    if can_post_free {
        Decimal::ZERO
    } else {
        pricing.price_per_post
    }
}

/// Sum of the selected addon prices.
pub fn addons_price(pricing: &PackagePricing, selection: AddonSelection) -> Decimal {
    let mut total = Decimal::ZERO;
    if selection.photo {
        total += pricing.photo_addon_price;
    }
    if selection.highlight {
        total += pricing.highlight_addon_price;
    }
    if selection.auto_bump {
        total += pricing.auto_bump_addon_price;
    }
    total
}

/// Total publication price.
pub fn total_price(
    can_post_free: bool,
    pricing: &PackagePricing,
    selection: AddonSelection,
) -> Decimal {
    base_price(can_post_free, pricing) + addons_price(pricing, selection)
}

/// Convert a decimal amount to gateway minor units (cents/kopecks).
///
/// Fails on amounts that do not fit an i64 after scaling, which cannot
/// happen for prices within the platform's validated ranges.
pub fn to_minor_units(amount: Decimal) -> Result<i64, CoreError> {
    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or_else(|| CoreError::Validation(format!("Amount out of range: {amount}")))
}
