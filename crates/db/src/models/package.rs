//! Pricing package (tier) rows.

use gigboard_core::pricing::PackagePricing;
use gigboard_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// `packages.package_type` value for the weekly free tier.
pub const PACKAGE_TYPE_FREE: &str = "free";

/// `packages.package_type` value for paid tiers.
pub const PACKAGE_TYPE_PAID: &str = "paid";

/// A row from the `packages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Package {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub package_type: String,
    pub price_per_post: Decimal,
    pub currency: String,
    pub photo_addon_price: Decimal,
    pub highlight_addon_price: Decimal,
    pub auto_bump_addon_price: Decimal,
    pub highlight_color: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

impl Package {
    pub fn is_free(&self) -> bool {
        self.package_type == PACKAGE_TYPE_FREE
    }

    pub fn is_paid(&self) -> bool {
        !self.is_free()
    }

    /// Detach the price columns for the pricing calculator.
    pub fn pricing(&self) -> PackagePricing {
        PackagePricing {
            price_per_post: self.price_per_post,
            photo_addon_price: self.photo_addon_price,
            highlight_addon_price: self.highlight_addon_price,
            auto_bump_addon_price: self.auto_bump_addon_price,
        }
    }
}
