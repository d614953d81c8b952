//! Payment ledger rows and DTOs.

use gigboard_core::pricing::AddonSelection;
use gigboard_core::status::PaymentStatus;
use gigboard_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub user_id: DbId,
    pub package_id: DbId,
    pub post_id: Option<DbId>,
    pub amount: Decimal,
    pub order_id: String,
    pub status: String,
    pub with_photo_addon: bool,
    pub with_highlight_addon: bool,
    pub with_auto_bump_addon: bool,
    pub telegram_charge_id: Option<String>,
    pub provider_charge_id: Option<String>,
    pub refund_reason: Option<String>,
    pub created_at: Timestamp,
    pub paid_at: Option<Timestamp>,
}

impl Payment {
    /// Decode the raw status column.
    pub fn current_status(&self) -> Option<PaymentStatus> {
        PaymentStatus::parse(&self.status)
    }

    pub fn addons(&self) -> AddonSelection {
        AddonSelection {
            photo: self.with_photo_addon,
            highlight: self.with_highlight_addon,
            auto_bump: self.with_auto_bump_addon,
        }
    }
}

/// DTO for inserting a new pending payment.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub user_id: DbId,
    pub package_id: DbId,
    pub post_id: Option<DbId>,
    pub amount: Decimal,
    pub order_id: String,
    pub addons: AddonSelection,
}
