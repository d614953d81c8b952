//! Repository for the `payments` table.
//!
//! All resolving writes are status-guarded UPDATEs, which is what makes
//! duplicate gateway deliveries no-ops: the second delivery matches zero
//! rows and reports `false` instead of double-processing.

use gigboard_core::types::{DbId, ExternalId};
use sqlx::PgPool;

use crate::models::payment::{CreatePayment, Payment};

/// Column list for payments queries.
const PAYMENT_COLUMNS: &str = "id, user_id, package_id, post_id, amount, order_id, \
    status, with_photo_addon, with_highlight_addon, with_auto_bump_addon, \
    telegram_charge_id, provider_charge_id, refund_reason, created_at, paid_at";

pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a new pending payment.
    pub async fn create(pool: &PgPool, input: &CreatePayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments
                (user_id, package_id, post_id, amount, order_id,
                 with_photo_addon, with_highlight_addon, with_auto_bump_addon)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(input.user_id)
            .bind(input.package_id)
            .bind(input.post_id)
            .bind(input.amount)
            .bind(&input.order_id)
            .bind(input.addons.photo)
            .bind(input.addons.highlight)
            .bind(input.addons.auto_bump)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a payment by id, scoped to the chat user the gateway callback
    /// claims it belongs to.
    pub async fn find_for_external_user(
        pool: &PgPool,
        id: DbId,
        user_external_id: ExternalId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE id = $1
               AND user_id = (SELECT id FROM users WHERE external_id = $2)"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(user_external_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve `pending -> paid`, recording the gateway charge ids and
    /// stamping `paid_at` exactly once. Returns `false` when the payment
    /// was already resolved (duplicate delivery).
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        telegram_charge_id: Option<&str>,
        provider_charge_id: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE payments
             SET status = 'paid',
                 telegram_charge_id = $2,
                 provider_charge_id = $3,
                 paid_at = now()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(telegram_charge_id)
        .bind(provider_charge_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Resolve `pending -> failed`.
    pub async fn mark_failed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE payments SET status = 'failed' WHERE id = $1 AND status = 'pending'")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Resolve `pending -> cancelled`.
    pub async fn mark_cancelled(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'cancelled' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Record a refund against a `paid` payment. The external refund API
    /// integration is out of scope; this is the ledger state only.
    pub async fn refund(pool: &PgPool, id: DbId, reason: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE payments
             SET status = 'refunded', refund_reason = $2
             WHERE id = $1 AND status = 'paid'",
        )
        .bind(id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// The unresolved payment linked to a draft post, when one exists.
    /// The partial unique index guarantees at most one.
    pub async fn find_pending_for_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE post_id = $1 AND status = 'pending'"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent `paid` payment a user made for a package.
    /// Used by the moderation-rejection compensation path.
    pub async fn latest_paid_for_user_package(
        pool: &PgPool,
        user_id: DbId,
        package_id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE user_id = $1 AND package_id = $2 AND status = 'paid'
             ORDER BY created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(user_id)
            .bind(package_id)
            .fetch_optional(pool)
            .await
    }
}
