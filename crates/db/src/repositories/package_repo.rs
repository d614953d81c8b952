//! Repository for the `packages` table. Read-mostly reference data.

use gigboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::package::{Package, PACKAGE_TYPE_FREE};

/// Column list for packages queries.
const PACKAGE_COLUMNS: &str = "id, name, description, package_type, price_per_post, \
    currency, photo_addon_price, highlight_addon_price, auto_bump_addon_price, \
    highlight_color, is_active, sort_order, created_at";

pub struct PackageRepo;

impl PackageRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Package>, sqlx::Error> {
        let query = format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = $1");
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active packages in display order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Package>, sqlx::Error> {
        let query = format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages
             WHERE is_active = TRUE
             ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, Package>(&query).fetch_all(pool).await
    }

    /// The active free-tier package, when one is configured.
    pub async fn find_free(pool: &PgPool) -> Result<Option<Package>, sqlx::Error> {
        let query = format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages
             WHERE package_type = $1 AND is_active = TRUE
             ORDER BY sort_order ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(PACKAGE_TYPE_FREE)
            .fetch_optional(pool)
            .await
    }
}
