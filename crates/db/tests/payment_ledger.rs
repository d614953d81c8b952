//! Integration tests for the payment ledger: monotonic status writes,
//! duplicate-delivery idempotence, and the one-pending-payment-per-draft
//! constraint.

use gigboard_core::pricing::AddonSelection;
use gigboard_db::models::payment::CreatePayment;
use gigboard_db::models::post::CreatePost;
use gigboard_db::repositories::{PackageRepo, PaymentRepo, PostRepo, UserRepo};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, external_id: i64) -> i64 {
    UserRepo::find_or_create(pool, external_id, Some("ledger"))
        .await
        .expect("user")
        .id
}

async fn paid_package_id(pool: &PgPool) -> i64 {
    PackageRepo::list_active(pool)
        .await
        .expect("packages")
        .into_iter()
        .find(|p| p.is_paid())
        .expect("seeded paid package")
        .id
}

async fn seed_draft(pool: &PgPool, user_id: i64, title: &str) -> i64 {
    let input = CreatePost {
        kind: "service".to_string(),
        title: title.to_string(),
        description: "ledger test".to_string(),
        price: 500,
        currency: "UAH".to_string(),
        city_id: 1,
        rubric_id: 1,
        user_id,
        user_phone: None,
        address: None,
        package_id: None,
    };
    PostRepo::create(pool, &input).await.expect("post").id
}

fn new_payment(user_id: i64, package_id: i64, post_id: Option<i64>, order_id: &str) -> CreatePayment {
    CreatePayment {
        user_id,
        package_id,
        post_id,
        amount: Decimal::new(5000, 2),
        order_id: order_id.to_string(),
        addons: AddonSelection::default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_mark_paid_is_idempotent(pool: PgPool) {
    let user_id = seed_user(&pool, 2001).await;
    let package_id = paid_package_id(&pool).await;
    let payment = PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2001_1_aaaaaa"))
        .await
        .unwrap();
    assert_eq!(payment.status, "pending");
    assert!(payment.paid_at.is_none());

    assert!(
        PaymentRepo::mark_paid(&pool, payment.id, Some("tg_1"), Some("prov_1"))
            .await
            .unwrap()
    );
    let first = PaymentRepo::find_by_id(&pool, payment.id)
        .await
        .unwrap()
        .unwrap();
    let first_paid_at = first.paid_at.expect("paid_at set");

    // Duplicate gateway delivery: no-op, charge ids and paid_at untouched.
    assert!(
        !PaymentRepo::mark_paid(&pool, payment.id, Some("tg_2"), Some("prov_2"))
            .await
            .unwrap()
    );
    let second = PaymentRepo::find_by_id(&pool, payment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.paid_at, Some(first_paid_at));
    assert_eq!(second.telegram_charge_id.as_deref(), Some("tg_1"));
    assert_eq!(second.status, "paid");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refund_requires_paid(pool: PgPool) {
    let user_id = seed_user(&pool, 2002).await;
    let package_id = paid_package_id(&pool).await;
    let payment = PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2002_1_aaaaaa"))
        .await
        .unwrap();

    // Pending payments cannot be refunded.
    assert!(!PaymentRepo::refund(&pool, payment.id, "too early")
        .await
        .unwrap());

    PaymentRepo::mark_paid(&pool, payment.id, None, None)
        .await
        .unwrap();
    assert!(PaymentRepo::refund(&pool, payment.id, "failed moderation")
        .await
        .unwrap());

    let refunded = PaymentRepo::find_by_id(&pool, payment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refunded.status, "refunded");
    assert_eq!(refunded.refund_reason.as_deref(), Some("failed moderation"));

    // Refunding twice is a no-op.
    assert!(!PaymentRepo::refund(&pool, payment.id, "again").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_and_cancelled_only_from_pending(pool: PgPool) {
    let user_id = seed_user(&pool, 2003).await;
    let package_id = paid_package_id(&pool).await;

    let failing = PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2003_1_aaaaaa"))
        .await
        .unwrap();
    assert!(PaymentRepo::mark_failed(&pool, failing.id).await.unwrap());
    // A failed payment never becomes paid.
    assert!(!PaymentRepo::mark_paid(&pool, failing.id, None, None)
        .await
        .unwrap());

    let cancelling =
        PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2003_2_aaaaaa"))
            .await
            .unwrap();
    assert!(PaymentRepo::mark_cancelled(&pool, cancelling.id).await.unwrap());
    assert!(!PaymentRepo::mark_cancelled(&pool, cancelling.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_order_id_is_unique(pool: PgPool) {
    let user_id = seed_user(&pool, 2004).await;
    let package_id = paid_package_id(&pool).await;

    PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2004_1_aaaaaa"))
        .await
        .unwrap();
    let duplicate =
        PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2004_1_aaaaaa")).await;
    assert!(duplicate.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_one_pending_payment_per_draft(pool: PgPool) {
    let user_id = seed_user(&pool, 2005).await;
    let package_id = paid_package_id(&pool).await;
    let post_id = seed_draft(&pool, user_id, "single pending").await;

    let first = PaymentRepo::create(
        &pool,
        &new_payment(user_id, package_id, Some(post_id), "2005_1_aaaaaa"),
    )
    .await
    .unwrap();

    // A second unresolved payment for the same draft violates the
    // partial unique index.
    let second = PaymentRepo::create(
        &pool,
        &new_payment(user_id, package_id, Some(post_id), "2005_2_aaaaaa"),
    )
    .await;
    assert!(second.is_err());

    let pending = PaymentRepo::find_pending_for_post(&pool, post_id)
        .await
        .unwrap()
        .expect("one pending payment");
    assert_eq!(pending.id, first.id);

    // Once the first resolves, a new payment may reference the draft.
    PaymentRepo::mark_cancelled(&pool, first.id).await.unwrap();
    let third = PaymentRepo::create(
        &pool,
        &new_payment(user_id, package_id, Some(post_id), "2005_3_aaaaaa"),
    )
    .await;
    assert!(third.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_latest_paid_for_user_package(pool: PgPool) {
    let user_id = seed_user(&pool, 2006).await;
    let package_id = paid_package_id(&pool).await;

    let older = PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2006_1_aaaaaa"))
        .await
        .unwrap();
    PaymentRepo::mark_paid(&pool, older.id, None, None).await.unwrap();

    let newer = PaymentRepo::create(&pool, &new_payment(user_id, package_id, None, "2006_2_aaaaaa"))
        .await
        .unwrap();
    PaymentRepo::mark_paid(&pool, newer.id, None, None).await.unwrap();
    // Push the newer payment clearly past the older one.
    sqlx::query("UPDATE payments SET created_at = created_at + interval '1 hour' WHERE id = $1")
        .bind(newer.id)
        .execute(&pool)
        .await
        .unwrap();

    let found = PaymentRepo::latest_paid_for_user_package(&pool, user_id, package_id)
        .await
        .unwrap()
        .expect("a paid payment exists");
    assert_eq!(found.id, newer.id);
}
