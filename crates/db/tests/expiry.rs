//! Integration tests for the expiry sweep query and the stalled-draft scan.

use chrono::{Duration, Utc};
use gigboard_core::pricing::AddonSelection;
use gigboard_core::status::PostStatus;
use gigboard_db::models::payment::CreatePayment;
use gigboard_db::models::post::CreatePost;
use gigboard_db::repositories::{PackageRepo, PaymentRepo, PostRepo, UserRepo};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, external_id: i64) -> i64 {
    UserRepo::find_or_create(pool, external_id, None)
        .await
        .expect("user")
        .id
}

async fn seed_post(pool: &PgPool, user_id: i64, title: &str, status: PostStatus) -> i64 {
    let input = CreatePost {
        kind: "job".to_string(),
        title: title.to_string(),
        description: "expiry test".to_string(),
        price: 100,
        currency: "UAH".to_string(),
        city_id: 1,
        rubric_id: 1,
        user_id,
        user_phone: None,
        address: None,
        package_id: None,
    };
    let post = PostRepo::create(pool, &input).await.expect("post");
    if status != PostStatus::Draft {
        sqlx::query("UPDATE posts SET status = $2 WHERE id = $1")
            .bind(post.id)
            .bind(status.id())
            .execute(pool)
            .await
            .expect("status seed");
    }
    post.id
}

/// Back-date a post's creation (and age its updated_at the same way).
async fn age_post(pool: &PgPool, post_id: i64, days: i64) {
    sqlx::query(
        "UPDATE posts
         SET created_at = now() - make_interval(days => $2::int),
             updated_at = now() - make_interval(days => $2::int)
         WHERE id = $1",
    )
    .bind(post_id)
    .bind(days as i32)
    .execute(pool)
    .await
    .expect("age post");
}

async fn status_of(pool: &PgPool, post_id: i64) -> PostStatus {
    PostRepo::find_by_id(pool, post_id)
        .await
        .unwrap()
        .unwrap()
        .current_status()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Expiry sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_sweep_archives_only_past_cutoff(pool: PgPool) {
    let user_id = seed_user(&pool, 4001).await;
    let expiry_days = 30;

    let stale = seed_post(&pool, user_id, "stale", PostStatus::Published).await;
    age_post(&pool, stale, expiry_days + 1).await;

    let fresh = seed_post(&pool, user_id, "fresh", PostStatus::Published).await;
    age_post(&pool, fresh, expiry_days - 1).await;

    let cutoff = Utc::now() - Duration::days(expiry_days);
    let archived = PostRepo::archive_expired(&pool, cutoff).await.unwrap();

    assert_eq!(archived, 1);
    assert_eq!(status_of(&pool, stale).await, PostStatus::Archived);
    assert_eq!(status_of(&pool, fresh).await, PostStatus::Published);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_sweep_skips_deleted_and_non_published(pool: PgPool) {
    let user_id = seed_user(&pool, 4002).await;

    let deleted = seed_post(&pool, user_id, "deleted", PostStatus::Published).await;
    age_post(&pool, deleted, 60).await;
    PostRepo::soft_delete(&pool, deleted).await.unwrap();

    let draft = seed_post(&pool, user_id, "old draft", PostStatus::Draft).await;
    age_post(&pool, draft, 60).await;

    let cutoff = Utc::now() - Duration::days(30);
    let archived = PostRepo::archive_expired(&pool, cutoff).await.unwrap();
    assert_eq!(archived, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_sweep_is_idempotent(pool: PgPool) {
    let user_id = seed_user(&pool, 4003).await;
    let post = seed_post(&pool, user_id, "idempotent", PostStatus::Published).await;
    age_post(&pool, post, 45).await;

    let cutoff = Utc::now() - Duration::days(30);
    assert_eq!(PostRepo::archive_expired(&pool, cutoff).await.unwrap(), 1);
    // Second run: the row is Archived and falls out of the filter.
    assert_eq!(PostRepo::archive_expired(&pool, cutoff).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Stalled-draft scan
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_stalled_scan_finds_unpaid_free_drafts(pool: PgPool) {
    let user_id = seed_user(&pool, 4004).await;
    let stalled = seed_post(&pool, user_id, "stalled", PostStatus::Draft).await;
    age_post(&pool, stalled, 1).await;

    let recent = seed_post(&pool, user_id, "recent", PostStatus::Draft).await;

    let grace = Utc::now() - Duration::minutes(10);
    let found = PostRepo::stalled_drafts(&pool, grace).await.unwrap();

    assert!(found.contains(&stalled));
    assert!(!found.contains(&recent));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stalled_scan_skips_drafts_awaiting_payment(pool: PgPool) {
    let user_id = seed_user(&pool, 4005).await;
    let package = PackageRepo::list_active(&pool)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.is_paid())
        .unwrap();

    let awaiting = seed_post(&pool, user_id, "awaiting payment", PostStatus::Draft).await;
    age_post(&pool, awaiting, 1).await;
    let payment = PaymentRepo::create(
        &pool,
        &CreatePayment {
            user_id,
            package_id: package.id,
            post_id: Some(awaiting),
            amount: Decimal::new(5000, 2),
            order_id: "4005_1_aaaaaa".to_string(),
            addons: AddonSelection::default(),
        },
    )
    .await
    .unwrap();

    let grace = Utc::now() - Duration::minutes(10);
    assert!(!PostRepo::stalled_drafts(&pool, grace)
        .await
        .unwrap()
        .contains(&awaiting));

    // A paid-but-unreleased draft is owed an evaluation.
    PaymentRepo::mark_paid(&pool, payment.id, None, None)
        .await
        .unwrap();
    assert!(PostRepo::stalled_drafts(&pool, grace)
        .await
        .unwrap()
        .contains(&awaiting));

    // A draft whose payment failed was never released; leave it alone.
    let failed_draft = seed_post(&pool, user_id, "failed payment", PostStatus::Draft).await;
    age_post(&pool, failed_draft, 1).await;
    let failed_payment = PaymentRepo::create(
        &pool,
        &CreatePayment {
            user_id,
            package_id: package.id,
            post_id: Some(failed_draft),
            amount: Decimal::new(5000, 2),
            order_id: "4005_2_aaaaaa".to_string(),
            addons: AddonSelection::default(),
        },
    )
    .await
    .unwrap();
    PaymentRepo::mark_failed(&pool, failed_payment.id).await.unwrap();

    assert!(!PostRepo::stalled_drafts(&pool, grace)
        .await
        .unwrap()
        .contains(&failed_draft));
}
