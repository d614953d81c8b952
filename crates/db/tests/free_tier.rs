//! Integration tests for the weekly free-tier allowance.

use chrono::NaiveDate;
use gigboard_db::models::post::CreatePost;
use gigboard_db::repositories::{FreePostRepo, PostRepo, UserRepo};
use sqlx::PgPool;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
}

async fn seed_user(pool: &PgPool, external_id: i64) -> i64 {
    UserRepo::find_or_create(pool, external_id, None)
        .await
        .expect("user")
        .id
}

async fn seed_draft(pool: &PgPool, user_id: i64) -> i64 {
    let input = CreatePost {
        kind: "job".to_string(),
        title: "free tier".to_string(),
        description: "free tier test".to_string(),
        price: 0,
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

#[sqlx::test(migrations = "./migrations")]
async fn test_allowance_consumed_once_per_week(pool: PgPool) {
    let user_id = seed_user(&pool, 3001).await;
    let post_id = seed_draft(&pool, user_id).await;

    assert!(FreePostRepo::can_post_free(&pool, user_id, monday())
        .await
        .unwrap());

    assert!(FreePostRepo::consume(&pool, user_id, monday(), post_id)
        .await
        .unwrap());
    assert!(!FreePostRepo::can_post_free(&pool, user_id, monday())
        .await
        .unwrap());

    // Second consume in the same week hits the unique constraint.
    assert!(!FreePostRepo::consume(&pool, user_id, monday(), post_id)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_release_restores_the_allowance(pool: PgPool) {
    let user_id = seed_user(&pool, 3002).await;
    let post_id = seed_draft(&pool, user_id).await;

    FreePostRepo::consume(&pool, user_id, monday(), post_id)
        .await
        .unwrap();
    assert!(FreePostRepo::release(&pool, user_id, monday()).await.unwrap());

    assert!(FreePostRepo::can_post_free(&pool, user_id, monday())
        .await
        .unwrap());
    // Nothing left to release.
    assert!(!FreePostRepo::release(&pool, user_id, monday()).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_weeks_are_independent(pool: PgPool) {
    let user_id = seed_user(&pool, 3003).await;
    let post_id = seed_draft(&pool, user_id).await;
    let next_monday = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();

    FreePostRepo::consume(&pool, user_id, monday(), post_id)
        .await
        .unwrap();

    assert!(FreePostRepo::can_post_free(&pool, user_id, next_monday)
        .await
        .unwrap());

    let record = FreePostRepo::find_for_week(&pool, user_id, monday())
        .await
        .unwrap()
        .expect("record for consumed week");
    assert_eq!(record.post_id, Some(post_id));
}
