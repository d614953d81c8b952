//! Post submission and owner actions.
//!
//! Submission creates a Draft and either enqueues moderation directly
//! (free tier, consuming the weekly allowance) or leaves the draft
//! linked to a pending payment; in that case the Publication Service
//! releases it when the gateway confirms. Owner edits always reset to
//! Draft and re-enter the pipeline.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gigboard_core::error::CoreError;
use gigboard_core::free_week::week_start_of;
use gigboard_core::order::generate_order_id;
use gigboard_core::post_rules::{self, validate_submission};
use gigboard_core::pricing::{self, AddonSelection};
use gigboard_core::status::PostStatus;
use gigboard_core::types::{DbId, ExternalId};
use gigboard_db::models::payment::CreatePayment;
use gigboard_db::models::post::{CreatePost, Post, UpdatePost};
use gigboard_db::models::user::User;
use gigboard_db::repositories::{FreePostRepo, PackageRepo, PaymentRepo, PostRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::payments::{build_invoice, InvoiceRequest};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitPostRequest {
    pub user_external_id: ExternalId,
    pub username: Option<String>,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub currency: String,
    pub city_id: DbId,
    pub rubric_id: DbId,
    pub user_phone: Option<String>,
    pub address: Option<String>,
    /// Chosen tier; the active free package when omitted.
    pub package_id: Option<DbId>,
    #[serde(default)]
    pub with_photo_addon: bool,
    #[serde(default)]
    pub with_highlight_addon: bool,
    #[serde(default)]
    pub with_auto_bump_addon: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub post: Post,
    /// Present when the chosen tier requires payment before publication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InvoiceRequest>,
}

/// POST /api/v1/posts
pub async fn submit_post(
    State(state): State<AppState>,
    Json(input): Json<SubmitPostRequest>,
) -> AppResult<impl IntoResponse> {
    validate_submission(&input.kind, &input.title, &input.description, input.price)?;

    let user = UserRepo::find_or_create(
        &state.pool,
        input.user_external_id,
        input.username.as_deref(),
    )
    .await?;

    let package = match input.package_id {
        Some(id) => PackageRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Package",
                id,
            })?,
        None => PackageRepo::find_free(&state.pool).await?.ok_or_else(|| {
            CoreError::Validation("No free package is configured".to_string())
        })?,
    };

    let addons = AddonSelection {
        photo: input.with_photo_addon,
        highlight: input.with_highlight_addon,
        auto_bump: input.with_auto_bump_addon,
    };

    let create = CreatePost {
        kind: input.kind,
        title: input.title,
        description: input.description,
        price: input.price,
        currency: input.currency,
        city_id: input.city_id,
        rubric_id: input.rubric_id,
        user_id: user.id,
        user_phone: input.user_phone,
        address: input.address,
        package_id: Some(package.id),
    };

    if package.is_free() {
        if addons.any() {
            return Err(CoreError::Validation(
                "Addons require a paid package".to_string(),
            )
            .into());
        }
        return submit_free(&state, &user, create, package.id).await;
    }

    let amount = pricing::total_price(false, &package.pricing(), addons);
    if amount.is_zero() {
        // A zero-priced paid tier needs no ledger entry; straight into
        // the pipeline.
        let post = PostRepo::create(&state.pool, &create).await?;
        state.moderation.enqueue(post.id).await;
        tracing::info!(post_id = post.id, user_id = user.id, "Zero-cost post submitted");
        return Ok((
            StatusCode::CREATED,
            Json(DataResponse {
                data: SubmissionResponse {
                    post,
                    payment_id: None,
                    invoice: None,
                },
            }),
        ));
    }

    // Paid path: the draft stays out of the pipeline until the gateway
    // confirms; the payment row links back to it.
    let post = PostRepo::create(&state.pool, &create).await?;
    let payment = PaymentRepo::create(
        &state.pool,
        &CreatePayment {
            user_id: user.id,
            package_id: package.id,
            post_id: Some(post.id),
            amount,
            order_id: generate_order_id(user.id),
            addons,
        },
    )
    .await?;

    tracing::info!(
        post_id = post.id,
        payment_id = payment.id,
        order_id = %payment.order_id,
        "Draft created, awaiting payment"
    );

    let invoice = build_invoice(&payment, &package, user.external_id)?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionResponse {
                post,
                payment_id: Some(payment.id),
                invoice: Some(invoice),
            },
        }),
    ))
}

async fn submit_free(
    state: &AppState,
    user: &User,
    create: CreatePost,
    package_id: DbId,
) -> AppResult<(StatusCode, Json<DataResponse<SubmissionResponse>>)> {
    let week = week_start_of(Utc::now());
    if !FreePostRepo::can_post_free(&state.pool, user.id, week).await? {
        return Err(CoreError::Conflict(
            "Free publication already used this week".to_string(),
        )
        .into());
    }

    let post = PostRepo::create(&state.pool, &create).await?;

    // A concurrent submission may have raced us to the allowance.
    let consumed = FreePostRepo::consume(&state.pool, user.id, week, post.id).await?;
    if !consumed {
        PostRepo::soft_delete(&state.pool, post.id).await?;
        return Err(CoreError::Conflict(
            "Free publication already used this week".to_string(),
        )
        .into());
    }

    state.moderation.enqueue(post.id).await;
    tracing::info!(
        post_id = post.id,
        user_id = user.id,
        package_id,
        "Free post submitted into moderation"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionResponse {
                post,
                payment_id: None,
                invoice: None,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Owner actions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OwnerAction {
    pub user_external_id: ExternalId,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub user_external_id: ExternalId,
    #[serde(flatten)]
    pub fields: UpdatePost,
}

/// POST /api/v1/posts/{id}/archive
pub async fn archive_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(action): Json<OwnerAction>,
) -> AppResult<impl IntoResponse> {
    let post = require_owned_post(&state, post_id, action.user_external_id).await?;
    let post = PostRepo::transition(
        &state.pool,
        post.id,
        PostStatus::Published,
        PostStatus::Archived,
    )
    .await?;

    tracing::info!(post_id, "Post archived by owner");
    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/posts/{id}/resubmit
///
/// Archived -> Draft; the post re-enters the moderation pipeline.
pub async fn resubmit_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(action): Json<OwnerAction>,
) -> AppResult<impl IntoResponse> {
    let post = require_owned_post(&state, post_id, action.user_external_id).await?;
    let post = PostRepo::transition(
        &state.pool,
        post.id,
        PostStatus::Archived,
        PostStatus::Draft,
    )
    .await?;

    state.moderation.enqueue(post.id).await;
    tracing::info!(post_id, "Post resubmitted into moderation");
    Ok(Json(DataResponse { data: post }))
}

/// PUT /api/v1/posts/{id}
///
/// Owner edit: applies the changed fields and resets the post to Draft
/// for re-moderation. Published posts must be archived first.
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(input): Json<UpdatePostRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(title) = &input.fields.title {
        if title.trim().is_empty() || title.chars().count() > post_rules::MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "Title must be 1..={} characters",
                post_rules::MAX_TITLE_LEN
            ))
            .into());
        }
    }
    if let Some(price) = input.fields.price {
        if !(0..=post_rules::MAX_PRICE).contains(&price) {
            return Err(CoreError::Validation(format!(
                "Price must be between 0 and {}",
                post_rules::MAX_PRICE
            ))
            .into());
        }
    }

    let post = require_owned_post(&state, post_id, input.user_external_id).await?;

    let updated = PostRepo::update_content_to_draft(
        &state.pool,
        post.id,
        &input.fields,
        &[PostStatus::Rejected, PostStatus::Archived, PostStatus::Draft],
    )
    .await?;

    let Some(updated) = updated else {
        return Err(CoreError::Validation(
            "Published posts must be archived before editing".to_string(),
        )
        .into());
    };

    // A draft still waiting on its payment keeps waiting; the edit only
    // changes content. Everything else re-enters the pipeline now.
    let awaiting_payment = PaymentRepo::find_pending_for_post(&state.pool, updated.id)
        .await?
        .is_some();
    if awaiting_payment {
        tracing::info!(post_id, "Post edited, still awaiting payment");
    } else {
        state.moderation.enqueue(updated.id).await;
        tracing::info!(post_id, "Post edited, re-entering moderation");
    }
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(action): Json<OwnerAction>,
) -> AppResult<impl IntoResponse> {
    let post = require_owned_post(&state, post_id, action.user_external_id).await?;
    PostRepo::soft_delete(&state.pool, post.id).await?;

    // An unresolved payment for a deleted draft can never complete.
    if let Some(payment) = PaymentRepo::find_pending_for_post(&state.pool, post.id).await? {
        PaymentRepo::mark_cancelled(&state.pool, payment.id).await?;
        tracing::info!(
            post_id,
            payment_id = payment.id,
            "Pending payment cancelled with deleted draft"
        );
    }

    tracing::info!(post_id, "Post soft-deleted by owner");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let posts = PostRepo::list_published(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let post = PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        })?;
    Ok(Json(DataResponse { data: post }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a post and verify the acting user owns it. Non-owners get the
/// same NotFound as a missing post.
async fn require_owned_post(
    state: &AppState,
    post_id: DbId,
    user_external_id: ExternalId,
) -> Result<Post, AppError> {
    let post = PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        })?;

    let user = UserRepo::find_by_external_id(&state.pool, user_external_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        })?;

    if post.user_id != user.id {
        return Err(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }
        .into());
    }
    Ok(post)
}
