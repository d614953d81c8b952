//! Payment creation and the payment-gateway webhook.
//!
//! The webhook consumes two gateway event shapes: a pre-checkout
//! validation request (the amount must match the expected payment
//! amount) and a successful-payment confirmation carrying the invoice
//! payload plus charge identifiers. Confirmations are delivered
//! at-least-once; the whole path is idempotent via status-guarded
//! ledger writes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gigboard_core::error::CoreError;
use gigboard_core::order::{encode_payload, generate_order_id, parse_payload};
use gigboard_core::pricing::{self, AddonSelection};
use gigboard_core::status::PostStatus;
use gigboard_core::types::{DbId, ExternalId};
use gigboard_db::models::package::Package;
use gigboard_db::models::payment::{CreatePayment, Payment};
use gigboard_db::repositories::{PackageRepo, PaymentRepo, PostRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::publication;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Invoice DTO
// ---------------------------------------------------------------------------

/// The invoice request handed to the chat payment gateway.
#[derive(Debug, Serialize)]
pub struct InvoiceRequest {
    pub title: String,
    pub description: String,
    /// Correlates the gateway callback to the ledger row.
    pub payload: String,
    pub currency: String,
    pub amount_minor_units: i64,
    pub with_photo_addon: bool,
    pub with_highlight_addon: bool,
    pub with_auto_bump_addon: bool,
}

/// Build the invoice for a pending payment.
pub fn build_invoice(
    payment: &Payment,
    package: &Package,
    user_external_id: ExternalId,
) -> Result<InvoiceRequest, CoreError> {
    Ok(InvoiceRequest {
        title: format!("Tier: {}", package.name),
        description: package.description.clone(),
        payload: encode_payload(user_external_id, payment.id),
        currency: package.currency.clone(),
        amount_minor_units: pricing::to_minor_units(payment.amount)?,
        with_photo_addon: payment.with_photo_addon,
        with_highlight_addon: payment.with_highlight_addon,
        with_auto_bump_addon: payment.with_auto_bump_addon,
    })
}

// ---------------------------------------------------------------------------
// Payment creation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub user_external_id: ExternalId,
    pub package_id: DbId,
    pub post_id: Option<DbId>,
    #[serde(default)]
    pub with_photo_addon: bool,
    #[serde(default)]
    pub with_highlight_addon: bool,
    #[serde(default)]
    pub with_auto_bump_addon: bool,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub invoice: InvoiceRequest,
}

/// POST /api/v1/payments
///
/// Create a pending ledger row for a paid tier and return the invoice
/// the bot front end forwards to the gateway.
pub async fn create_payment(
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_external_id(&state.pool, input.user_external_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: input.user_external_id,
        })?;

    let package = PackageRepo::find_by_id(&state.pool, input.package_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Package",
            id: input.package_id,
        })?;
    if package.is_free() {
        return Err(CoreError::InvalidPackage(
            "Cannot create a payment for the free tier".to_string(),
        )
        .into());
    }

    if let Some(post_id) = input.post_id {
        let post = PostRepo::find_by_id(&state.pool, post_id)
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
        if post.current_status() != Some(PostStatus::Draft) {
            return Err(CoreError::Validation(format!(
                "Post {post_id} is not awaiting payment"
            ))
            .into());
        }
    }

    let addons = AddonSelection {
        photo: input.with_photo_addon,
        highlight: input.with_highlight_addon,
        auto_bump: input.with_auto_bump_addon,
    };
    let amount = pricing::total_price(false, &package.pricing(), addons);

    let create = CreatePayment {
        user_id: user.id,
        package_id: package.id,
        post_id: input.post_id,
        amount,
        order_id: generate_order_id(user.id),
        addons,
    };
    let payment = PaymentRepo::create(&state.pool, &create).await?;

    tracing::info!(
        payment_id = payment.id,
        order_id = %payment.order_id,
        user_id = user.id,
        package_id = package.id,
        "Payment created"
    );

    let invoice = build_invoice(&payment, &package, user.external_id)?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PaymentResponse { payment, invoice },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Gateway webhook
// ---------------------------------------------------------------------------

/// Subset of a gateway update the core consumes.
#[derive(Debug, Deserialize)]
pub struct GatewayUpdate {
    pub message: Option<GatewayMessage>,
    pub pre_checkout_query: Option<PreCheckoutQuery>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayMessage {
    pub successful_payment: Option<SuccessfulPayment>,
}

#[derive(Debug, Deserialize)]
pub struct SuccessfulPayment {
    pub invoice_payload: String,
    pub telegram_payment_charge_id: Option<String>,
    pub provider_payment_charge_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub invoice_payload: String,
    pub total_amount: i64,
    pub currency: String,
}

/// POST /api/v1/payments/telegram/webhook
pub async fn telegram_webhook(
    State(state): State<AppState>,
    Json(update): Json<GatewayUpdate>,
) -> AppResult<impl IntoResponse> {
    if let Some(query) = update.pre_checkout_query {
        return handle_pre_checkout(&state, query).await;
    }
    if let Some(confirmation) = update.message.and_then(|m| m.successful_payment) {
        return handle_successful_payment(&state, confirmation).await;
    }

    tracing::debug!("Ignoring unrecognized gateway update");
    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}

/// Validate a pre-checkout request: the payment must exist, still be
/// pending, and carry exactly the amount the gateway is about to charge.
async fn handle_pre_checkout(
    state: &AppState,
    query: PreCheckoutQuery,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let (user_external_id, payment_id) = match parse_payload(&query.invoice_payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(error = %e, query_id = %query.id, "Malformed pre-checkout payload");
            return Ok(reject_pre_checkout("Unknown payment"));
        }
    };

    let Some(payment) =
        PaymentRepo::find_for_external_user(&state.pool, payment_id, user_external_id).await?
    else {
        tracing::error!(payment_id, user_external_id, "Pre-checkout for unknown payment");
        return Ok(reject_pre_checkout("Unknown payment"));
    };

    if payment.status != "pending" {
        tracing::warn!(payment_id, status = %payment.status, "Pre-checkout for resolved payment");
        return Ok(reject_pre_checkout("Payment already processed"));
    }

    let expected = pricing::to_minor_units(payment.amount)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    if query.total_amount != expected {
        tracing::error!(
            payment_id,
            expected,
            received = query.total_amount,
            currency = %query.currency,
            "Pre-checkout amount mismatch"
        );
        return Ok(reject_pre_checkout("Amount mismatch"));
    }

    tracing::info!(payment_id, order_id = %payment.order_id, "Pre-checkout approved");
    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}

fn reject_pre_checkout(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "ok": false, "error_message": message })),
    )
}

/// Process a successful-payment confirmation. At-least-once delivery:
/// a duplicate finds the payment already resolved and is a 200 no-op.
async fn handle_successful_payment(
    state: &AppState,
    confirmation: SuccessfulPayment,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let (user_external_id, payment_id) = match parse_payload(&confirmation.invoice_payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(error = %e, "Malformed confirmation payload");
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error_message": "Malformed payload" })),
            ));
        }
    };

    let Some(payment) =
        PaymentRepo::find_for_external_user(&state.pool, payment_id, user_external_id).await?
    else {
        tracing::error!(payment_id, user_external_id, "Confirmation for unknown payment");
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error_message": "Unknown payment" })),
        ));
    };

    if payment.status != "pending" {
        tracing::warn!(
            payment_id,
            status = %payment.status,
            "Duplicate confirmation, already processed"
        );
        return Ok((StatusCode::OK, Json(json!({ "ok": true, "published": false }))));
    }

    let published = publication::publish_after_payment(
        &state.pool,
        &state.site_config,
        &state.moderation,
        user_external_id,
        payment_id,
        confirmation.telegram_payment_charge_id.as_deref(),
        confirmation.provider_payment_charge_id.as_deref(),
    )
    .await;

    match published {
        Ok(published) => Ok((
            StatusCode::OK,
            Json(json!({ "ok": true, "published": published })),
        )),
        Err(e) => {
            // The user paid; make sure they hear about the snag instead
            // of the flow dying silently.
            tracing::error!(error = %e, payment_id, "Publication failed after payment");
            if let Ok(config) = state.site_config.get().await {
                state
                    .notifier
                    .send_user_message(
                        &config,
                        user_external_id,
                        "Payment received, but publication encountered an error. \
                         Our team has been notified.",
                    )
                    .await;
            }
            Err(AppError::Database(e))
        }
    }
}
