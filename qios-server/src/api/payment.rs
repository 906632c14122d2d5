//! Payment gateway endpoints
//!
//! GET  /api/payment/gateways - configured gateways with their channels
//! POST /api/payment/create   - create a vendor payment and record it
//! POST /api/payment/verify   - pull the vendor status and settle the order

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    GatewayInfo, NotificationKind, Payment, PaymentCreate, PaymentSession, PaymentStatus,
    PaymentVerify,
};
use sqlx::PgPool;

use super::{ApiResult, ok};
use crate::auth::Access;
use crate::db;
use crate::db::notifications::NewNotification;
use crate::error::{ServiceResult, internal};
use crate::orders::money::to_decimal;
use crate::payment::{ChargeRequest, GatewayKind, check_method};
use crate::state::AppState;
use crate::util::{format_rupiah, now_millis, snowflake_id};
use crate::validation::{MAX_AMOUNT, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/payment/gateways", get(gateways))
        .route("/api/payment/create", post(create))
        .route("/api/payment/verify", post(verify))
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 || amount > MAX_AMOUNT {
        return Err(AppError::new(ErrorCode::PaymentAmountInvalid).with_detail("amount", amount));
    }
    Ok(())
}

/// A payment linked to an order must charge exactly the order total
pub fn check_order_amount(amount: f64, order_total: f64) -> Result<(), AppError> {
    if to_decimal(amount).round_dp(2) != to_decimal(order_total).round_dp(2) {
        return Err(AppError::with_message(
            ErrorCode::PaymentAmountInvalid,
            "Payment amount must equal the order total",
        )
        .with_detail("amount", amount)
        .with_detail("orderTotal", order_total));
    }
    Ok(())
}

/// An order is settled once, on the first transition into PAID
pub fn settles_order(previous: PaymentStatus, current: PaymentStatus, order_id: Option<i64>) -> bool {
    order_id.is_some() && current == PaymentStatus::Paid && previous != PaymentStatus::Paid
}

/// GET /api/payment/gateways
pub async fn gateways(State(state): State<AppState>) -> ApiResult<Vec<GatewayInfo>> {
    ok(state.gateways.available())
}

/// POST /api/payment/create
pub async fn create(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(data): Json<PaymentCreate>,
) -> ApiResult<PaymentSession> {
    access.ensure_store(data.store_id)?;
    validate_amount(data.amount)?;
    validate_optional_text(&data.bill_number, "billNumber", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

    let gateway = state.gateways.create_by_name(&data.gateway)?;
    let method = check_method(gateway.as_ref(), data.method.as_deref())?;

    let order_number = match data.order_id {
        Some(order_id) => {
            let order = db::orders::find(&state.pool, data.store_id, order_id)
                .await
                .map_err(internal)?
                .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
            check_order_amount(data.amount, order.total)?;
            Some(order.order_number)
        }
        None => None,
    };

    let payment_id = snowflake_id();
    let description = data
        .description
        .clone()
        .or_else(|| order_number.as_ref().map(|n| format!("Pembayaran pesanan {n}")))
        .unwrap_or_else(|| "Pembayaran QIOS".to_string());
    let request = ChargeRequest {
        external_id: format!("QIOS-{payment_id}"),
        amount: data.amount,
        method: method.clone(),
        customer: data.customer.clone(),
        bill_number: data.bill_number.clone(),
        description,
    };

    let session = gateway.create(&request).await?;
    let payment = db::payments::insert(
        &state.pool,
        payment_id,
        data.store_id,
        data.order_id,
        method.as_deref(),
        &session,
        now_millis(),
    )
    .await
    .map_err(internal)?;

    tracing::info!(
        store_id = payment.store_id,
        payment_id = payment.id,
        order_id = ?payment.order_id,
        gateway = %payment.gateway,
        reference = %payment.reference,
        amount = payment.amount,
        "Payment created"
    );
    ok(session)
}

/// POST /api/payment/verify
pub async fn verify(
    State(state): State<AppState>,
    Extension(access): Extension<Access>,
    Json(data): Json<PaymentVerify>,
) -> ApiResult<PaymentSession> {
    access.ensure_store(data.store_id)?;
    let kind: GatewayKind = data.gateway.parse()?;
    let reference = data.reference.trim();

    let payment = db::payments::find_by_reference(&state.pool, data.store_id, kind.as_str(), reference)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PaymentNotFound).with_detail("reference", reference))?;

    let gateway = state.gateways.create(kind)?;
    let session = gateway.status(&payment.reference).await?;

    let previous = record_status(&state.pool, &payment, &session).await?;
    tracing::info!(
        store_id = payment.store_id,
        payment_id = payment.id,
        gateway = %kind,
        previous = ?previous,
        status = ?session.status,
        "Payment verified"
    );
    ok(session)
}

/// Store the new status; on the first PAID, mark the linked order paid and notify
async fn record_status(
    pool: &PgPool,
    payment: &Payment,
    session: &PaymentSession,
) -> ServiceResult<PaymentStatus> {
    let mut tx = pool.begin().await?;
    let now = now_millis();
    let previous =
        db::payments::update_status(&mut *tx, payment.id, session.status, &session.raw, now).await?;

    let settled = payment
        .order_id
        .filter(|_| settles_order(previous, session.status, payment.order_id));
    if let Some(order_id) = settled {
        let number = db::orders::set_payment_status(
            &mut *tx,
            payment.store_id,
            order_id,
            PaymentStatus::Paid,
            now,
        )
        .await?;
        if let Some(number) = number {
            db::notifications::insert(
                &mut *tx,
                payment.store_id,
                &NewNotification::new(
                    NotificationKind::Payment,
                    "Pembayaran diterima",
                    format!(
                        "Pembayaran {} untuk pesanan {number} via {} berhasil",
                        format_rupiah(payment.amount),
                        payment.gateway
                    ),
                ),
                now,
            )
            .await?;
        }
    }
    tx.commit().await?;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(10_000.0).is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                validate_amount(bad).unwrap_err().code,
                ErrorCode::PaymentAmountInvalid
            );
        }
    }

    #[test]
    fn linked_payment_must_match_order_total() {
        assert!(check_order_amount(56_610.0, 56_610.0).is_ok());
        assert!(check_order_amount(0.1 + 0.2, 0.3).is_ok());
        for amount in [1.0, 56_609.0, 56_611.0] {
            assert_eq!(
                check_order_amount(amount, 56_610.0).unwrap_err().code,
                ErrorCode::PaymentAmountInvalid
            );
        }
    }

    #[test]
    fn only_first_paid_transition_settles_linked_order() {
        use PaymentStatus::*;
        assert!(settles_order(Pending, Paid, Some(1)));
        assert!(!settles_order(Paid, Paid, Some(1)));
        assert!(!settles_order(Pending, Paid, None));
        assert!(!settles_order(Pending, Expired, Some(1)));
    }
}
