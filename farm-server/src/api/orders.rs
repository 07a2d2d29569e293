//! Order completion endpoint

use axum::{Json, extract::State};
use shared::client::{OrderCompletionRequest, OrderCompletionResponse};
use shared::error::{AppError, ErrorCode};

use crate::error::ServiceResult;
use crate::reconcile::{self, PgInventoryStore};
use crate::state::AppState;
use crate::{db, email};

/// POST /api/orders/complete
///
/// Reconciles the completed order against inventory and sends a receipt
/// email when a customer address was provided. The email is best-effort;
/// a send failure never fails the request.
pub async fn complete_order(
    State(state): State<AppState>,
    Json(req): Json<OrderCompletionRequest>,
) -> ServiceResult<Json<OrderCompletionResponse>> {
    if req.order_id.trim().is_empty() {
        return Err(AppError::validation("order_id must not be empty").into());
    }
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }

    let store = PgInventoryStore::new(state.pool.clone());
    let now = shared::util::now_millis();
    let reconciliation = reconcile::apply_order(&store, &req.order_id, &req.items, now).await?;

    let mut receipt_sent = false;
    if !reconciliation.replayed
        && let Some(to) = req.customer_email.as_deref()
    {
        match email::send_order_receipt(
            &state.ses,
            &state.ses_from_email,
            to,
            &req.order_id,
            &req.items,
            req.total,
            req.pickup_date.as_deref(),
        )
        .await
        {
            Ok(()) => receipt_sent = true,
            Err(e) => {
                tracing::warn!(order_id = %req.order_id, "Receipt email failed: {e}");
            }
        }
    }

    if reconciliation.harvested > 0
        && let Ok(count) = db::harvest::total(&state.pool).await
    {
        tracing::info!(
            order_id = %req.order_id,
            harvested = reconciliation.harvested,
            running_total = count.total,
            "Oysters reconciled"
        );
    }

    Ok(Json(OrderCompletionResponse {
        reconciliation,
        receipt_sent,
    }))
}
