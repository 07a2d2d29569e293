//! Client-facing request/response types
//!
//! Common DTOs used in API communication between the server and the
//! storefront frontend.

use crate::models::{OrderLineItem, ReconciliationResult};
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Admin login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Admin login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Epoch milliseconds when the token expires
    pub expires_at: i64,
}

/// Check-auth response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    pub expires_at: i64,
}

// =============================================================================
// Order API DTOs
// =============================================================================

/// Order completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCompletionRequest {
    pub order_id: String,
    pub items: Vec<OrderLineItem>,
    /// Order total in dollars, as charged
    pub total: f64,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Requested pickup date, free-form
    #[serde(default)]
    pub pickup_date: Option<String>,
}

/// Order completion response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCompletionResponse {
    #[serde(flatten)]
    pub reconciliation: ReconciliationResult,
    /// True when a receipt email was dispatched
    pub receipt_sent: bool,
}

// =============================================================================
// Checkout API DTOs
// =============================================================================

/// Create checkout session request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub items: Vec<OrderLineItem>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

/// Checkout session response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    /// Hosted payment page URL to redirect the customer to
    pub url: String,
}

/// Checkout session status response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutStatusResponse {
    pub session_id: String,
    /// "open" | "complete" | "expired"
    pub status: String,
    /// "paid" | "unpaid" | "no_payment_required"
    pub payment_status: String,
    #[serde(default)]
    pub customer_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_completion_request_minimal() {
        let req: OrderCompletionRequest = serde_json::from_str(
            r#"{"order_id": "o-1", "items": [{"name": "Hat", "quantity": 1}], "total": 25.0}"#,
        )
        .unwrap();
        assert_eq!(req.order_id, "o-1");
        assert_eq!(req.items.len(), 1);
        assert!(req.customer_email.is_none());
    }

    #[test]
    fn test_order_completion_response_flattens() {
        let response = OrderCompletionResponse {
            reconciliation: ReconciliationResult::replay("o-2"),
            receipt_sent: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["order_id"], "o-2");
        assert_eq!(json["replayed"], true);
        assert_eq!(json["receipt_sent"], false);
    }
}
