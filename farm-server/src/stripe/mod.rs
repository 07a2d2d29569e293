//! Stripe integration via REST API (no SDK dependency)

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One cart line for a checkout session
pub struct CheckoutItem {
    pub name: String,
    /// Unit price in cents
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Session fields the storefront cares about
pub struct SessionStatus {
    pub id: String,
    pub status: String,
    pub payment_status: String,
    pub customer_email: Option<String>,
}

/// Create a Stripe Checkout Session (payment mode). Returns the session
/// id and the hosted payment page URL.
pub async fn create_checkout_session(
    secret_key: &str,
    items: &[CheckoutItem],
    customer_email: Option<&str>,
    success_url: &str,
    cancel_url: &str,
) -> Result<(String, String), BoxError> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("success_url".into(), success_url.into()),
        ("cancel_url".into(), cancel_url.into()),
    ];
    if let Some(email) = customer_email {
        form.push(("customer_email".into(), email.into()));
    }
    for (i, item) in items.iter().enumerate() {
        form.push((
            format!("line_items[{i}][price_data][currency]"),
            "usd".into(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
    }

    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post("https://api.stripe.com/v1/checkout/sessions")
        .basic_auth(secret_key, None::<&str>)
        .form(&form)
        .send()
        .await?
        .json()
        .await?;

    match (resp["id"].as_str(), resp["url"].as_str()) {
        (Some(id), Some(url)) => Ok((id.to_string(), url.to_string())),
        _ => Err(format!("Stripe create_checkout failed: {resp}").into()),
    }
}

/// Retrieve a Checkout Session's status by id
pub async fn retrieve_session(
    secret_key: &str,
    session_id: &str,
) -> Result<SessionStatus, BoxError> {
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .get(format!(
            "https://api.stripe.com/v1/checkout/sessions/{session_id}"
        ))
        .basic_auth(secret_key, None::<&str>)
        .send()
        .await?
        .json()
        .await?;

    let Some(id) = resp["id"].as_str() else {
        return Err(format!("Stripe retrieve_session failed: {resp}").into());
    };

    Ok(SessionStatus {
        id: id.to_string(),
        status: resp["status"].as_str().unwrap_or("unknown").to_string(),
        payment_status: resp["payment_status"]
            .as_str()
            .unwrap_or("unknown")
            .to_string(),
        customer_email: resp["customer_details"]["email"]
            .as_str()
            .map(String::from),
    })
}
