//! Order receipt emails (AWS SES)

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use shared::models::OrderLineItem;

pub async fn send_order_receipt(
    ses: &SesClient,
    from: &str,
    to: &str,
    order_id: &str,
    items: &[OrderLineItem],
    total: f64,
    pickup_date: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = Content::builder()
        .data(format!("Pearl Flat Oyster Co. order {order_id}"))
        .build()?;

    let mut lines = String::from("Thank you for your order!\n\n");
    for item in items {
        lines.push_str(&format!("  {} x{}\n", item.name, item.quantity));
    }
    lines.push_str(&format!("\nTotal: ${total:.2}\n"));
    if let Some(date) = pickup_date {
        lines.push_str(&format!("Pickup: {date}\n"));
    }
    lines.push_str("\nSee you at the flats,\nPearl Flat Oyster Co.");

    let body = Body::builder()
        .text(Content::builder().data(lines).build()?)
        .build();

    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;

    tracing::info!(to = to, order_id = order_id, "Order receipt sent");
    Ok(())
}
