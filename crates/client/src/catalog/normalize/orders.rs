//! Order payload normalization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use kirana_core::{OrderId, ProductId};

use super::{i64_field, opt_decimal_field, string_or_empty};
use crate::catalog::types::{Order, OrderItem};

/// Convert a raw order record. Never fails; missing fields default.
pub(crate) fn map_order(raw: &Value) -> Order {
    Order {
        id: OrderId::new(string_or_empty(raw, &["id"])),
        user: string_or_empty(raw, &["user", "phone"]),
        status: string_or_empty(raw, &["status"]),
        total: opt_decimal_field(raw, "total").unwrap_or(Decimal::ZERO),
        items: item_list(raw),
        created_at: created_at(raw),
    }
}

fn item_list(raw: &Value) -> Vec<OrderItem> {
    let Some(Value::Array(items)) = raw.get("items") else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| OrderItem {
            product_id: ProductId::new(string_or_empty(item, &["product_id", "id"])),
            name: string_or_empty(item, &["name", "title"]),
            quantity: u32::try_from(i64_field(item, "quantity").max(0)).unwrap_or(u32::MAX),
            price: opt_decimal_field(item, "price").unwrap_or(Decimal::ZERO),
        })
        .collect()
}

/// RFC 3339 timestamp, or `None` when absent or mangled.
fn created_at(raw: &Value) -> Option<DateTime<Utc>> {
    raw.get("created_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
