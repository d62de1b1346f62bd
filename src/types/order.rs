use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OrderError, ValidationError};
use crate::types::money;

/// Any JSON number; serialized back exactly as received.
pub type Qty = serde_json::Number;
pub type OrderId = String;

/// Order lifecycle status. Callers may set any string through an update;
/// only `cancelled` is ever assigned by the service itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => OrderStatus::Pending,
            "shipped" => OrderStatus::Shipped,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub book_title: String,
    pub book_isbn: String,
    pub quantity: Qty,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    /// Build a fresh `pending` order with a new id and `total_amount = quantity * price`.
    pub fn create(new: NewOrder) -> Result<Self, OrderError> {
        let total_amount = money::total(&new.quantity, new.price)?;
        Ok(Self {
            order_id: Uuid::new_v4().to_string(),
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            book_title: new.book_title,
            book_isbn: new.book_isbn,
            quantity: new.quantity,
            price: new.price,
            total_amount,
            order_date: Utc::now(),
            status: OrderStatus::Pending,
        })
    }

    /// Overwrite the fields present in `update`. `total_amount` is only
    /// recomputed when `recompute_total` is set and the caller did not supply one.
    pub fn apply(&mut self, update: OrderUpdate, recompute_total: bool) -> Result<(), OrderError> {
        let touches_amount = update.quantity.is_some() || update.price.is_some();
        let quantity = update.quantity.unwrap_or_else(|| self.quantity.clone());
        let price = update.price.unwrap_or(self.price);
        // Computed before any assignment so a failed update leaves the order untouched.
        let total_amount = match update.total_amount {
            Some(total) => total,
            None if recompute_total && touches_amount => money::total(&quantity, price)?,
            None => self.total_amount,
        };

        if let Some(status) = update.status {
            self.status = status;
        }
        self.quantity = quantity;
        self.price = price;
        self.total_amount = total_amount;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.status = OrderStatus::Cancelled;
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub book_title: String,
    pub book_isbn: String,
    pub quantity: Qty,
    pub price: Decimal,
}

pub const REQUIRED_FIELDS: [&str; 6] = [
    "customer_name",
    "customer_email",
    "book_title",
    "book_isbn",
    "quantity",
    "price",
];

impl NewOrder {
    /// Read a create request out of a parsed JSON body. Fields are checked in
    /// declaration order; the first absent one is reported.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, OrderError> {
        let obj = body.as_object().ok_or_else(|| OrderError::InvalidField {
            field: "body".to_string(),
            reason: "expected a JSON object".to_string(),
        })?;
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
            return Err(ValidationError::missing(missing).into());
        }
        Ok(Self {
            customer_name: string_field(body, "customer_name")?,
            customer_email: string_field(body, "customer_email")?,
            book_title: string_field(body, "book_title")?,
            book_isbn: string_field(body, "book_isbn")?,
            quantity: quantity_field(&body["quantity"])?,
            price: money::parse_amount("price", &body["price"])?,
        })
    }
}

/// Body of `PUT /orders/{id}`: every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub quantity: Option<Qty>,
    pub price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
}

impl OrderUpdate {
    pub fn from_json(body: &serde_json::Value) -> Result<Self, OrderError> {
        let obj = body.as_object().ok_or_else(|| OrderError::InvalidField {
            field: "body".to_string(),
            reason: "expected a JSON object".to_string(),
        })?;
        Ok(Self {
            status: obj
                .get("status")
                .map(|_| string_field(body, "status").map(OrderStatus::from))
                .transpose()?,
            quantity: obj.get("quantity").map(quantity_field).transpose()?,
            price: obj
                .get("price")
                .map(|v| money::parse_amount("price", v))
                .transpose()?,
            total_amount: obj
                .get("total_amount")
                .map(|v| money::parse_amount("total_amount", v))
                .transpose()?,
        })
    }
}

fn string_field(body: &serde_json::Value, field: &str) -> Result<String, OrderError> {
    body[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| OrderError::InvalidField {
            field: field.to_string(),
            reason: format!("expected a string, got {}", body[field]),
        })
}

fn quantity_field(value: &serde_json::Value) -> Result<Qty, OrderError> {
    match value {
        serde_json::Value::Number(n) => Ok(n.clone()),
        other => Err(OrderError::InvalidField {
            field: "quantity".to_string(),
            reason: format!("expected a number, got {other}"),
        }),
    }
}
