use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Delivery => "delivery",
            DeliveryType::Pickup => "pickup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "delivery" => Some(DeliveryType::Delivery),
            "pickup" => Some(DeliveryType::Pickup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: Option<String>,
    pub delivery_type: DeliveryType,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_method: String,
    pub mpesa_checkout_request_id: Option<String>,
    pub mpesa_receipt_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// A validated checkout, ready to be persisted as an order with its items.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: Option<String>,
    pub delivery_type: DeliveryType,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Largest amount a `NUMERIC(12,2)` column holds.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

impl NewOrderItem {
    pub fn total_price(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

impl NewOrder {
    pub fn total_amount(&self) -> Decimal {
        self.items
            .iter()
            .map(NewOrderItem::total_price)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }
}

/// Reference shown on the payer's prompt, e.g. `ORDER-1b4e28ba`.
pub fn account_reference(order_id: Uuid) -> String {
    let id = order_id.to_string();
    format!("ORDER-{}", &id[..8])
}

pub fn transaction_desc(item_count: i64) -> String {
    format!("Pure Squeeze Order - {} items", item_count)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemRequest {
    pub product_id: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub items: Vec<CheckoutItemRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub account_reference: String,
    pub transaction_desc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutRejection {
    MissingInformation,
    MissingAddress,
    EmptyCart,
    InvalidPrice,
    TotalOutOfRange,
}

impl CheckoutRejection {
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutRejection::MissingInformation => "MISSING_INFORMATION",
            CheckoutRejection::MissingAddress => "MISSING_ADDRESS",
            CheckoutRejection::EmptyCart => "EMPTY_CART",
            CheckoutRejection::InvalidPrice => "INVALID_PRICE",
            CheckoutRejection::TotalOutOfRange => "TOTAL_OUT_OF_RANGE",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CheckoutRejection::MissingInformation => "Please fill in all required fields.",
            CheckoutRejection::MissingAddress => "Please provide a delivery address.",
            CheckoutRejection::EmptyCart => "The cart has no items.",
            CheckoutRejection::InvalidPrice => "Every item needs a price above zero.",
            CheckoutRejection::TotalOutOfRange => "The order total is too large.",
        }
    }
}

impl CheckoutRequest {
    pub fn validate(self) -> Result<NewOrder, CheckoutRejection> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.phone.trim().is_empty() {
            return Err(CheckoutRejection::MissingInformation);
        }

        let address = self
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        let delivery_address = match self.delivery_type {
            DeliveryType::Delivery => Some(address.ok_or(CheckoutRejection::MissingAddress)?),
            DeliveryType::Pickup => None,
        };

        let items: Vec<NewOrderItem> = self
            .items
            .into_iter()
            .filter(|i| i.quantity > 0)
            .map(|i| NewOrderItem {
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price: i.unit_price,
            })
            .collect();
        if items.is_empty() {
            return Err(CheckoutRejection::EmptyCart);
        }
        if items.iter().any(|i| i.unit_price <= Decimal::ZERO) {
            return Err(CheckoutRejection::InvalidPrice);
        }
        items
            .iter()
            .try_fold(Decimal::ZERO, |total, i| {
                i.unit_price
                    .checked_mul(Decimal::from(i.quantity))
                    .and_then(|line| total.checked_add(line))
                    .filter(|t| *t <= MAX_ORDER_TOTAL)
            })
            .ok_or(CheckoutRejection::TotalOutOfRange)?;

        Ok(NewOrder {
            customer_name: self.name.trim().to_string(),
            customer_email: self.email.trim().to_string(),
            customer_phone: self.phone.trim().to_string(),
            delivery_address,
            delivery_type: self.delivery_type,
            items,
        })
    }
}
