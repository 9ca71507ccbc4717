//! Cart, order and shipping address payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::catalog::SellerBrief;

/// Delivery lifecycle of an order. Transitions are driven externally
/// (fulfilment side); this service only stores the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Packing,
    Shipping,
    Arriving,
    Success,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Packing => "PACKING",
            DeliveryStatus::Shipping => "SHIPPING",
            DeliveryStatus::Arriving => "ARRIVING",
            DeliveryStatus::Success => "SUCCESS",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(DeliveryStatus::Pending),
            "PACKING" => Ok(DeliveryStatus::Packing),
            "SHIPPING" => Ok(DeliveryStatus::Shipping),
            "ARRIVING" => Ok(DeliveryStatus::Arriving),
            "SUCCESS" => Ok(DeliveryStatus::Success),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment lifecycle of an order, driven by a payment collaborator
/// outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Successful,
    Cancelled,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Successful => "SUCCESSFUL",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PROCESSING" => Ok(PaymentStatus::Processing),
            "SUCCESSFUL" => Ok(PaymentStatus::Successful),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product summary embedded in cart and order items
#[derive(Debug, Clone, Serialize)]
pub struct ItemProduct {
    pub name: String,
    pub slug: String,
    pub price_current: Decimal,
    pub seller: Option<SellerBrief>,
}

/// A cart row or order line. `total` is quantity times the product's
/// live current price, recomputed on every read.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product: ItemProduct,
    pub quantity: i32,
    pub total: Decimal,
}

impl OrderItem {
    pub fn line_total(quantity: i32, price_current: Decimal) -> Decimal {
        Decimal::from(quantity) * price_current
    }
}

/// Request to set a cart row's quantity (0 removes the row)
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleCartItemRequest {
    pub slug: String,
    pub quantity: u32,
}

/// Response for a cart toggle
#[derive(Debug, Clone, Serialize)]
pub struct ToggleCartItemResponse {
    pub message: String,
    pub item: Option<OrderItem>,
}

/// Request body for checkout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_id: Option<Uuid>,
}

/// Snapshot of the shipping fields carried on an order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShippingDetails {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
}

/// Order entity with nested items and computed totals
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub tx_ref: String,
    pub delivery_status: DeliveryStatus,
    pub payment_status: PaymentStatus,
    pub date_delivered: Option<DateTime<Utc>>,
    pub shipping_details: ShippingDetails,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Shipping address entity
#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddress {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShippingAddress {
    /// The snapshot copied onto an order at checkout
    pub fn into_details(self) -> ShippingDetails {
        ShippingDetails {
            full_name: Some(self.full_name),
            email: Some(self.email),
            phone: self.phone,
            address: self.address,
            city: self.city,
            country: self.country,
            zipcode: self.zipcode,
        }
    }
}

/// Payload for creating or replacing a shipping address
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingAddressRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zipcode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn statuses_round_trip_through_db_strings() {
        for s in ["PENDING", "PACKING", "SHIPPING", "ARRIVING", "SUCCESS"] {
            assert_eq!(s.parse::<DeliveryStatus>().unwrap().as_str(), s);
        }
        for s in ["PENDING", "PROCESSING", "SUCCESSFUL", "CANCELLED", "FAILED"] {
            assert_eq!(s.parse::<PaymentStatus>().unwrap().as_str(), s);
        }
        assert!("DONE".parse::<DeliveryStatus>().is_err());
        assert!("REFUNDED".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn line_total_multiplies_quantity_by_current_price() {
        assert_eq!(OrderItem::line_total(3, dec!(19.99)), dec!(59.97));
        assert_eq!(OrderItem::line_total(1, dec!(0.01)), dec!(0.01));
    }
}
