//! Domain DTOs for the my-shop API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! The backend speaks camelCase with Mongo-style `_id` fields; both `id` and
//! `_id` are accepted on input. `Shop` and `Order` require their identifier;
//! every other field defaults when absent so partial payloads still decode.
//! A body without an identifier is a decode failure, not an empty resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shop owned by the authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, alias = "shopName")]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub delivery_price: u64,
    #[serde(default)]
    pub estimated_delivery_time: u32,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A single entry on a shop's menu. Prices are in minor currency units.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MenuItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub price: u64,
}

/// An order placed by a customer against one of the user's shops.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub shop: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub delivery_details: DeliveryDetails,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub total_amount: u64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub email: String,
    pub name: String,
    pub address_line1: String,
    pub city: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: u32,
}

/// Lifecycle of an order. Variants are declared in progression order;
/// `Cancelled` may be entered from any non-terminal status.
///
/// Statuses this client does not know decode as `Unknown`, so one
/// unfamiliar order never hides the rest of a listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    #[default]
    Placed,
    Paid,
    InProgress,
    OutForDelivery,
    Delivered,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Paid => "paid",
            OrderStatus::InProgress => "inProgress",
            OrderStatus::OutForDelivery => "outForDelivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `next` is a forward step from `self`. Terminal statuses
    /// accept nothing; cancellation is allowed from any other status.
    /// `Unknown` is never a valid source or target.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() || self == OrderStatus::Unknown || next == OrderStatus::Unknown {
            return false;
        }
        next == OrderStatus::Cancelled || next > self
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for the update-order-status mutation. Only `status` travels in the
/// request body; `order_id` selects the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOrderStatusRequest {
    pub order_id: String,
    pub status: OrderStatus,
}

/// JSON body of `PATCH /api/my/shop/order/{orderId}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusBody {
    pub status: OrderStatus,
}

/// Image attached to a shop form.
#[derive(Clone, PartialEq, Eq)]
pub struct ShopImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ShopImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Multipart payload for creating or updating a shop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopForm {
    pub name: String,
    pub city: String,
    pub country: String,
    pub delivery_price: u64,
    pub estimated_delivery_time: u32,
    pub cuisines: Vec<String>,
    pub menu_items: Vec<MenuItem>,
    pub image: Option<ShopImage>,
}

impl ShopForm {
    /// Flatten the form into the indexed text fields the backend expects.
    /// The image part is not included.
    pub fn text_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("shopName".to_string(), self.name.clone()),
            ("city".to_string(), self.city.clone()),
            ("country".to_string(), self.country.clone()),
            ("deliveryPrice".to_string(), self.delivery_price.to_string()),
            (
                "estimatedDeliveryTime".to_string(),
                self.estimated_delivery_time.to_string(),
            ),
        ];
        for (i, cuisine) in self.cuisines.iter().enumerate() {
            fields.push((format!("cuisines[{i}]"), cuisine.clone()));
        }
        for (i, item) in self.menu_items.iter().enumerate() {
            fields.push((format!("menuItems[{i}][name]"), item.name.clone()));
            fields.push((format!("menuItems[{i}][price]"), item.price.to_string()));
        }
        fields
    }
}
