//! In-memory implementation of the my-shop HTTP API.
//!
//! Every route requires `Authorization: Bearer <token>`; the token doubles as
//! the owner id. Shop forms arrive as multipart, status updates as JSON.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub shop_name: String,
    pub city: String,
    pub country: String,
    pub delivery_price: u64,
    pub estimated_delivery_time: u32,
    pub cuisines: Vec<String>,
    pub menu_items: Vec<MenuItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub shop: String,
    pub user: String,
    pub delivery_details: DeliveryDetails,
    pub cart_items: Vec<CartItem>,
    pub total_amount: u64,
    pub status: OrderStatus,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub email: String,
    pub name: String,
    pub address_line1: String,
    pub city: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: u32,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
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
}

#[derive(Deserialize)]
pub struct UpdateStatus {
    pub status: OrderStatus,
}

#[derive(Default)]
pub struct Store {
    pub shop: Option<Shop>,
    pub orders: Vec<Order>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_orders(Vec::new())
}

/// Router whose store starts with `orders` already placed.
pub fn app_with_orders(orders: Vec<Order>) -> Router {
    let db: Db = Arc::new(RwLock::new(Store { shop: None, orders }));
    Router::new()
        .route(
            "/api/my/shop",
            get(get_my_shop).post(create_my_shop).put(update_my_shop),
        )
        .route("/api/my/shop/order", get(get_my_shop_orders))
        .route("/api/my/shop/order/{order_id}/status", patch(update_order_status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_orders(listener, Vec::new()).await
}

pub async fn run_with_orders(listener: TcpListener, orders: Vec<Order>) -> Result<(), std::io::Error> {
    info!(addr = ?listener.local_addr().ok(), "serving my-shop API");
    axum::serve(listener, app_with_orders(orders)).await
}

/// Extract the bearer token, rejecting requests without one.
fn bearer(headers: &HeaderMap) -> Result<String, StatusCode> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(StatusCode::UNAUTHORIZED)
}

async fn get_my_shop(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Shop>, StatusCode> {
    bearer(&headers)?;
    let store = db.read().await;
    store.shop.clone().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_my_shop(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Shop>), StatusCode> {
    let user = bearer(&headers)?;
    let mut shop = Shop {
        id: Uuid::new_v4().to_string(),
        user,
        ..Shop::default()
    };
    apply_form(&mut shop, multipart).await?;

    let mut store = db.write().await;
    if store.shop.is_some() {
        return Err(StatusCode::CONFLICT);
    }
    store.shop = Some(shop.clone());
    Ok((StatusCode::CREATED, Json(shop)))
}

async fn update_my_shop(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Shop>, StatusCode> {
    bearer(&headers)?;
    let mut store = db.write().await;
    let shop = store.shop.as_mut().ok_or(StatusCode::NOT_FOUND)?;
    let mut updated = shop.clone();
    apply_form(&mut updated, multipart).await?;
    *shop = updated.clone();
    Ok(Json(updated))
}

async fn get_my_shop_orders(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, StatusCode> {
    bearer(&headers)?;
    Ok(Json(db.read().await.orders.clone()))
}

async fn update_order_status(
    State(db): State<Db>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<UpdateStatus>,
) -> Result<Json<Order>, StatusCode> {
    bearer(&headers)?;
    let mut store = db.write().await;
    let order = store
        .orders
        .iter_mut()
        .find(|order| order.id == order_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    order.status = input.status;
    Ok(Json(order.clone()))
}

/// Overwrite `shop` with the fields present in a multipart shop form.
///
/// Cuisines and menu items are replaced wholesale when any indexed field for
/// them is present.
async fn apply_form(shop: &mut Shop, mut multipart: Multipart) -> Result<(), StatusCode> {
    let mut cuisines: Vec<(usize, String)> = Vec::new();
    let mut menu: HashMap<usize, MenuItem> = HashMap::new();
    let mut saw_cuisines = false;
    let mut saw_menu = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "imageFile" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            debug!(%file_name, len = bytes.len(), "received shop image");
            shop.image_url = Some(format!("/images/{file_name}"));
            continue;
        }
        let value = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        match name.as_str() {
            "shopName" => shop.shop_name = value,
            "city" => shop.city = value,
            "country" => shop.country = value,
            "deliveryPrice" => shop.delivery_price = number(&value)?,
            "estimatedDeliveryTime" => shop.estimated_delivery_time = number(&value)?,
            _ => {
                if let Some(index) = indexed(&name, "cuisines[", "]") {
                    saw_cuisines = true;
                    cuisines.push((index, value));
                } else if let Some(index) = indexed(&name, "menuItems[", "][name]") {
                    saw_menu = true;
                    menu.entry(index).or_default().name = value;
                } else if let Some(index) = indexed(&name, "menuItems[", "][price]") {
                    saw_menu = true;
                    menu.entry(index).or_default().price = number(&value)?;
                }
            }
        }
    }

    if saw_cuisines {
        cuisines.sort_by_key(|(index, _)| *index);
        shop.cuisines = cuisines.into_iter().map(|(_, cuisine)| cuisine).collect();
    }
    if saw_menu {
        let mut items: Vec<(usize, MenuItem)> = menu.into_iter().collect();
        items.sort_by_key(|(index, _)| *index);
        shop.menu_items = items
            .into_iter()
            .map(|(_, mut item)| {
                item.id = Uuid::new_v4().to_string();
                item
            })
            .collect();
    }
    Ok(())
}

fn number<T: std::str::FromStr>(value: &str) -> Result<T, StatusCode> {
    value.trim().parse().map_err(|_| StatusCode::BAD_REQUEST)
}

/// Parse `prefix{index}suffix` field names.
fn indexed(name: &str, prefix: &str, suffix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?.strip_suffix(suffix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_serializes_with_backend_field_names() {
        let shop = Shop {
            id: "s1".to_string(),
            shop_name: "Acme".to_string(),
            ..Shop::default()
        };
        let json = serde_json::to_value(&shop).unwrap();
        assert_eq!(json["_id"], "s1");
        assert_eq!(json["shopName"], "Acme");
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn update_status_rejects_unknown_status() {
        let result: Result<UpdateStatus, _> = serde_json::from_str(r#"{"status":"lost"}"#);
        assert!(result.is_err());
        let input: UpdateStatus = serde_json::from_str(r#"{"status":"outForDelivery"}"#).unwrap();
        assert_eq!(input.status, OrderStatus::OutForDelivery);
    }

    #[test]
    fn indexed_field_names() {
        assert_eq!(indexed("cuisines[3]", "cuisines[", "]"), Some(3));
        assert_eq!(indexed("menuItems[0][price]", "menuItems[", "][price]"), Some(0));
        assert_eq!(indexed("menuItems[0][price]", "menuItems[", "][name]"), None);
        assert_eq!(indexed("cuisines[x]", "cuisines[", "]"), None);
    }

    #[test]
    fn bearer_requires_non_empty_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer(&headers), Err(StatusCode::UNAUTHORIZED));
        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer(&headers), Err(StatusCode::UNAUTHORIZED));
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer(&headers), Ok("abc".to_string()));
    }
}
