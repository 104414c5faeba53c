//! Full shop lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every `MyShopApi`
//! operation over real HTTP through `ReqwestExecutor`. Validates request
//! building, multipart encoding, authentication and response parsing
//! end-to-end, and catches schema drift between the two crates.

use std::net::SocketAddr;
use std::sync::Arc;

use shop_core::{
    ApiError, MenuItem, MyShopApi, NotificationKind, Operation, OrderStatus, QueryKey,
    RecordingNotifier, ReqwestExecutor, ShopForm, ShopImage, StaticCredential,
    UpdateOrderStatusRequest,
};

async fn start_server(orders: Vec<mock_server::Order>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with_orders(listener, orders));
    addr
}

fn api(addr: SocketAddr, token: &str, notifier: &RecordingNotifier) -> MyShopApi {
    MyShopApi::with_parts(
        &format!("http://{addr}"),
        Arc::new(StaticCredential::new(token)),
        Arc::new(ReqwestExecutor::default()),
        Arc::new(notifier.clone()),
    )
}

fn order(id: &str) -> mock_server::Order {
    mock_server::Order {
        id: id.to_string(),
        shop: "s1".to_string(),
        user: "customer-1".to_string(),
        total_amount: 1800,
        ..mock_server::Order::default()
    }
}

fn shop_form(name: &str) -> ShopForm {
    ShopForm {
        name: name.to_string(),
        city: "Leeds".to_string(),
        country: "UK".to_string(),
        delivery_price: 250,
        estimated_delivery_time: 30,
        cuisines: vec!["Thai".to_string()],
        menu_items: vec![MenuItem {
            id: String::new(),
            name: "Curry".to_string(),
            price: 900,
        }],
        image: Some(ShopImage {
            file_name: "logo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }),
    }
}

#[tokio::test]
async fn shop_lifecycle() {
    let addr = start_server(Vec::new()).await;
    let notifier = RecordingNotifier::new();
    let api = api(addr, "owner-1", &notifier);

    // Step 1: no shop yet; the 404 is absorbed.
    let handle = api.get_my_shop().await;
    assert!(handle.data.is_none());
    assert!(!handle.is_loading);
    assert_eq!(handle.error.and_then(|e| e.status()), Some(404));
    assert!(notifier.events().is_empty());

    // Step 2: create.
    let create = api.create_my_shop();
    let created = create.trigger_async(shop_form("Acme")).await.unwrap();
    assert_eq!(created.name, "Acme");
    assert_eq!(created.user, "owner-1");
    assert_eq!(created.menu_items[0].price, 900);
    assert_eq!(created.image_url.as_deref(), Some("/images/logo.png"));
    assert!(create.is_success());
    assert!(api.cache().is_stale(&QueryKey::MY_SHOP));

    // Step 3: the invalidated read refetches.
    let fetched = api.get_my_shop().await.data.unwrap();
    assert_eq!(fetched, created);

    // Step 4: update.
    let update = api.update_my_shop();
    let updated = update.trigger_async(shop_form("Acme Kitchen")).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(api.get_my_shop().await.data.unwrap().name, "Acme Kitchen");

    // Step 5: creating a second shop conflicts.
    let err = create.trigger_async(shop_form("Again")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Http {
            operation: Operation::CreateMyShop,
            status: Some(409),
        }
    );
    assert!(create.is_error());

    assert_eq!(
        notifier.events(),
        vec![
            (NotificationKind::Success, "Shop created!".to_string()),
            (NotificationKind::Success, "Shop Updated".to_string()),
            (NotificationKind::Error, "Unable to create shop".to_string()),
        ]
    );
}

#[tokio::test]
async fn order_status_lifecycle() {
    let addr = start_server(vec![order("o1"), order("o2")]).await;
    let notifier = RecordingNotifier::new();
    let api = api(addr, "owner-1", &notifier);

    let orders = api.get_my_shop_orders().await.data.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, "o1");
    assert_eq!(orders[0].status, OrderStatus::Placed);
    assert_eq!(orders[0].total_amount, 1800);

    let mutation = api.update_my_shop_order();
    let order = mutation
        .trigger_async(UpdateOrderStatusRequest {
            order_id: "o1".to_string(),
            status: OrderStatus::OutForDelivery,
        })
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::OutForDelivery);

    let orders = api.get_my_shop_orders().await.data.unwrap();
    assert_eq!(orders[0].status, OrderStatus::OutForDelivery);
    assert_eq!(orders[1].status, OrderStatus::Placed);

    let err = mutation
        .trigger_async(UpdateOrderStatusRequest {
            order_id: "missing".to_string(),
            status: OrderStatus::Paid,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(mutation.take_error(), Some(err));
    assert!(mutation.state().is_idle());

    assert_eq!(notifier.count(NotificationKind::Success), 1);
    assert_eq!(notifier.count(NotificationKind::Error), 1);
}

#[tokio::test]
async fn empty_token_is_rejected_by_the_server() {
    let addr = start_server(Vec::new()).await;
    let notifier = RecordingNotifier::new();
    let api = api(addr, "", &notifier);

    let handle = api.get_my_shop_orders().await;

    assert!(handle.data.is_none());
    assert_eq!(
        handle.error,
        Some(ApiError::Http {
            operation: Operation::GetMyShopOrders,
            status: Some(401),
        })
    );
}

#[tokio::test]
async fn unreachable_server_is_an_http_failure_without_status() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let notifier = RecordingNotifier::new();
    let api = api(addr, "owner-1", &notifier);

    let handle = api.get_my_shop().await;

    assert_eq!(
        handle.error,
        Some(ApiError::Http {
            operation: Operation::GetMyShop,
            status: None,
        })
    );
}
