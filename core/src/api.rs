//! The my-shop data-access facade.
//!
//! Wires `ShopClient`, `Transport`, `QueryCache` and the notification sink
//! together and exposes the five remote operations: two cached reads and
//! three mutation handles.

use std::sync::Arc;

use crate::client::{Operation, ShopClient};
use crate::config::ApiConfig;
use crate::credential::CredentialProvider;
use crate::error::ApiError;
use crate::http::{HttpExecutor, ReqwestExecutor};
use crate::mutation::{Mutation, MutationKind};
use crate::notify::{Notifier, TracingNotifier};
use crate::query::{QueryCache, QueryHandle, QueryKey};
use crate::transport::Transport;
use crate::types::{Order, Shop, ShopForm, UpdateOrderStatusRequest};

#[derive(Clone)]
pub struct MyShopApi {
    client: ShopClient,
    transport: Transport,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl MyShopApi {
    /// Production wiring: reqwest transport and log-based notifications.
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::with_parts(
            &config.base_url,
            credentials,
            Arc::new(ReqwestExecutor::new(config.timeout)),
            Arc::new(TracingNotifier),
        )
    }

    pub fn from_env(credentials: Arc<dyn CredentialProvider>) -> Result<Self, ApiError> {
        Ok(Self::new(&ApiConfig::from_env()?, credentials))
    }

    pub fn with_parts(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
        executor: Arc<dyn HttpExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client: ShopClient::new(base_url),
            transport: Transport::new(credentials, executor),
            cache: QueryCache::new(),
            notifier,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn get_my_shop(&self) -> QueryHandle<Shop> {
        let transport = self.transport.clone();
        let request = self.client.build_get_my_shop();
        self.cache
            .query(&QueryKey::MY_SHOP, move || async move {
                transport.execute(Operation::GetMyShop, request).await
            })
            .await
    }

    pub async fn get_my_shop_orders(&self) -> QueryHandle<Vec<Order>> {
        let transport = self.transport.clone();
        let request = self.client.build_get_my_shop_orders();
        self.cache
            .query(&QueryKey::MY_SHOP_ORDERS, move || async move {
                transport.execute(Operation::GetMyShopOrders, request).await
            })
            .await
    }

    pub fn create_my_shop(&self) -> Mutation<ShopForm, Shop> {
        let client = self.client.clone();
        let transport = self.transport.clone();
        self.mutation(MutationKind::CreateShop, move |form: ShopForm| {
            let request = client.build_create_my_shop(&form);
            let transport = transport.clone();
            async move { transport.execute(Operation::CreateMyShop, request).await }
        })
    }

    pub fn update_my_shop(&self) -> Mutation<ShopForm, Shop> {
        let client = self.client.clone();
        let transport = self.transport.clone();
        self.mutation(MutationKind::UpdateShop, move |form: ShopForm| {
            let request = client.build_update_my_shop(&form);
            let transport = transport.clone();
            async move { transport.execute(Operation::UpdateMyShop, request).await }
        })
    }

    /// Callers usually apply the new status optimistically and await
    /// `trigger_async` to revert it on failure.
    pub fn update_my_shop_order(&self) -> Mutation<UpdateOrderStatusRequest, Order> {
        let client = self.client.clone();
        let transport = self.transport.clone();
        self.mutation(
            MutationKind::UpdateOrderStatus,
            move |input: UpdateOrderStatusRequest| {
                let request = client.build_update_order_status(&input);
                let transport = transport.clone();
                async move {
                    transport
                        .execute(Operation::UpdateOrderStatus, request?)
                        .await
                }
            },
        )
    }

    fn mutation<I, T, F, Fut>(&self, kind: MutationKind, run: F) -> Mutation<I, T>
    where
        I: Send + 'static,
        T: Clone + Send + Sync + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        Mutation::new(kind, self.cache.clone(), self.notifier.clone(), run)
    }
}
