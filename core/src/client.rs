//! Stateless HTTP request builder and response parser for the my-shop API.
//!
//! # Design
//! `ShopClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation has a `build_*` method that produces an
//! `HttpRequest`; `parse_json` turns any `HttpResponse` into the operation's
//! result. Authentication is added later by `Transport`, so built requests
//! never carry credentials.

use std::fmt;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{OrderStatus, OrderStatusBody, ShopForm, UpdateOrderStatusRequest};

/// Label of a remote operation, carried by failures for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetMyShop,
    CreateMyShop,
    UpdateMyShop,
    GetMyShopOrders,
    UpdateOrderStatus,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::GetMyShop => "get my shop",
            Operation::CreateMyShop => "create my shop",
            Operation::UpdateMyShop => "update my shop",
            Operation::GetMyShopOrders => "get my shop orders",
            Operation::UpdateOrderStatus => "update order status",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct ShopClient {
    base_url: String,
}

impl ShopClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get_my_shop(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/my/shop", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Multipart bodies get no content-type here; the executor sets it with
    /// the boundary.
    pub fn build_create_my_shop(&self, form: &ShopForm) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/api/my/shop", self.base_url),
            headers: Vec::new(),
            body: Some(HttpBody::Multipart(form.clone())),
        }
    }

    pub fn build_update_my_shop(&self, form: &ShopForm) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Put,
            url: format!("{}/api/my/shop", self.base_url),
            headers: Vec::new(),
            body: Some(HttpBody::Multipart(form.clone())),
        }
    }

    pub fn build_get_my_shop_orders(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/my/shop/order", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_update_order_status(
        &self,
        input: &UpdateOrderStatusRequest,
    ) -> Result<HttpRequest, ApiError> {
        if input.status == OrderStatus::Unknown {
            return Err(ApiError::Serialization(
                "cannot send an unrecognised order status".to_string(),
            ));
        }
        let body = serde_json::to_string(&OrderStatusBody {
            status: input.status,
        })
        .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url: self.order_status_url(&input.order_id)?,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(HttpBody::Json(body)),
        })
    }

    /// `{base}/api/my/shop/order/{order_id}/status` with the id encoded as a
    /// single path segment.
    fn order_status_url(&self, order_id: &str) -> Result<String, ApiError> {
        if matches!(order_id, "" | "." | "..") {
            return Err(ApiError::Serialization(format!(
                "invalid order id {order_id:?}"
            )));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Config(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "my", "shop", "order", order_id, "status"]);
        Ok(url.into())
    }
}

/// Validate the status and decode the body of a response to `operation`.
///
/// Any status outside 2xx is a failure, for every operation.
pub fn parse_json<T: DeserializeOwned>(
    operation: Operation,
    response: &HttpResponse,
) -> Result<T, ApiError> {
    check_status(operation, response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
        operation,
        message: e.to_string(),
    })
}

fn check_status(operation: Operation, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        operation,
        status: Some(response.status),
    })
}
