//! Order endpoints.
//!
//! Customers create, list, and read their own orders; admins list every
//! order, create on behalf of a customer, update, move through the status
//! machine, and soft delete.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use energy_maximum_core::{AdminId, CustomerId, OrderId, OrderStatus, Principal};

use super::parse_id;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireCustomer};
use crate::models::{
    CustomerOrders, NewOrder, NewOrderItem, Order, OrderFilter, OrderPatch, OrderWithItems, Page,
};
use crate::state::AppState;

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/order", post(create_own).get(list_own))
        .route("/api/order/all", get(list_all))
        .route(
            "/api/order/{id}",
            post(create_for_customer)
                .get(get_own)
                .put(update)
                .delete(remove),
        )
        .route("/api/order/finish/{id}", put(finish))
        .route("/api/order/cancel/{id}", put(cancel))
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    #[serde(default)]
    description: String,
    total: Decimal,
    #[serde(default)]
    items: Vec<NewOrderItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateOrderRequest {
    customer_id: Option<CustomerId>,
    description: Option<String>,
    total: Option<Decimal>,
    #[serde(default)]
    items: Vec<NewOrderItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    customer_id: Option<i64>,
    status: Option<i16>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl ListQuery {
    fn into_filter(self) -> Result<OrderFilter> {
        let customer_id: Option<CustomerId> = self.customer_id.map(parse_id).transpose()?;
        let status = self
            .status
            .map(OrderStatus::try_from)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(OrderFilter {
            customer_id,
            status,
            page: Page::new(self.page, self.page_size),
        })
    }
}

impl CreateOrderRequest {
    fn into_new_order(self, customer_id: CustomerId) -> Result<NewOrder> {
        validate_total(self.total)?;
        validate_items(&self.items)?;
        Ok(NewOrder {
            customer_id,
            description: self.description,
            total: self.total,
            items: self.items,
        })
    }
}

impl UpdateOrderRequest {
    fn into_parts(self) -> Result<(OrderPatch, Vec<NewOrderItem>)> {
        if let Some(total) = self.total {
            validate_total(total)?;
        }
        if let Some(customer_id) = self.customer_id
            && customer_id.as_i64() <= 0
        {
            return Err(AppError::BadRequest("customerId must be positive".to_string()));
        }
        validate_items(&self.items)?;

        let patch = OrderPatch {
            customer_id: self.customer_id,
            description: self.description,
            total: self.total,
        };
        Ok((patch, self.items))
    }
}

fn validate_total(total: Decimal) -> Result<()> {
    if total.is_sign_negative() {
        return Err(AppError::BadRequest("total must not be negative".to_string()));
    }
    Ok(())
}

fn validate_items(items: &[NewOrderItem]) -> Result<()> {
    for item in items {
        if item.amount <= 0 {
            return Err(AppError::BadRequest("item amount must be positive".to_string()));
        }
        if item.price.is_sign_negative() {
            return Err(AppError::BadRequest("item price must not be negative".to_string()));
        }
        if item.item_id.as_i64() <= 0 {
            return Err(AppError::BadRequest("itemId must be positive".to_string()));
        }
    }
    Ok(())
}

fn actor_id(admin: &Principal) -> Result<AdminId> {
    admin
        .admin_id()
        .ok_or_else(|| AppError::Internal("admin extractor produced a customer".to_string()))
}

async fn create_own(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<OrderWithItems>> {
    let customer_id = customer
        .customer_id()
        .ok_or_else(|| AppError::Internal("customer extractor produced an admin".to_string()))?;
    let order = body.into_new_order(customer_id)?;

    Ok(Json(state.orders().create(order).await?))
}

async fn list_own(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Query(query): Query<ListQuery>,
) -> Result<Json<CustomerOrders>> {
    let customer_id = customer
        .customer_id()
        .ok_or_else(|| AppError::Internal("customer extractor produced an admin".to_string()))?;
    // A customer only ever sees their own orders; `customerId` is ignored
    let filter = query.into_filter()?;

    Ok(Json(
        state
            .orders()
            .list_for_customer(customer_id, filter.status, filter.page)
            .await?,
    ))
}

async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    let filter = query.into_filter()?;

    Ok(Json(state.orders().list(filter).await?))
}

async fn get_own(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(id): Path<i64>,
) -> Result<Json<OrderWithItems>> {
    let found = state.orders().get(parse_id(id)?).await?;

    // Other customers' orders are indistinguishable from missing ones
    if Some(found.order.customer_id) != customer.customer_id() {
        return Err(AppError::NotFound("order".to_string()));
    }

    Ok(Json(found))
}

async fn create_for_customer(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(customer_id): Path<i64>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<OrderWithItems>> {
    let customer_id: CustomerId = parse_id(customer_id)?;
    let order = body.into_new_order(customer_id)?;
    tracing::debug!(actor = %admin.key(), %customer_id, "creating order on behalf of customer");

    Ok(Json(state.orders().create(order).await?))
}

async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<OrderWithItems>> {
    let id: OrderId = parse_id(id)?;
    let (patch, items) = body.into_parts()?;

    Ok(Json(
        state
            .orders()
            .update(id, patch, items, actor_id(&admin)?)
            .await?,
    ))
}

async fn finish(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Order>> {
    transition(&state, &admin, id, OrderStatus::Finished).await
}

async fn cancel(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Order>> {
    transition(&state, &admin, id, OrderStatus::Cancelled).await
}

async fn transition(
    state: &AppState,
    admin: &Principal,
    id: i64,
    target: OrderStatus,
) -> Result<Json<Order>> {
    let order = state
        .orders()
        .transition(parse_id(id)?, target, actor_id(admin)?)
        .await?;
    Ok(Json(order))
}

async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Order>> {
    let order = state
        .orders()
        .soft_delete(parse_id(id)?, actor_id(&admin)?)
        .await?;
    Ok(Json(order))
}
