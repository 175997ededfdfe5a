use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::{normalize_page, OrderService, DEFAULT_PAGE_LIMIT};
use crate::auth::AuthenticatedBuyer;
use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderLine, OrderSource, OrderView, PlacedOrder};
use crate::domain::ports::OrderRepository;
use crate::errors::{AppError, ErrorBody, RejectionBody};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: Uuid,
    /// Decimal amount as a string, e.g. "45.00"
    pub total_amount: String,
    pub status: String,
}

impl From<PlacedOrder> for PlaceOrderResponse {
    fn from(order: PlacedOrder) -> Self {
        Self {
            order_id: order.order_id,
            total_amount: order.total_amount.to_string(),
            status: order.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Line total captured at placement time.
    pub price: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub total_amount: String,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id,
            buyer_id: order.buyer_id,
            total_amount: order.total_amount.to_string(),
            status: order.status.to_string(),
            created_at: order.created_at.to_rfc3339(),
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price.to_string(),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 10, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl ListOrdersResponse {
    pub(crate) fn from_result(result: ListResult, params: &ListOrdersParams) -> Self {
        let (page, limit) = normalize_page(params.page, params.limit);
        Self {
            items: result.items.into_iter().map(OrderResponse::from).collect(),
            total: result.total,
            page,
            limit,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// Placement failures always answer with the `{"errors": [...]}` list.
fn placement_error(e: DomainError) -> AppError {
    match e {
        DomainError::InvalidInput(msg) => AppError::Rejected(vec![msg]),
        other => other.into(),
    }
}

/// POST /orders
///
/// Places an order for the listed products. Stock is checked for every line
/// before anything is written; if any line fails, every failure is returned
/// and nothing changes.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = Vec<OrderLineRequest>,
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Order rejected", body = RejectionBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 409, description = "Stock changed concurrently, safe to retry", body = RejectionBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn place_order<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
    body: web::Json<Vec<OrderLineRequest>>,
) -> Result<HttpResponse, AppError> {
    let lines = body
        .into_inner()
        .into_iter()
        .map(|l| OrderLine::new(l.product_id, l.quantity))
        .collect();

    let placed = web::block(move || service.place_order(buyer.0, OrderSource::Lines(lines)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(placement_error)?;

    Ok(HttpResponse::Created().json(PlaceOrderResponse::from(placed)))
}

/// POST /orders/checkout
///
/// Places an order from the buyer's cart and removes the ordered items from
/// the cart in the same transaction.
#[utoipa::path(
    post,
    path = "/orders/checkout",
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Cart empty or order rejected", body = RejectionBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 409, description = "Stock changed concurrently, safe to retry", body = RejectionBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn checkout<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
) -> Result<HttpResponse, AppError> {
    let placed = web::block(move || service.place_order(buyer.0, OrderSource::Cart))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(placement_error)?;

    Ok(HttpResponse::Created().json(PlaceOrderResponse::from(placed)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(buyer.0, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// The buyer's own orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit) = (params.page, params.limit);

    let result = web::block(move || service.list_orders(buyer.0, page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse::from_result(result, &params)))
}
