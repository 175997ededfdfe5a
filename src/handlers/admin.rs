use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::auth::AuthenticatedAdmin;
use crate::domain::order::OrderStatus;
use crate::domain::ports::OrderRepository;
use crate::errors::{AppError, ErrorBody};
use crate::handlers::orders::{ListOrdersParams, ListOrdersResponse, OrderResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `pending`, `accepted`, `rejected`, `ontheway`, `finished`.
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub order_id: Uuid,
    pub status: String,
}

/// GET /admin/orders
///
/// Every order in the marketplace, newest first.
#[utoipa::path(
    get,
    path = "/admin/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 403, description = "Admin role required", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_all_orders<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    admin: AuthenticatedAdmin,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit) = (params.page, params.limit);
    log::debug!("Admin {} listing orders (page {})", admin.0, page);

    let result = web::block(move || service.list_all_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse::from_result(result, &params)))
}

/// GET /admin/orders/{id}
///
/// Any buyer's order together with its items.
#[utoipa::path(
    get,
    path = "/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn get_order_detail<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    _admin: AuthenticatedAdmin,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.order_detail(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /admin/orders/{id}/status
#[utoipa::path(
    put,
    path = "/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 409, description = "Transition not allowed", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_order_status<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    _admin: AuthenticatedAdmin,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let next: OrderStatus = body.status.parse().map_err(AppError::BadRequest)?;

    let status = web::block(move || service.update_order_status(order_id, next))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UpdateStatusResponse {
        order_id,
        status: status.to_string(),
    }))
}
