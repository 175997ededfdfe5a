use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::auth::AuthenticatedBuyer;
use crate::domain::order::CartItemView;
use crate::domain::ports::OrderRepository;
use crate::errors::{AppError, ErrorBody};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<CartItemView> for CartItemResponse {
    fn from(item: CartItemView) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// POST /cart
///
/// Adds a product to the buyer's cart. Adding a product that is already in
/// the cart increases its quantity.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Cart item after the update", body = CartItemResponse),
        (status = 400, description = "Invalid quantity", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn add_to_cart<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let item = web::block(move || service.add_to_cart(buyer.0, body.product_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartItemResponse::from(item)))
}

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Items in the buyer's cart", body = Vec<CartItemResponse>),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn get_cart<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
) -> Result<HttpResponse, AppError> {
    let items = web::block(move || service.cart(buyer.0))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<CartItemResponse> = items.into_iter().map(CartItemResponse::from).collect();
    Ok(HttpResponse::Ok().json(items))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub cart_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteCartRequest {
    pub cart_item_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteCartResponse {
    /// Number of items removed from the buyer's cart.
    pub deleted: usize,
}

/// PUT /cart
///
/// Sets the quantity of one item in the buyer's cart.
#[utoipa::path(
    put,
    path = "/cart",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Cart item after the update", body = CartItemResponse),
        (status = 400, description = "Invalid quantity", body = ErrorBody),
        (status = 404, description = "No such item in the buyer's cart", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn update_cart<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
    body: web::Json<UpdateCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let item = web::block(move || {
        service.update_cart_item(buyer.0, body.cart_item_id, body.quantity)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartItemResponse::from(item)))
}

/// DELETE /cart
///
/// Removes the listed items from the buyer's cart. Ids from other carts are
/// ignored.
#[utoipa::path(
    delete,
    path = "/cart",
    request_body = DeleteCartRequest,
    responses(
        (status = 200, description = "Items removed", body = DeleteCartResponse),
        (status = 400, description = "No cart items selected", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn delete_cart_items<R: OrderRepository>(
    service: web::Data<OrderService<R>>,
    buyer: AuthenticatedBuyer,
    body: web::Json<DeleteCartRequest>,
) -> Result<HttpResponse, AppError> {
    let ids = body.into_inner().cart_item_ids;

    let deleted = web::block(move || service.remove_cart_items(buyer.0, ids))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DeleteCartResponse { deleted }))
}
