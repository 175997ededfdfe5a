use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::errors::{ErrorBody, RejectionBody};
use crate::handlers::{admin, cart, orders};

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::place_order,
        orders::checkout,
        orders::get_order,
        orders::list_orders,
        cart::add_to_cart,
        cart::get_cart,
        cart::update_cart,
        cart::delete_cart_items,
        admin::list_all_orders,
        admin::get_order_detail,
        admin::update_order_status,
    ),
    components(schemas(
        orders::OrderLineRequest,
        orders::PlaceOrderResponse,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::ListOrdersResponse,
        cart::AddToCartRequest,
        cart::CartItemResponse,
        cart::UpdateCartRequest,
        cart::DeleteCartRequest,
        cart::DeleteCartResponse,
        admin::UpdateStatusRequest,
        admin::UpdateStatusResponse,
        ErrorBody,
        RejectionBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "orders", description = "Order placement and history"),
        (name = "cart", description = "Buyer cart"),
        (name = "admin", description = "Order administration"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
