pub mod admin;
pub mod cart;
pub mod orders;

use actix_web::web;

use crate::domain::ports::OrderRepository;
use crate::errors::AppError;

/// Registers every route against an `OrderService<R>` held in app data.
pub fn configure<R: OrderRepository>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid input: {}", err)).into()
    }))
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::place_order::<R>))
            .route("", web::get().to(orders::list_orders::<R>))
            .route("/checkout", web::post().to(orders::checkout::<R>))
            .route("/{id}", web::get().to(orders::get_order::<R>)),
    )
    .service(
        web::resource("/cart")
            .route(web::post().to(cart::add_to_cart::<R>))
            .route(web::get().to(cart::get_cart::<R>))
            .route(web::put().to(cart::update_cart::<R>))
            .route(web::delete().to(cart::delete_cart_items::<R>)),
    )
    .service(
        web::scope("/admin/orders")
            .route("", web::get().to(admin::list_all_orders::<R>))
            .route("/{id}", web::get().to(admin::get_order_detail::<R>))
            .route("/{id}/status", web::put().to(admin::update_order_status::<R>)),
    );
}
