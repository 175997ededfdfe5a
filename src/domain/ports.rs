use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{
    CartItemView, ListResult, OrderLine, OrderStatus, OrderView, ProductSnapshot, StockUpdate,
};

/// Data access available inside a single datastore transaction.
///
/// Every call made through one `UnitOfWork` becomes visible together when the
/// surrounding [`OrderRepository::in_transaction`] commits, or not at all.
/// Row locks taken by the `*_for_update` calls are held until then.
pub trait UnitOfWork {
    /// The buyer's cart contents in insertion order, locked against a
    /// concurrent checkout of the same cart.
    fn cart_lines_for_update(&mut self, buyer_id: Uuid) -> Result<Vec<OrderLine>, DomainError>;

    /// Reads a product and holds an exclusive lock on its row.
    fn product_for_update(&mut self, id: Uuid) -> Result<Option<ProductSnapshot>, DomainError>;

    fn create_order(
        &mut self,
        buyer_id: Uuid,
        total_amount: &BigDecimal,
        status: OrderStatus,
    ) -> Result<Uuid, DomainError>;

    fn create_order_item(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: &BigDecimal,
    ) -> Result<(), DomainError>;

    /// Lowers stock by `quantity` only if at least that much is left.
    fn decrement_stock(&mut self, id: Uuid, quantity: i32) -> Result<StockUpdate, DomainError>;

    fn clear_cart_items(&mut self, buyer_id: Uuid, product_ids: &[Uuid])
        -> Result<(), DomainError>;

    fn product_exists(&mut self, id: Uuid) -> Result<bool, DomainError>;

    /// Adds `quantity` of a product to the buyer's cart, creating the cart on
    /// first use. An existing entry for the product is incremented.
    fn add_cart_item(
        &mut self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError>;

    /// Sets the quantity of one of the buyer's cart items. `None` when the
    /// item does not exist or sits in another buyer's cart.
    fn set_cart_item_quantity(
        &mut self,
        buyer_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemView>, DomainError>;

    /// Removes the listed items from the buyer's own cart and returns how many
    /// were deleted. Ids belonging to other carts are ignored.
    fn delete_cart_items(
        &mut self,
        buyer_id: Uuid,
        cart_item_ids: &[Uuid],
    ) -> Result<usize, DomainError>;

    fn order_status_for_update(&mut self, order_id: Uuid)
        -> Result<Option<OrderStatus>, DomainError>;

    fn set_order_status(&mut self, order_id: Uuid, status: OrderStatus)
        -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Runs `work` in one transaction: committed when it returns `Ok`, rolled
    /// back with every effect discarded otherwise.
    fn in_transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, DomainError>;

    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;

    /// Orders newest first, without items. `buyer_id = None` lists every buyer.
    fn list_orders(
        &self,
        buyer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError>;

    fn cart_items(&self, buyer_id: Uuid) -> Result<Vec<CartItemView>, DomainError>;
}
