use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    page_offset, CartItemView, ListResult, OrderItemView, OrderLine, OrderStatus, OrderView,
    ProductSnapshot, StockUpdate,
};
use crate::domain::ports::{OrderRepository, UnitOfWork};

/// Write that can be made to fail on the next transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    CreateOrder,
    CreateOrderItem,
    DecrementStock,
    ClearCartItems,
    /// `decrement_stock` reports too little stock instead of applying.
    StockShortfall,
}

#[derive(Debug, Clone)]
struct ProductRecord {
    name: String,
    price: BigDecimal,
    stock: i32,
}

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<Uuid, ProductRecord>,
    carts: HashMap<Uuid, Vec<CartItemView>>,
    orders: Vec<OrderView>,
}

/// Repository held entirely in memory.
///
/// Transactions run one at a time against a private copy of the state that
/// replaces the shared state only on success, so rollback is simply dropping
/// the copy.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<Mutex<State>>,
    fail_point: Arc<Mutex<Option<FailPoint>>>,
}

fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::Internal("in-memory store lock poisoned".to_string())
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(
        &self,
        name: &str,
        price: BigDecimal,
        stock: i32,
    ) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        self.state.lock().map_err(poisoned)?.products.insert(
            id,
            ProductRecord {
                name: name.to_string(),
                price,
                stock,
            },
        );
        Ok(id)
    }

    pub fn set_price(&self, id: Uuid, price: BigDecimal) -> Result<(), DomainError> {
        let mut state = self.state.lock().map_err(poisoned)?;
        let product = state.products.get_mut(&id).ok_or(DomainError::NotFound)?;
        product.price = price;
        Ok(())
    }

    pub fn stock(&self, id: Uuid) -> Result<Option<i32>, DomainError> {
        let state = self.state.lock().map_err(poisoned)?;
        Ok(state.products.get(&id).map(|p| p.stock))
    }

    pub fn order_count(&self) -> Result<usize, DomainError> {
        Ok(self.state.lock().map_err(poisoned)?.orders.len())
    }

    /// Arms a failure for the next transaction only.
    pub fn fail_on(&self, point: FailPoint) -> Result<(), DomainError> {
        *self.fail_point.lock().map_err(poisoned)? = Some(point);
        Ok(())
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn in_transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, DomainError>,
    {
        let mut committed = self.state.lock().map_err(poisoned)?;
        let fail_point = self.fail_point.lock().map_err(poisoned)?.take();

        let mut uow = MemoryUnitOfWork {
            state: committed.clone(),
            fail_point,
        };
        let value = work(&mut uow)?;
        *committed = uow.state;
        Ok(value)
    }

    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let state = self.state.lock().map_err(poisoned)?;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    fn list_orders(
        &self,
        buyer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let state = self.state.lock().map_err(poisoned)?;
        let matching: Vec<&OrderView> = state
            .orders
            .iter()
            .rev()
            .filter(|o| buyer_id.map_or(true, |b| o.buyer_id == b))
            .collect();

        let offset = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        Ok(ListResult {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(offset)
                .take(limit.max(0) as usize)
                .map(|o| OrderView {
                    items: vec![],
                    ..o.clone()
                })
                .collect(),
        })
    }

    fn cart_items(&self, buyer_id: Uuid) -> Result<Vec<CartItemView>, DomainError> {
        let state = self.state.lock().map_err(poisoned)?;
        Ok(state.carts.get(&buyer_id).cloned().unwrap_or_default())
    }
}

struct MemoryUnitOfWork {
    state: State,
    fail_point: Option<FailPoint>,
}

impl MemoryUnitOfWork {
    fn check(&self, point: FailPoint) -> Result<(), DomainError> {
        if self.fail_point == Some(point) {
            return Err(DomainError::Internal(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    fn cart_lines_for_update(&mut self, buyer_id: Uuid) -> Result<Vec<OrderLine>, DomainError> {
        Ok(self
            .state
            .carts
            .get(&buyer_id)
            .map(|items| {
                items
                    .iter()
                    .map(|i| OrderLine::new(i.product_id, i.quantity))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn product_for_update(&mut self, id: Uuid) -> Result<Option<ProductSnapshot>, DomainError> {
        Ok(self.state.products.get(&id).map(|p| ProductSnapshot {
            id,
            name: p.name.clone(),
            price: p.price.clone(),
            stock: p.stock,
        }))
    }

    fn create_order(
        &mut self,
        buyer_id: Uuid,
        total_amount: &BigDecimal,
        status: OrderStatus,
    ) -> Result<Uuid, DomainError> {
        self.check(FailPoint::CreateOrder)?;
        let id = Uuid::new_v4();
        self.state.orders.push(OrderView {
            id,
            buyer_id,
            total_amount: total_amount.clone(),
            status,
            created_at: Utc::now(),
            items: vec![],
        });
        Ok(id)
    }

    fn create_order_item(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price: &BigDecimal,
    ) -> Result<(), DomainError> {
        self.check(FailPoint::CreateOrderItem)?;
        let order = self
            .state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| DomainError::Internal(format!("order {} does not exist", order_id)))?;
        order.items.push(OrderItemView {
            id: Uuid::new_v4(),
            product_id,
            quantity,
            price: price.clone(),
        });
        Ok(())
    }

    fn decrement_stock(&mut self, id: Uuid, quantity: i32) -> Result<StockUpdate, DomainError> {
        self.check(FailPoint::DecrementStock)?;
        if self.fail_point == Some(FailPoint::StockShortfall) {
            return Ok(StockUpdate::Insufficient);
        }
        match self.state.products.get_mut(&id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                Ok(StockUpdate::Applied)
            }
            _ => Ok(StockUpdate::Insufficient),
        }
    }

    fn clear_cart_items(
        &mut self,
        buyer_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<(), DomainError> {
        self.check(FailPoint::ClearCartItems)?;
        if let Some(items) = self.state.carts.get_mut(&buyer_id) {
            items.retain(|i| !product_ids.contains(&i.product_id));
        }
        Ok(())
    }

    fn product_exists(&mut self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.state.products.contains_key(&id))
    }

    fn add_cart_item(
        &mut self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError> {
        let items = self.state.carts.entry(buyer_id).or_default();
        if let Some(existing) = items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity += quantity;
            return Ok(existing.clone());
        }
        let item = CartItemView {
            id: Uuid::new_v4(),
            product_id,
            quantity,
        };
        items.push(item.clone());
        Ok(item)
    }

    fn set_cart_item_quantity(
        &mut self,
        buyer_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemView>, DomainError> {
        let item = self
            .state
            .carts
            .get_mut(&buyer_id)
            .and_then(|items| items.iter_mut().find(|i| i.id == cart_item_id));

        Ok(item.map(|item| {
            item.quantity = quantity;
            item.clone()
        }))
    }

    fn delete_cart_items(
        &mut self,
        buyer_id: Uuid,
        cart_item_ids: &[Uuid],
    ) -> Result<usize, DomainError> {
        let Some(items) = self.state.carts.get_mut(&buyer_id) else {
            return Ok(0);
        };
        let before = items.len();
        items.retain(|i| !cart_item_ids.contains(&i.id));
        Ok(before - items.len())
    }

    fn order_status_for_update(
        &mut self,
        order_id: Uuid,
    ) -> Result<Option<OrderStatus>, DomainError> {
        Ok(self
            .state
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.status))
    }

    fn set_order_status(&mut self, order_id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let order = self
            .state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(DomainError::NotFound)?;
        order.status = status;
        Ok(())
    }
}
