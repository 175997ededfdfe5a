use std::collections::{BTreeSet, HashMap};

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    CartItemView, LineFailure, ListResult, OrderLine, OrderSource, OrderStatus, OrderView,
    PlacedOrder, StockUpdate,
};
use crate::domain::ports::{OrderRepository, UnitOfWork};

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;
/// Highest page whose offset still fits an `i64` at the largest limit.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_LIMIT;

pub struct OrderService<R> {
    repo: R,
}

/// A validated line priced from the locked product row.
#[derive(Debug)]
struct PricedLine {
    product_id: Uuid,
    quantity: i32,
    line_total: BigDecimal,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Places an order for `buyer_id` as one all-or-nothing transaction.
    ///
    /// Every line is checked before anything is written. If any line fails,
    /// the call returns [`DomainError::Rejected`] with all failures and the
    /// datastore is left untouched. Otherwise the order, its items, the stock
    /// decrements and (for cart checkouts) the cart cleanup commit together.
    pub fn place_order(
        &self,
        buyer_id: Uuid,
        source: OrderSource,
    ) -> Result<PlacedOrder, DomainError> {
        if let OrderSource::Lines(lines) = &source {
            if lines.is_empty() {
                return Err(DomainError::InvalidInput(
                    "no products selected for the order".to_string(),
                ));
            }
        }
        let from_cart = matches!(source, OrderSource::Cart);

        let result = self.repo.in_transaction(|uow| {
            let requested = match source {
                OrderSource::Lines(lines) => lines,
                OrderSource::Cart => uow.cart_lines_for_update(buyer_id)?,
            };
            if requested.is_empty() {
                return Err(DomainError::InvalidInput("cart is empty".to_string()));
            }

            let priced = validate_lines(uow, requested)?;
            let total_amount = priced
                .iter()
                .fold(BigDecimal::from(0), |acc, line| acc + &line.line_total);

            let order_id = uow.create_order(buyer_id, &total_amount, OrderStatus::Pending)?;
            for line in &priced {
                uow.create_order_item(order_id, line.product_id, line.quantity, &line.line_total)?;
            }
            for line in &priced {
                if uow.decrement_stock(line.product_id, line.quantity)? == StockUpdate::Insufficient
                {
                    return Err(DomainError::StockConflict(line.product_id));
                }
            }
            if from_cart {
                let product_ids: Vec<Uuid> = priced.iter().map(|l| l.product_id).collect();
                uow.clear_cart_items(buyer_id, &product_ids)?;
            }

            Ok(PlacedOrder {
                order_id,
                total_amount,
                status: OrderStatus::Pending,
            })
        });

        match &result {
            Ok(order) => log::info!(
                "Placed order {} for buyer {} (total {}, from cart: {})",
                order.order_id,
                buyer_id,
                order.total_amount,
                from_cart
            ),
            Err(DomainError::Rejected(failures)) => log::warn!(
                "Rejected order for buyer {}: {} failing line(s)",
                buyer_id,
                failures.len()
            ),
            Err(DomainError::StockConflict(product_id)) => log::error!(
                "Stock for product {} fell below a validated quantity; order for buyer {} rolled back",
                product_id,
                buyer_id
            ),
            Err(e) => log::warn!("Order placement for buyer {} failed: {}", buyer_id, e),
        }
        result
    }

    pub fn add_to_cart(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput(
                "quantity must be greater than 0".to_string(),
            ));
        }
        self.repo.in_transaction(|uow| {
            if !uow.product_exists(product_id)? {
                return Err(DomainError::NotFound);
            }
            uow.add_cart_item(buyer_id, product_id, quantity)
        })
    }

    pub fn cart(&self, buyer_id: Uuid) -> Result<Vec<CartItemView>, DomainError> {
        self.repo.cart_items(buyer_id)
    }

    /// Sets the quantity of a cart item. Items outside the buyer's own cart
    /// are reported as missing.
    pub fn update_cart_item(
        &self,
        buyer_id: Uuid,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemView, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidInput(
                "quantity must be greater than 0".to_string(),
            ));
        }
        self.repo.in_transaction(|uow| {
            uow.set_cart_item_quantity(buyer_id, cart_item_id, quantity)?
                .ok_or(DomainError::NotFound)
        })
    }

    pub fn remove_cart_items(
        &self,
        buyer_id: Uuid,
        cart_item_ids: Vec<Uuid>,
    ) -> Result<usize, DomainError> {
        if cart_item_ids.is_empty() {
            return Err(DomainError::InvalidInput(
                "no cart items selected".to_string(),
            ));
        }
        let removed = self
            .repo
            .in_transaction(|uow| uow.delete_cart_items(buyer_id, &cart_item_ids))?;
        log::debug!("Removed {} item(s) from cart of buyer {}", removed, buyer_id);
        Ok(removed)
    }

    /// Fetches one of the buyer's orders. Orders owned by someone else are
    /// reported as missing.
    pub fn get_order(&self, buyer_id: Uuid, order_id: Uuid) -> Result<OrderView, DomainError> {
        match self.repo.find_order(order_id)? {
            Some(order) if order.buyer_id == buyer_id => Ok(order),
            _ => Err(DomainError::NotFound),
        }
    }

    /// Any order with its items, for administrators.
    pub fn order_detail(&self, order_id: Uuid) -> Result<OrderView, DomainError> {
        self.repo.find_order(order_id)?.ok_or(DomainError::NotFound)
    }

    pub fn list_orders(
        &self,
        buyer_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let (page, limit) = normalize_page(page, limit);
        self.repo.list_orders(Some(buyer_id), page, limit)
    }

    pub fn list_all_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let (page, limit) = normalize_page(page, limit);
        self.repo.list_orders(None, page, limit)
    }

    pub fn update_order_status(
        &self,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderStatus, DomainError> {
        self.repo.in_transaction(|uow| {
            let current = uow
                .order_status_for_update(order_id)?
                .ok_or(DomainError::NotFound)?;
            if !current.can_transition_to(next) {
                return Err(DomainError::InvalidTransition {
                    from: current,
                    to: next,
                });
            }
            uow.set_order_status(order_id, next)?;
            log::info!("Order {} moved from {} to {}", order_id, current, next);
            Ok(next)
        })
    }
}

pub fn normalize_page(page: i64, limit: i64) -> (i64, i64) {
    (page.clamp(1, MAX_PAGE), limit.clamp(1, MAX_PAGE_LIMIT))
}

/// Checks every requested line against locked product rows and prices the
/// ones that pass. Failures are collected for all lines and returned together,
/// in the order the lines were requested.
fn validate_lines(
    uow: &mut dyn UnitOfWork,
    requested: Vec<OrderLine>,
) -> Result<Vec<PricedLine>, DomainError> {
    let mut failures: Vec<(usize, LineFailure)> = Vec::new();
    let mut lines: Vec<(usize, OrderLine)> = Vec::new();

    // Repeated products are merged so stock is checked against the combined
    // quantity.
    for (position, line) in requested.into_iter().enumerate() {
        if line.quantity <= 0 {
            failures.push((
                position,
                LineFailure::InvalidQuantity {
                    product_id: line.product_id,
                    quantity: line.quantity,
                },
            ));
            continue;
        }
        match lines.iter_mut().find(|(_, l)| l.product_id == line.product_id) {
            Some((_, existing)) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity)
            }
            None => lines.push((position, line)),
        }
    }

    // Ascending id order keeps two overlapping orders from deadlocking.
    let ids: BTreeSet<Uuid> = lines.iter().map(|(_, l)| l.product_id).collect();
    let mut products = HashMap::with_capacity(ids.len());
    for id in ids {
        if let Some(product) = uow.product_for_update(id)? {
            products.insert(id, product);
        }
    }

    let mut priced = Vec::with_capacity(lines.len());
    for (position, line) in lines {
        match products.get(&line.product_id) {
            None => failures.push((position, LineFailure::ProductNotFound(line.product_id))),
            Some(product) if product.stock < line.quantity => failures.push((
                position,
                LineFailure::InsufficientStock {
                    product_id: product.id,
                    name: product.name.clone(),
                },
            )),
            Some(product) => priced.push(PricedLine {
                product_id: line.product_id,
                quantity: line.quantity,
                line_total: &product.price * &BigDecimal::from(line.quantity),
            }),
        }
    }

    if !failures.is_empty() {
        failures.sort_by_key(|(position, _)| *position);
        return Err(DomainError::Rejected(
            failures.into_iter().map(|(_, failure)| failure).collect(),
        ));
    }
    Ok(priced)
}
