use thiserror::Error;
use uuid::Uuid;

use super::order::{LineFailure, OrderStatus};

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// One or more order lines failed validation; nothing was written.
    #[error("Order rejected: {}", join_failures(.0))]
    Rejected(Vec<LineFailure>),
    /// A validated decrement found less stock than it locked. The attempt is
    /// rolled back and may be retried.
    #[error("Stock for product {0} changed during placement")]
    StockConflict(Uuid),
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_failures(failures: &[LineFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_joins_every_failure() {
        let id = Uuid::nil();
        let err = DomainError::Rejected(vec![
            LineFailure::ProductNotFound(id),
            LineFailure::InsufficientStock {
                product_id: id,
                name: "Teapot".to_string(),
            },
        ]);

        assert_eq!(
            err.to_string(),
            format!(
                "Order rejected: product not found: {}; insufficient stock for product: Teapot",
                id
            )
        );
    }

    #[test]
    fn invalid_transition_display() {
        let err = DomainError::InvalidTransition {
            from: OrderStatus::Finished,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.to_string(), "Cannot move order from finished to pending");
    }
}
