//! Pure business logic, kept free of persistence so the invariants are
//! unit-testable: cart totals, alert evaluation, health scoring, order
//! numbering and demand projection.

pub mod alerts;
pub mod cart;
pub mod demand;
pub mod health;
pub mod order_number;
