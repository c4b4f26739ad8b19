//! Database-backed operations behind the HTTP handlers and the CLI.
//!
//! Every function takes a connection, loads models, delegates the financial
//! logic to the `compute` crate and persists the outcome. Operations touching
//! several rows run inside one database transaction.

pub mod categories;
pub mod error;
pub mod loans;
pub mod overview;
pub mod pending;
pub mod planned;
pub mod transactions;
pub mod transfers;

pub use error::{ServiceError, ServiceResult};
