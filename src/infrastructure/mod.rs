//! Infrastructure layer - Store adapters, services and observability

pub mod book;
pub mod database;
pub mod in_memory;
pub mod loan;
pub mod logging;
pub mod observability;
pub mod user;
