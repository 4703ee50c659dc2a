//! Storefront API: a REST backend for a product catalog, per-user carts, and
//! transactional order placement over PostgreSQL.
//!
//! Order placement is the consistency-critical path: it converts a cart into
//! a durable order in one transaction, validating stock under row locks so
//! that concurrent checkouts can never drive inventory negative. Everything
//! else is plain CRUD around it.

pub mod config;
pub mod errors;
pub mod models;
pub mod seed;
pub mod services;
pub mod state;
pub mod web;
