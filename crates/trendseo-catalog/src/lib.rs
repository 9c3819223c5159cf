//! Read-only access to the store catalog: products flagged for keyword work.

pub mod client;
pub mod error;
pub mod types;

mod rate_limit;

pub use client::{store_host, CatalogClient, CatalogSettings};
pub use error::CatalogError;
pub use types::{distinct_vendors, CatalogProduct};
