//! MAST archive-metadata query utilities.

pub mod client;
pub mod products;
pub mod query;

pub use client::{MastClient, MastField, MastResponse};
pub use products::CaomProductList;
pub use query::{JwstCollection, JwstFilteredQuery, QueryResult};
