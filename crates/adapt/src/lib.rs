pub mod http;
pub mod mql;

pub use mql::{QueryError, StoreError};
