pub mod app;
pub mod error;
pub mod search;

pub use app::{build_app, AppOptions, AppState};
pub use error::HttpError;
