pub mod record;
pub mod setting;

pub use record::{lookup, Record};
pub use setting::Settings;
