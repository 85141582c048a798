pub mod error_handling;
pub mod metrics;

pub use error_handling::*;
