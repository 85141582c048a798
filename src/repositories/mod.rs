pub mod sop_repo;

pub use sop_repo::*;
