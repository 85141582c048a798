pub mod audit;
pub mod compliance;
pub mod sop;
pub mod validation;
