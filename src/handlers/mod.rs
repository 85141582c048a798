pub mod sop;
pub mod validation;
