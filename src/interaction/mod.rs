pub mod filter;
pub mod validation;
pub mod views;
