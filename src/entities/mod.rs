//! The three record types and their services.

pub mod member;
pub mod order;
pub mod product;
