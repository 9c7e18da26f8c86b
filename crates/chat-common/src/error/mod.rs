//! Error taxonomy shared by every crate

mod category;

pub use category::ErrorCategory;
