pub mod analytics;
pub mod holding;
pub mod price;
