pub mod analytics_service;
pub mod enrichment_service;
pub mod price_service;
