pub mod field_service;
pub mod portfolio_service;
