//! Business logic services for the Cafe Inventory Platform

pub mod ingredient;
pub mod purchase_order;
pub mod reporting;
pub mod stock;

pub use ingredient::IngredientService;
pub use purchase_order::PurchaseOrderService;
pub use reporting::ReportingService;
pub use stock::StockService;
