//! HTTP handlers for the Cafe Inventory Platform

pub mod forecast;
pub mod health;
pub mod ingredient;
pub mod purchase_order;
pub mod reporting;
pub mod stock;
pub mod units;

pub use forecast::*;
pub use health::*;
pub use ingredient::*;
pub use purchase_order::*;
pub use reporting::*;
pub use stock::*;
pub use units::*;
