//! Domain models for the Cafe Inventory Platform

mod ingredient;
mod purchase_order;
mod report;
mod status;
mod stock;
mod unit;

pub use ingredient::*;
pub use purchase_order::*;
pub use report::*;
pub use status::*;
pub use stock::*;
pub use unit::*;
