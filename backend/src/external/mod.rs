//! External API integrations

pub mod forecasting;

pub use forecasting::ForecastClient;
