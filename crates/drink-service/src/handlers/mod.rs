//! HTTP request handlers for the drink service.

pub mod drinks;
pub mod health;
pub mod metrics;

pub use drinks::{create_drink, delete_drink, get_drinks_detail, list_drinks, update_drink};
pub use health::{health_check, index};
pub use metrics::metrics_handler;
