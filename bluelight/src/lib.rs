//! Bluelight - offer application engine for e-commerce baskets
//!
//! # Architecture
//!
//! Given a basket and a set of conditional offers, the engine decides which
//! offers apply, in what order and how many times, and tracks the quantity
//! of every basket line each offer group consumed so nothing is discounted
//! twice within a group.
//!
//! # Modules
//!
//! ```text
//! bluelight/src/
//! ├── basket/     # Basket, lines, line offer consumer, price breakdown
//! ├── offer/      # Proxy resolution, conditions, benefits, groups, applicator
//! ├── voucher/    # Voucher store and availability rules
//! ├── pricing/    # Cosmetic price cache
//! ├── scenario.rs # JSON scenarios and reports
//! ├── core/       # Configuration
//! └── utils/      # Logging and money helpers
//! ```

pub mod basket;
pub mod core;
pub mod offer;
pub mod pricing;
pub mod scenario;
pub mod utils;
pub mod voucher;

#[cfg(test)]
mod test_support;

// Re-export public types
pub use basket::{Basket, Line};
pub use crate::core::Config;
pub use offer::{Applicator, OfferCatalog, PreparedOffer};
pub use pricing::CosmeticPriceCache;
pub use scenario::{Scenario, ScenarioError, ScenarioReport};
pub use voucher::VoucherStore;

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and install the logger
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.is_production()),
        config.log_dir.as_deref(),
    );
    config
}
