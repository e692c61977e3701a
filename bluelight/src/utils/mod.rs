//! Utilities: logging setup and money helpers

pub mod logger;
pub mod money;

pub use logger::{init_logger, init_logger_with_file};
pub use money::{format_currency, human_readable_conjoin, round_down, round_half_up};
