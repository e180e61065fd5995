pub mod aggregation;
pub mod allocation;
pub mod error;
pub mod month;
pub mod profitability;
pub mod records;
pub mod report;
pub mod types;

pub use error::{DataFormatError, ProfitabilityError};
pub use month::Month;
pub use types::*;

/// Standard result type for all profitability operations
pub type ProfitabilityResult<T> = Result<T, ProfitabilityError>;
