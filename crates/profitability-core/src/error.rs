use thiserror::Error;

/// Structural problems with an input table. Fatal for the dataset they occur in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataFormatError {
    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("Row {row}: month '{value}' is not one of Jan..Dez")]
    UnknownMonth { row: usize, value: String },

    #[error("Row {row}: year '{value}' is not an integer")]
    InvalidYear { row: usize, value: String },

    #[error("Input table has no header row")]
    EmptyTable,
}

#[derive(Debug, Error)]
pub enum ProfitabilityError {
    #[error("Data format error: {0}")]
    DataFormat(#[from] DataFormatError),

    #[error("Invalid input ({field}): {reason}")]
    InvalidInput { field: String, reason: String },
}
