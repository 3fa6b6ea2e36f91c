/// Errors raised when process data is evaluated outside its domain
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericDomainError {
    /// `c / T` is undefined at zero temperature
    #[error("Temperature must be non-zero when c = {c}")]
    ZeroTemperature {
        /// Exponent coefficient of the expression
        c: f64,
    },

    /// Evaluation produced infinity or NaN
    #[error("Evaluation at {input} is not finite")]
    NonFinite {
        /// The offending input value
        input: f64,
    },

    /// Interpolation requested outside the tabulated abscissae
    #[error("{x} is outside the tabulated range [{min}, {max}]")]
    OutOfRange {
        /// Requested abscissa
        x: f64,
        /// First tabulated abscissa
        min: f64,
        /// Last tabulated abscissa
        max: f64,
    },

    /// Abscissae do not strictly increase at the given row
    #[error("Abscissae must strictly increase, row {row} does not")]
    NotIncreasing {
        /// Index of the offending row
        row: usize,
    },

    /// The table has no rows
    #[error("Lookup table is empty")]
    EmptyTable,
}
