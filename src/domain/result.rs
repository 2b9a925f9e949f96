//! Result type alias for Cloak

use super::errors::CloakError;

/// Result type alias for Cloak operations
///
/// # Examples
///
/// ```
/// use cloak::domain::result::Result;
/// use cloak::domain::errors::CloakError;
///
/// fn checked_epsilon(epsilon: f64) -> Result<f64> {
///     if epsilon <= 0.0 {
///         return Err(CloakError::InvalidArgument("epsilon must be positive".to_string()));
///     }
///     Ok(epsilon)
/// }
///
/// assert!(checked_epsilon(1.0).is_ok());
/// assert!(checked_epsilon(0.0).is_err());
/// ```
pub type Result<T> = std::result::Result<T, CloakError>;
