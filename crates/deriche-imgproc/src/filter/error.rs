use deriche_image::ImageError;

use crate::parallel::ParallelError;

/// An error type for the recursive filters.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// A parameter was rejected before any filtering took place.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A derived coefficient is not finite, or the poles are too close to one to
    /// give a usable gain.
    #[error("Coefficient `{name}` is not representable for effective sigma {sigma}")]
    NumericOverflow {
        /// Name of the coefficient
        name: &'static str,
        /// Effective sigma, in samples, that produced it
        sigma: f64,
    },

    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from the execution strategy.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

impl FilterError {
    /// Create an [`FilterError::InvalidParameter`].
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Check that a physical sigma is strictly positive and finite.
pub(crate) fn validate_sigma(sigma: f64) -> Result<(), FilterError> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FilterError::invalid_parameter(
            "sigma",
            format!("must be positive and finite, got {sigma}"),
        ));
    }
    Ok(())
}
