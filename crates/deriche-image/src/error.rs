/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the product of the shape.
    #[error("Data length ({actual}) does not match the image shape ({expected} elements)")]
    InvalidShape {
        /// Number of elements implied by the shape
        expected: usize,
        /// Number of elements provided
        actual: usize,
    },

    /// Error when a spacing value is not strictly positive and finite.
    #[error("Spacing along axis {0} must be positive and finite, got {1}")]
    InvalidSpacing(usize, f64),

    /// Error when an axis does not exist in the image.
    #[error("Axis {0} is out of bounds for an image with {1} dimensions")]
    AxisOutOfBounds(usize, usize),

    /// Error when an index lies outside the image.
    #[error("Index {0:?} is out of bounds for an image of shape {1:?}")]
    IndexOutOfBounds(Vec<usize>, Vec<usize>),

    /// Error when two images do not share the same shape.
    #[error("Image shapes do not match: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),
}
