use deriche_image::NdImage;

use crate::filter::axis::{apply_coefficients_along_axis_inplace, axis_coefficients, validate_axis};
use crate::filter::error::validate_sigma;
use crate::filter::{DericheCoefficients, FilterError, KernelOrder};
use crate::float::RecursiveFloat;
use crate::parallel::ExecutionStrategy;

/// Smooth an image with a recursive Gaussian along every axis.
///
/// The axes are filtered one after the other, from axis 0 to axis `N - 1`, each
/// pass reading the output of the previous one. The sigma is in physical units
/// and is converted per axis using the spacing of `src`.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `sigma` - The standard deviation of the kernel, in physical units.
/// * `strategy` - How the independent lines of each pass are scheduled.
///
/// # Returns
///
/// The smoothed image, with the shape and spacing of `src`.
///
/// # Errors
///
/// Every axis and the sigma are checked before the first pass runs. See
/// [`filter_along_axis`](crate::filter::axis::filter_along_axis).
///
/// # Example
///
/// ```
/// use deriche_image::NdImage;
/// use deriche_imgproc::filter::gaussian_smooth_recursive;
/// use deriche_imgproc::parallel::ExecutionStrategy;
///
/// let src = NdImage::<f32, 2>::from_shape_val([10, 10], 2.0).unwrap();
/// let dst = gaussian_smooth_recursive(&src, 1.0, ExecutionStrategy::Serial).unwrap();
/// assert!((dst.get([5, 5]).unwrap() - 2.0).abs() < 0.05);
/// ```
pub fn gaussian_smooth_recursive<T: RecursiveFloat, const N: usize>(
    src: &NdImage<T, N>,
    sigma: f64,
    strategy: ExecutionStrategy,
) -> Result<NdImage<T, N>, FilterError> {
    let orders = [KernelOrder::Smoothing; N];
    run_passes(src, sigma, &orders, strategy)
}

/// First derivative of a Gaussian-smoothed image along `axis`.
///
/// The first derivative kernel is applied along `axis` and the smoothing kernel
/// along every other axis. The result is the partial derivative of the smoothed
/// image per sample step along `axis`; divide by the spacing of that axis to get
/// it per physical unit.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] with name `"direction"` if `axis`
/// does not exist, plus the errors of [`gaussian_smooth_recursive`].
pub fn gaussian_derivative_recursive<T: RecursiveFloat, const N: usize>(
    src: &NdImage<T, N>,
    sigma: f64,
    axis: usize,
    strategy: ExecutionStrategy,
) -> Result<NdImage<T, N>, FilterError> {
    validate_axis(src, axis)?;
    let mut orders = [KernelOrder::Smoothing; N];
    orders[axis] = KernelOrder::FirstDerivative;
    run_passes(src, sigma, &orders, strategy)
}

fn run_passes<T: RecursiveFloat, const N: usize>(
    src: &NdImage<T, N>,
    sigma: f64,
    orders: &[KernelOrder; N],
    strategy: ExecutionStrategy,
) -> Result<NdImage<T, N>, FilterError> {
    validate_sigma(sigma)?;
    strategy.validate()?;

    let coeffs = orders
        .iter()
        .enumerate()
        .map(|(axis, &order)| axis_coefficients(src, axis, sigma, order))
        .collect::<Result<Vec<DericheCoefficients<T>>, _>>()?;

    let mut dst = src.clone();
    for (axis, c) in coeffs.iter().enumerate() {
        apply_coefficients_along_axis_inplace(&mut dst, axis, c, strategy)?;
    }
    Ok(dst)
}
