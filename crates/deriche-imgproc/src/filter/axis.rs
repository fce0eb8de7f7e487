use deriche_image::NdImage;

use crate::filter::error::validate_sigma;
use crate::filter::recursive::recursive_filter_line;
use crate::filter::{DericheCoefficients, FilterError, KernelOrder};
use crate::float::RecursiveFloat;
use crate::parallel::{map_with_strategy, ExecutionStrategy};

/// Minimum number of samples along the filtered axis.
///
/// The recursion reads four samples of history; shorter axes are rejected.
pub const MIN_LINE_LENGTH: usize = 4;

/// Filter every line of `src` parallel to `axis` and write the result to `dst`.
///
/// The sigma is given in physical units. It is divided by the spacing of `src`
/// along `axis` to obtain the effective sigma in samples, so anisotropic images
/// are smoothed by the same physical amount along every axis.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, with the same shape as `src`.
/// * `axis` - The axis to filter along.
/// * `sigma` - The standard deviation of the kernel, in physical units.
/// * `order` - The kernel to approximate.
/// * `strategy` - How the independent lines are scheduled.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if the axis does not exist, the sigma
/// is not strictly positive and finite, or the image has fewer than
/// [`MIN_LINE_LENGTH`] samples along `axis`. All checks run before `dst` is
/// touched, so a failed call leaves it unmodified.
///
/// # Example
///
/// ```
/// use deriche_image::NdImage;
/// use deriche_imgproc::filter::{axis::filter_along_axis, KernelOrder};
/// use deriche_imgproc::parallel::ExecutionStrategy;
///
/// let src = NdImage::<f32, 2>::from_shape_val([8, 8], 1.0).unwrap();
/// let mut dst = src.filled_like(0.0);
/// filter_along_axis(&src, &mut dst, 1, 1.0, KernelOrder::Smoothing, ExecutionStrategy::Serial)
///     .unwrap();
/// assert!(dst.as_slice().iter().all(|v| v.is_finite()));
/// ```
pub fn filter_along_axis<T: RecursiveFloat, const N: usize>(
    src: &NdImage<T, N>,
    dst: &mut NdImage<T, N>,
    axis: usize,
    sigma: f64,
    order: KernelOrder,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    let coeffs = axis_coefficients(src, axis, sigma, order)?;
    apply_coefficients_along_axis(src, dst, axis, &coeffs, strategy)
}

/// Filter every line of `image` parallel to `axis`, in place.
///
/// See [`filter_along_axis`] for the arguments and errors. On error the image
/// is left unmodified.
pub fn filter_along_axis_inplace<T: RecursiveFloat, const N: usize>(
    image: &mut NdImage<T, N>,
    axis: usize,
    sigma: f64,
    order: KernelOrder,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    let coeffs = axis_coefficients(image, axis, sigma, order)?;
    apply_coefficients_along_axis_inplace(image, axis, &coeffs, strategy)
}

/// Compute the coefficients for filtering `image` along `axis` with a physical `sigma`.
///
/// # Errors
///
/// Same as [`filter_along_axis`].
pub fn axis_coefficients<T: RecursiveFloat, const N: usize>(
    image: &NdImage<T, N>,
    axis: usize,
    sigma: f64,
    order: KernelOrder,
) -> Result<DericheCoefficients<T>, FilterError> {
    validate_sigma(sigma)?;
    let spacing = validate_axis(image, axis)?;
    DericheCoefficients::new(T::from_f64_c(sigma / spacing), order)
}

/// Filter every line of `src` parallel to `axis` with precomputed coefficients.
///
/// The coefficients are shared read-only by all lines. The lines are filtered
/// into scratch buffers first and only written to `dst` once all of them are done.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameter`] if the axis does not exist or is
/// shorter than [`MIN_LINE_LENGTH`], and [`FilterError::Image`] if the shapes of
/// `src` and `dst` differ.
pub fn apply_coefficients_along_axis<T: RecursiveFloat, const N: usize>(
    src: &NdImage<T, N>,
    dst: &mut NdImage<T, N>,
    axis: usize,
    coeffs: &DericheCoefficients<T>,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    validate_axis(src, axis)?;
    src.check_same_shape(dst)?;
    let lines = filter_lines(src, axis, coeffs, strategy)?;
    commit_lines(dst, axis, lines);
    Ok(())
}

/// In-place counterpart of [`apply_coefficients_along_axis`].
pub fn apply_coefficients_along_axis_inplace<T: RecursiveFloat, const N: usize>(
    image: &mut NdImage<T, N>,
    axis: usize,
    coeffs: &DericheCoefficients<T>,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    validate_axis(image, axis)?;
    let lines = filter_lines(image, axis, coeffs, strategy)?;
    commit_lines(image, axis, lines);
    Ok(())
}

/// Check the axis exists and is long enough, and return its spacing.
pub(crate) fn validate_axis<T, const N: usize>(
    image: &NdImage<T, N>,
    axis: usize,
) -> Result<f64, FilterError> {
    if axis >= N {
        return Err(FilterError::invalid_parameter(
            "direction",
            format!("axis {axis} is out of range for a {N}-dimensional image"),
        ));
    }

    let extent = image.extent(axis)?;
    if extent < MIN_LINE_LENGTH {
        return Err(FilterError::invalid_parameter(
            "direction",
            format!(
                "axis {axis} has {extent} samples, at least {MIN_LINE_LENGTH} are required"
            ),
        ));
    }

    Ok(image.axis_spacing(axis)?)
}

struct FilteredLine<T> {
    start: usize,
    samples: Vec<T>,
}

fn filter_lines<T: RecursiveFloat, const N: usize>(
    src: &NdImage<T, N>,
    axis: usize,
    coeffs: &DericheCoefficients<T>,
    strategy: ExecutionStrategy,
) -> Result<Vec<FilteredLine<T>>, FilterError> {
    let extent = src.extent(axis)?;
    let stride = src.strides()[axis];
    let starts = src.line_offsets(axis)?;
    let data = src.as_slice();

    log::debug!(
        "recursive filter along axis {} with effective sigma {:?}: {} lines of {} samples ({:?})",
        axis,
        coeffs.sigma(),
        starts.len(),
        extent,
        strategy
    );

    let lines = map_with_strategy(&starts, strategy, |&start| {
        let line = data
            .iter()
            .skip(start)
            .step_by(stride)
            .take(extent)
            .copied()
            .collect::<Vec<_>>();
        FilteredLine {
            start,
            samples: recursive_filter_line(&line, coeffs),
        }
    })?;

    Ok(lines)
}

fn commit_lines<T: RecursiveFloat, const N: usize>(
    dst: &mut NdImage<T, N>,
    axis: usize,
    lines: Vec<FilteredLine<T>>,
) {
    let stride = dst.strides()[axis];
    let data = dst.as_slice_mut();
    for line in lines {
        data.iter_mut()
            .skip(line.start)
            .step_by(stride)
            .zip(line.samples)
            .for_each(|(dst, v)| *dst = v);
    }
}
