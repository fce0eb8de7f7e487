use deriche_image::NdImage;

use crate::filter::axis::{apply_coefficients_along_axis, validate_axis};
use crate::filter::error::validate_sigma;
use crate::filter::{DericheCoefficients, ExponentialSeries, FilterError, KernelOrder};
use crate::float::RecursiveFloat;
use crate::parallel::ExecutionStrategy;

/// Parameters of a [`RecursiveGaussianFilter`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecursiveGaussianConfig {
    /// Standard deviation of the kernel, in physical units.
    pub sigma: f64,
    /// Axis along which the filter is applied.
    pub direction: usize,
    /// Kernel to approximate.
    pub order: KernelOrder,
    /// How the independent lines are scheduled.
    pub strategy: ExecutionStrategy,
    /// Exponential series replacing the published fit of `order`. The symmetry
    /// still follows `order`.
    pub series: Option<ExponentialSeries>,
}

impl Default for RecursiveGaussianConfig {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            direction: 0,
            order: KernelOrder::Smoothing,
            strategy: ExecutionStrategy::Parallel,
            series: None,
        }
    }
}

#[derive(Clone, Debug)]
struct CachedCoefficients<T> {
    order: KernelOrder,
    series: ExponentialSeries,
    coeffs: DericheCoefficients<T>,
}

/// Recursive Gaussian filter along one axis of an N-dimensional image.
///
/// The filter holds a [`RecursiveGaussianConfig`] and the coefficients computed
/// for its last run. Coefficients are computed lazily by [`execute`] and reused
/// as long as the effective sigma, the kernel order and the series are unchanged.
/// Changing the sigma, the direction, the order or the series drops them.
///
/// [`execute`]: RecursiveGaussianFilter::execute
///
/// # Example
///
/// ```
/// use deriche_image::NdImage;
/// use deriche_imgproc::filter::RecursiveGaussianFilter;
///
/// let mut src = NdImage::<f32, 2>::from_shape_val([16, 16], 0.0).unwrap();
/// src.set([8, 8], 1.0).unwrap();
///
/// let mut filter = RecursiveGaussianFilter::smoothing(2.0, 1);
/// let dst = filter.execute(&src).unwrap();
///
/// assert_eq!(dst.shape(), src.shape());
/// assert!(*dst.get([8, 8]).unwrap() < 1.0);
/// assert!(*dst.get([8, 9]).unwrap() > 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct RecursiveGaussianFilter<T> {
    config: RecursiveGaussianConfig,
    cache: Option<CachedCoefficients<T>>,
}

impl<T: RecursiveFloat> Default for RecursiveGaussianFilter<T> {
    fn default() -> Self {
        Self::new(RecursiveGaussianConfig::default())
    }
}

impl<T: RecursiveFloat> RecursiveGaussianFilter<T> {
    /// Create a filter from its configuration.
    pub fn new(config: RecursiveGaussianConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Create a Gaussian smoothing filter.
    ///
    /// # Arguments
    ///
    /// * `sigma` - Standard deviation of the kernel, in physical units.
    /// * `direction` - Axis along which the filter is applied.
    pub fn smoothing(sigma: f64, direction: usize) -> Self {
        Self::new(RecursiveGaussianConfig {
            sigma,
            direction,
            order: KernelOrder::Smoothing,
            ..Default::default()
        })
    }

    /// Create a Gaussian first derivative filter.
    ///
    /// # Arguments
    ///
    /// * `sigma` - Standard deviation of the kernel, in physical units.
    /// * `direction` - Axis along which the derivative is taken.
    pub fn first_derivative(sigma: f64, direction: usize) -> Self {
        Self::new(RecursiveGaussianConfig {
            sigma,
            direction,
            order: KernelOrder::FirstDerivative,
            ..Default::default()
        })
    }

    /// The current configuration.
    pub fn config(&self) -> &RecursiveGaussianConfig {
        &self.config
    }

    /// The standard deviation of the kernel, in physical units.
    pub fn sigma(&self) -> f64 {
        self.config.sigma
    }

    /// Set the standard deviation of the kernel, in physical units.
    ///
    /// The value is validated by the next call to [`RecursiveGaussianFilter::execute`].
    pub fn set_sigma(&mut self, sigma: f64) {
        if sigma.to_bits() != self.config.sigma.to_bits() {
            self.config.sigma = sigma;
            self.cache = None;
        }
    }

    /// The axis along which the filter is applied.
    pub fn direction(&self) -> usize {
        self.config.direction
    }

    /// Set the axis along which the filter is applied.
    pub fn set_direction(&mut self, direction: usize) {
        if direction != self.config.direction {
            self.config.direction = direction;
            self.cache = None;
        }
    }

    /// The kernel approximated by the filter.
    pub fn order(&self) -> KernelOrder {
        self.config.order
    }

    /// Set the kernel approximated by the filter.
    pub fn set_order(&mut self, order: KernelOrder) {
        if order != self.config.order {
            self.config.order = order;
            self.cache = None;
        }
    }

    /// The exponential series overriding the fit of [`order`](Self::order), if any.
    pub fn series(&self) -> Option<ExponentialSeries> {
        self.config.series
    }

    /// Replace the fitted exponential series, or restore the published one with `None`.
    pub fn set_series(&mut self, series: Option<ExponentialSeries>) {
        if series != self.config.series {
            self.config.series = series;
            self.cache = None;
        }
    }

    /// The execution strategy for the lines of an axis pass.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.config.strategy
    }

    /// Set the execution strategy. The cached coefficients are kept.
    pub fn set_strategy(&mut self, strategy: ExecutionStrategy) {
        self.config.strategy = strategy;
    }

    /// The coefficients used by the last successful run, if still valid.
    pub fn cached_coefficients(&self) -> Option<&DericheCoefficients<T>> {
        self.cache.as_ref().map(|cached| &cached.coeffs)
    }

    /// Filter `input` into a newly allocated image with the same shape and spacing.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameter`] if the sigma is not strictly positive
    /// and finite, if the direction is not an axis of `input`, or if `input` has fewer
    /// than four samples along it.
    pub fn execute<const N: usize>(
        &mut self,
        input: &NdImage<T, N>,
    ) -> Result<NdImage<T, N>, FilterError> {
        let mut output = input.filled_like(T::zero());
        self.execute_into(input, &mut output)?;
        Ok(output)
    }

    /// Filter `input` into a caller-owned `output` of the same shape.
    ///
    /// # Errors
    ///
    /// Same as [`RecursiveGaussianFilter::execute`], plus [`FilterError::Image`] if
    /// the shapes differ. On error `output` is left unmodified.
    pub fn execute_into<const N: usize>(
        &mut self,
        input: &NdImage<T, N>,
        output: &mut NdImage<T, N>,
    ) -> Result<(), FilterError> {
        input.check_same_shape(output)?;

        let direction = self.config.direction;
        let strategy = self.config.strategy;
        let coeffs = self.coefficients_for(input)?;

        apply_coefficients_along_axis(input, output, direction, coeffs, strategy)
    }

    fn coefficients_for<const N: usize>(
        &mut self,
        input: &NdImage<T, N>,
    ) -> Result<&DericheCoefficients<T>, FilterError> {
        let RecursiveGaussianConfig {
            sigma,
            direction,
            order,
            series,
            ..
        } = self.config;
        let series = series.unwrap_or_else(|| order.series());

        validate_sigma(sigma)?;
        let spacing = validate_axis(input, direction)?;
        let effective = T::from_f64_c(sigma / spacing);

        let cached = match self.cache.take() {
            Some(cached)
                if cached.order == order
                    && cached.series == series
                    && cached.coeffs.sigma() == effective =>
            {
                cached
            }
            _ => {
                log::debug!(
                    "computing {:?} coefficients for sigma {} along axis {} (spacing {})",
                    order,
                    sigma,
                    direction,
                    spacing
                );
                CachedCoefficients {
                    order,
                    series,
                    coeffs: DericheCoefficients::from_series(
                        effective,
                        &series,
                        order.is_symmetric(),
                    )?,
                }
            }
        };

        Ok(&self.cache.insert(cached).coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::axis::filter_along_axis;

    fn ramp_image() -> NdImage<f64, 2> {
        NdImage::from_shape_fn([8, 10], |[r, c]| (r * r + 3 * c) as f64).unwrap()
    }

    #[test]
    fn test_execute_matches_axis_filter() -> Result<(), FilterError> {
        let src = ramp_image().with_spacing([0.5, 2.0])?;

        for direction in 0..2 {
            let mut filter = RecursiveGaussianFilter::smoothing(1.5, direction);
            let dst = filter.execute(&src)?;
            assert_eq!(dst.shape(), src.shape());
            assert_eq!(dst.spacing(), src.spacing());

            let mut expected = src.filled_like(0.0);
            filter_along_axis(
                &src,
                &mut expected,
                direction,
                1.5,
                KernelOrder::Smoothing,
                ExecutionStrategy::Parallel,
            )?;
            assert_eq!(dst.as_slice(), expected.as_slice());
        }
        Ok(())
    }

    #[test]
    fn test_coefficients_cached_and_invalidated() -> Result<(), FilterError> {
        let src = ramp_image();
        let mut filter = RecursiveGaussianFilter::<f64>::smoothing(2.0, 1);
        assert!(filter.cached_coefficients().is_none());

        let first = filter.execute(&src)?;
        let cached = filter.cached_coefficients().cloned();
        assert!(cached.is_some());

        // second run reuses the same coefficients
        let second = filter.execute(&src)?;
        assert_eq!(filter.cached_coefficients().cloned(), cached);
        assert_eq!(first, second);

        // unchanged values keep the cache
        filter.set_sigma(2.0);
        filter.set_direction(1);
        filter.set_strategy(ExecutionStrategy::Serial);
        assert!(filter.cached_coefficients().is_some());

        filter.set_sigma(3.0);
        assert!(filter.cached_coefficients().is_none());
        filter.execute(&src)?;
        assert_eq!(filter.cached_coefficients().map(|c| c.sigma()), Some(3.0));

        filter.set_order(KernelOrder::FirstDerivative);
        assert!(filter.cached_coefficients().is_none());
        filter.execute(&src)?;
        assert_eq!(
            filter.cached_coefficients().map(|c| c.is_symmetric()),
            Some(false)
        );

        filter.set_direction(0);
        assert!(filter.cached_coefficients().is_none());
        Ok(())
    }

    #[test]
    fn test_custom_series() -> Result<(), FilterError> {
        let src = ramp_image();
        let series = ExponentialSeries {
            b0: 2.0,
            b1: 1.9,
            ..ExponentialSeries::GAUSSIAN
        };

        let mut filter = RecursiveGaussianFilter::<f64>::smoothing(1.5, 1);
        let published = filter.execute(&src)?;

        filter.set_series(Some(series));
        assert!(filter.cached_coefficients().is_none());
        let custom = filter.execute(&src)?;
        assert_eq!(filter.series(), Some(series));

        let coeffs = DericheCoefficients::from_series(1.5, &series, true)?;
        let mut expected = src.filled_like(0.0);
        apply_coefficients_along_axis(&src, &mut expected, 1, &coeffs, ExecutionStrategy::Serial)?;
        assert_eq!(custom.as_slice(), expected.as_slice());
        assert_eq!(filter.cached_coefficients(), Some(&coeffs));
        assert_ne!(custom.as_slice(), published.as_slice());

        // the same series again keeps the cache, clearing it restores the published fit
        filter.set_series(Some(series));
        assert!(filter.cached_coefficients().is_some());
        filter.set_series(None);
        assert!(filter.cached_coefficients().is_none());
        assert_eq!(filter.execute(&src)?, published);
        Ok(())
    }

    #[test]
    fn test_cache_follows_spacing() -> Result<(), FilterError> {
        let mut filter = RecursiveGaussianFilter::<f64>::smoothing(2.0, 0);

        filter.execute(&ramp_image())?;
        assert_eq!(filter.cached_coefficients().map(|c| c.sigma()), Some(2.0));

        // same configuration, different spacing: the effective sigma changes
        filter.execute(&ramp_image().with_spacing([4.0, 1.0])?)?;
        assert_eq!(filter.cached_coefficients().map(|c| c.sigma()), Some(0.5));
        Ok(())
    }

    #[test]
    fn test_invalid_configuration_leaves_output_untouched() -> Result<(), FilterError> {
        let src = ramp_image();
        let mut output = src.filled_like(42.0);

        for sigma in [0.0, -1.0, f64::NAN] {
            let mut filter = RecursiveGaussianFilter::smoothing(sigma, 0);
            let res = filter.execute_into(&src, &mut output);
            assert!(matches!(
                res,
                Err(FilterError::InvalidParameter { name: "sigma", .. })
            ));
            assert!(filter.cached_coefficients().is_none());
        }

        // direction equal to the dimension
        let mut filter = RecursiveGaussianFilter::smoothing(1.0, 2);
        let res = filter.execute_into(&src, &mut output);
        assert!(matches!(
            res,
            Err(FilterError::InvalidParameter {
                name: "direction",
                ..
            })
        ));

        let mut wrong_shape = NdImage::<f64, 2>::from_shape_val([8, 9], 42.0)?;
        let mut filter = RecursiveGaussianFilter::smoothing(1.0, 0);
        let res = filter.execute_into(&src, &mut wrong_shape);
        assert!(matches!(res, Err(FilterError::Image(_))));

        assert!(output.as_slice().iter().all(|&v| v == 42.0));
        assert!(wrong_shape.as_slice().iter().all(|&v| v == 42.0));
        Ok(())
    }

    #[test]
    fn test_constructors() {
        let filter = RecursiveGaussianFilter::<f32>::first_derivative(0.7, 2);
        assert_eq!(filter.sigma(), 0.7);
        assert_eq!(filter.direction(), 2);
        assert_eq!(filter.order(), KernelOrder::FirstDerivative);
        assert_eq!(filter.strategy(), ExecutionStrategy::Parallel);

        let filter = RecursiveGaussianFilter::<f32>::default();
        assert_eq!(filter.config(), &RecursiveGaussianConfig::default());
        assert_eq!(filter.order(), KernelOrder::Smoothing);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() -> Result<(), serde_json::Error> {
        let config: RecursiveGaussianConfig =
            serde_json::from_str(r#"{ "sigma": 2.5, "order": "FirstDerivative", "strategy": { "Fixed": 4 } }"#)?;
        assert_eq!(config.sigma, 2.5);
        assert_eq!(config.direction, 0);
        assert_eq!(config.order, KernelOrder::FirstDerivative);
        assert_eq!(config.strategy, ExecutionStrategy::Fixed(4));
        Ok(())
    }
}
