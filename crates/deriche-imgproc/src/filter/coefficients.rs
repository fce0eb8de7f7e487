//! Coefficients of the Deriche 4th-order recursive Gaussian approximation.
//!
//! The kernel is approximated, for `x >= 0`, by two damped complex exponentials:
//!
//! ```text
//! h(x) = (a0 cos(w0 x/s) + a1 sin(w0 x/s)) exp(-b0 x/s)
//!      + (c0 cos(w1 x/s) + c1 sin(w1 x/s)) exp(-b1 x/s)
//! ```
//!
//! Expanding the z-transform of `h` gives four feed-forward weights `n0..n3`
//! over four feedback weights `d1..d4`. The mirrored half of the kernel shares
//! the feedback weights and uses `m1..m4`, derived from `n` and `d`.
//!
//! Reference: R. Deriche, "Fast algorithms for low-level vision",
//! IEEE PAMI 12(1), 1990.

use crate::filter::FilterError;
use crate::float::RecursiveFloat;

/// Below this effective sigma, in samples, the approximation is noticeably less accurate.
const SUB_PIXEL_SIGMA: f64 = 1.0;

/// Smallest `1 + sum(d)`, relative to the pole weights, that double precision still resolves.
const POLE_RESOLUTION: f64 = 1e3 * f64::EPSILON;

/// Parameters of the two damped complex exponentials fitted to a kernel.
///
/// Only used while deriving a [`DericheCoefficients`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExponentialSeries {
    /// Cosine amplitude of the first exponential.
    pub a0: f64,
    /// Sine amplitude of the first exponential.
    pub a1: f64,
    /// Decay rate of the first exponential.
    pub b0: f64,
    /// Decay rate of the second exponential.
    pub b1: f64,
    /// Cosine amplitude of the second exponential.
    pub c0: f64,
    /// Sine amplitude of the second exponential.
    pub c1: f64,
    /// Angular frequency of the first exponential.
    pub w0: f64,
    /// Angular frequency of the second exponential.
    pub w1: f64,
}

impl ExponentialSeries {
    /// Published fit of the Gaussian kernel.
    pub const GAUSSIAN: Self = Self {
        a0: 1.680,
        a1: 3.735,
        b0: 1.783,
        b1: 1.723,
        c0: -0.6803,
        c1: -0.2598,
        w0: 0.6318,
        w1: 1.997,
    };

    /// Published fit of the first derivative of the Gaussian kernel.
    pub const FIRST_DERIVATIVE: Self = Self {
        a0: -0.6472,
        a1: -4.531,
        b0: 1.527,
        b1: 1.516,
        c0: 0.6494,
        c1: 0.9557,
        w0: 0.6719,
        w1: 2.072,
    };
}

/// The kernel approximated by the recursive filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KernelOrder {
    /// Gaussian smoothing. Symmetric kernel.
    #[default]
    Smoothing,
    /// First derivative of the Gaussian. Antisymmetric kernel.
    FirstDerivative,
}

impl KernelOrder {
    /// Whether the kernel is symmetric (`true`) or antisymmetric (`false`).
    pub fn is_symmetric(&self) -> bool {
        matches!(self, KernelOrder::Smoothing)
    }

    /// The exponential series fitted to this kernel.
    pub fn series(&self) -> ExponentialSeries {
        match self {
            KernelOrder::Smoothing => ExponentialSeries::GAUSSIAN,
            KernelOrder::FirstDerivative => ExponentialSeries::FIRST_DERIVATIVE,
        }
    }
}

/// Recursion coefficients for one effective sigma and one kernel symmetry.
///
/// The fields are private: a coefficient set only comes out of
/// [`DericheCoefficients::new`] or [`DericheCoefficients::from_series`], so the
/// causal and anticausal weights used by a recursion always belong together.
///
/// The weights are derived and held in double precision for every sample type
/// `T`. The poles sit close to one for wide kernels and do not survive rounding
/// to `f32`.
///
/// # Example
///
/// ```
/// use deriche_imgproc::filter::{DericheCoefficients, KernelOrder};
///
/// let coeffs = DericheCoefficients::<f64>::new(2.0, KernelOrder::Smoothing).unwrap();
/// assert!(coeffs.is_symmetric());
/// assert_eq!(coeffs.sigma(), 2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DericheCoefficients<T> {
    n: [f64; 4],
    d: [f64; 4],
    m: [f64; 4],
    k: f64,
    sigma: T,
    symmetric: bool,
}

impl<T: RecursiveFloat> DericheCoefficients<T> {
    /// Compute the coefficients of a kernel with standard deviation `sigma`.
    ///
    /// # Arguments
    ///
    /// * `sigma` - The effective sigma of the kernel, in samples.
    /// * `order` - The kernel to approximate.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameter`] if `sigma` is not strictly positive
    /// and finite, and [`FilterError::NumericOverflow`] if a coefficient is not finite
    /// or the sigma is too wide for the poles to be resolved.
    pub fn new(sigma: T, order: KernelOrder) -> Result<Self, FilterError> {
        Self::from_series(sigma, &order.series(), order.is_symmetric())
    }

    /// Compute the coefficients from caller-supplied exponential series constants.
    ///
    /// An antisymmetric kernel is zero at its centre, so its centre tap `n0` is
    /// dropped whatever `a0 + c0` the series gives.
    ///
    /// # Arguments
    ///
    /// * `sigma` - The effective sigma of the kernel, in samples.
    /// * `series` - The fitted exponential series.
    /// * `symmetric` - `true` for symmetric kernels such as the Gaussian, `false`
    ///   for antisymmetric kernels such as its first derivative.
    ///
    /// # Errors
    ///
    /// Same as [`DericheCoefficients::new`].
    pub fn from_series(
        sigma: T,
        series: &ExponentialSeries,
        symmetric: bool,
    ) -> Result<Self, FilterError> {
        let s = sigma.to_f64_c();
        if !s.is_finite() || s <= 0.0 {
            return Err(FilterError::invalid_parameter(
                "sigma",
                format!("effective sigma must be positive and finite, got {s}"),
            ));
        }

        if s < SUB_PIXEL_SIGMA {
            log::warn!(
                "effective sigma {} is below one sample, the recursive approximation degrades",
                s
            );
        }

        let ExponentialSeries {
            a0,
            a1,
            b0,
            b1,
            c0,
            c1,
            w0,
            w1,
        } = *series;

        let (sin0, cos0) = (w0 / s).sin_cos();
        let (sin1, cos1) = (w1 / s).sin_cos();
        let e0 = (-b0 / s).exp();
        let e1 = (-b1 / s).exp();

        // causal feed-forward
        let n0 = if symmetric { a0 + c0 } else { 0.0 };
        let n1 = e1 * (c1 * sin1 - (c0 + 2.0 * a0) * cos1)
            + e0 * (a1 * sin0 - (a0 + 2.0 * c0) * cos0);
        let n2 = 2.0 * e0 * e1 * ((a0 + c0) * cos1 * cos0 - a1 * cos1 * sin0 - c1 * cos0 * sin1)
            + c0 * e0 * e0
            + a0 * e1 * e1;
        let n3 = e1 * e0 * e0 * (c1 * sin1 - c0 * cos1) + e0 * e1 * e1 * (a1 * sin0 - a0 * cos0);

        // poles, shared by both passes
        let d1 = -2.0 * e1 * cos1 - 2.0 * e0 * cos0;
        let d2 = 4.0 * cos1 * cos0 * e0 * e1 + e1 * e1 + e0 * e0;
        let d3 = -2.0 * cos0 * e0 * e1 * e1 - 2.0 * cos1 * e1 * e0 * e0;
        let d4 = e0 * e0 * e1 * e1;

        // anticausal feed-forward: the causal response mirrored, without the centre tap
        let sign = if symmetric { 1.0 } else { -1.0 };
        let m1 = sign * (n1 - d1 * n0);
        let m2 = sign * (n2 - d2 * n0);
        let m3 = sign * (n3 - d3 * n0);
        let m4 = sign * (-d4 * n0);

        let n = [n0, n1, n2, n3];
        let d = [d1, d2, d3, d4];
        let m = [m1, m2, m3, m4];

        let k = normalization(&n, &d, &m, symmetric);

        let coeffs = Self {
            n,
            d,
            m,
            k,
            sigma,
            symmetric,
        };
        coeffs.check_representable()?;

        log::trace!(
            "deriche coefficients sigma={} symmetric={} n={:?} d={:?} m={:?} k={}",
            s,
            symmetric,
            coeffs.n,
            coeffs.d,
            coeffs.m,
            coeffs.k
        );

        Ok(coeffs)
    }

    fn check_representable(&self) -> Result<(), FilterError> {
        let overflow = |name: &'static str| FilterError::NumericOverflow {
            name,
            sigma: self.sigma.to_f64_c(),
        };

        let [n0, n1, n2, n3] = self.n;
        let [d1, d2, d3, d4] = self.d;
        let [m1, m2, m3, m4] = self.m;
        let named = [
            ("n0", n0),
            ("n1", n1),
            ("n2", n2),
            ("n3", n3),
            ("d1", d1),
            ("d2", d2),
            ("d3", d3),
            ("d4", d4),
            ("m1", m1),
            ("m2", m2),
            ("m3", m3),
            ("m4", m4),
        ];
        if let Some(&(name, _)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(overflow(name));
        }

        // 1 + sum(d) is what divides the gain, it must stand clear of rounding noise
        let sd = 1.0 + self.d.iter().sum::<f64>();
        let scale = 1.0 + self.d.iter().map(|v| v.abs()).sum::<f64>();
        if sd < POLE_RESOLUTION * scale {
            return Err(overflow("d"));
        }

        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(overflow("k"));
        }
        Ok(())
    }

    /// Causal feed-forward weights `n0..n3`.
    #[inline]
    pub fn causal(&self) -> &[f64; 4] {
        &self.n
    }

    /// Feedback weights `d1..d4`, shared by the causal and anticausal passes.
    #[inline]
    pub fn poles(&self) -> &[f64; 4] {
        &self.d
    }

    /// Anticausal feed-forward weights `m1..m4`.
    #[inline]
    pub fn anticausal(&self) -> &[f64; 4] {
        &self.m
    }

    /// Normalization factor applied to the sum of both passes.
    #[inline]
    pub fn normalization(&self) -> f64 {
        self.k
    }

    /// The effective sigma, in samples, the coefficients were computed for.
    #[inline]
    pub fn sigma(&self) -> T {
        self.sigma
    }

    /// Whether the approximated kernel is symmetric.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }
}

/// Scale making the combined response a unit-gain smoother or a unit-slope derivative.
///
/// With `D(q) = 1 + sum(d_i q^i)`, `N(q) = sum(n_i q^i)` and `M(q) = sum(m_i q^i)`,
/// the causal response sums to `N(1)/D(1)` and the anticausal one to `M(1)/D(1)`.
/// For the antisymmetric kernel the first moment is used instead, so that a unit
/// ramp comes out as a constant one.
fn normalization(n: &[f64; 4], d: &[f64; 4], m: &[f64; 4], symmetric: bool) -> f64 {
    let sd = 1.0 + d.iter().sum::<f64>();
    let sn = n.iter().sum::<f64>();
    let sm = m.iter().sum::<f64>();

    if symmetric {
        return sd / (sn + sm);
    }

    // derivatives at q = 1, n carries q^0..q^3 while d and m carry q^1..q^4
    let dd = weighted_sum(d, 1);
    let dn = weighted_sum(n, 0);
    let dm = weighted_sum(m, 1);

    let causal_moment = (dn * sd - sn * dd) / (sd * sd);
    let anticausal_moment = -(dm * sd - sm * dd) / (sd * sd);

    -1.0 / (causal_moment + anticausal_moment)
}

fn weighted_sum(w: &[f64; 4], first_power: usize) -> f64 {
    w.iter()
        .enumerate()
        .map(|(i, &v)| v * (i + first_power) as f64)
        .sum()
}
