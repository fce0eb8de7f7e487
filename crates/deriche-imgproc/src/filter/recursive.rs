use crate::filter::{DericheCoefficients, FilterError};
use crate::float::RecursiveFloat;

/// Sample `i` of `buf`, zero outside of it.
#[inline(always)]
fn at(buf: &[f64], i: isize) -> f64 {
    usize::try_from(i)
        .ok()
        .and_then(|i| buf.get(i))
        .copied()
        .unwrap_or(0.0)
}

/// Apply the causal and anticausal recursions to one line of samples.
///
/// The causal pass runs left to right:
///
/// ```text
/// y+[i] = n0 x[i] + n1 x[i-1] + n2 x[i-2] + n3 x[i-3]
///       - d1 y+[i-1] - d2 y+[i-2] - d3 y+[i-3] - d4 y+[i-4]
/// ```
///
/// The anticausal pass runs right to left and starts one sample ahead, so the
/// centre sample is only counted by the causal pass:
///
/// ```text
/// y-[i] = m1 x[i+1] + m2 x[i+2] + m3 x[i+3] + m4 x[i+4]
///       - d1 y-[i+1] - d2 y-[i+2] - d3 y-[i+3] - d4 y-[i+4]
/// ```
///
/// The result is `k (y+[i] + y-[i])`. Samples outside the line are zero. Both
/// passes accumulate in `f64` whatever the sample type.
///
/// # Arguments
///
/// * `input` - The samples of the line. Any length is accepted, including lines
///   shorter than the recursion order.
/// * `coeffs` - The recursion coefficients.
///
/// # Returns
///
/// The filtered line, with the same length as `input`.
///
/// # Example
///
/// ```
/// use deriche_imgproc::filter::{recursive::recursive_filter_line, DericheCoefficients, KernelOrder};
///
/// let coeffs = DericheCoefficients::<f32>::new(1.5, KernelOrder::Smoothing).unwrap();
/// let out = recursive_filter_line(&[0.0, 0.0, 4.0, 0.0, 0.0], &coeffs);
/// assert_eq!(out.len(), 5);
/// assert!(out[2] > out[1] && out[2] > out[3]);
/// ```
pub fn recursive_filter_line<T: RecursiveFloat>(
    input: &[T],
    coeffs: &DericheCoefficients<T>,
) -> Vec<T> {
    let mut output = vec![T::zero(); input.len()];
    filter_line(input, &mut output, coeffs);
    output
}

/// Apply the recursions to one line, writing the result into `output`.
///
/// # Errors
///
/// If `input` and `output` have different lengths, an error is returned and
/// `output` is not modified.
pub fn recursive_filter_line_into<T: RecursiveFloat>(
    input: &[T],
    output: &mut [T],
    coeffs: &DericheCoefficients<T>,
) -> Result<(), FilterError> {
    if input.len() != output.len() {
        return Err(FilterError::invalid_parameter(
            "output",
            format!(
                "line length {} does not match input length {}",
                output.len(),
                input.len()
            ),
        ));
    }
    filter_line(input, output, coeffs);
    Ok(())
}

fn filter_line<T: RecursiveFloat>(input: &[T], output: &mut [T], coeffs: &DericheCoefficients<T>) {
    let [n0, n1, n2, n3] = *coeffs.causal();
    let [d1, d2, d3, d4] = *coeffs.poles();
    let [m1, m2, m3, m4] = *coeffs.anticausal();
    let k = coeffs.normalization();

    let x = input.iter().map(|v| v.to_f64_c()).collect::<Vec<_>>();

    // causal
    let mut causal = vec![0.0; x.len()];
    for i in 0..x.len() {
        let j = i as isize;
        causal[i] = n0 * at(&x, j) + n1 * at(&x, j - 1) + n2 * at(&x, j - 2) + n3 * at(&x, j - 3)
            - d1 * at(&causal, j - 1)
            - d2 * at(&causal, j - 2)
            - d3 * at(&causal, j - 3)
            - d4 * at(&causal, j - 4);
    }

    // anticausal
    let mut anticausal = vec![0.0; x.len()];
    for i in (0..x.len()).rev() {
        let j = i as isize;
        anticausal[i] = m1 * at(&x, j + 1)
            + m2 * at(&x, j + 2)
            + m3 * at(&x, j + 3)
            + m4 * at(&x, j + 4)
            - d1 * at(&anticausal, j + 1)
            - d2 * at(&anticausal, j + 2)
            - d3 * at(&anticausal, j + 3)
            - d4 * at(&anticausal, j + 4);
    }

    for ((out, c), a) in output.iter_mut().zip(causal).zip(anticausal) {
        *out = T::from_f64_c(k * (c + a));
    }
}
