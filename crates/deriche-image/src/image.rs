use crate::error::ImageError;

/// Compute the row-major strides of a shape.
///
/// # Arguments
///
/// * `shape` - The extent of each axis.
///
/// # Returns
///
/// The number of elements to skip to move by one along each axis.
///
/// # Example
///
/// ```
/// use deriche_image::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// An N-dimensional image with physical sample spacing.
///
/// The samples are stored contiguously in row-major order: the last axis varies
/// fastest. Each axis carries the physical distance between two adjacent samples,
/// which defaults to `1.0`.
///
/// # Example
///
/// ```
/// use deriche_image::NdImage;
///
/// let image = NdImage::<f32, 2>::from_shape_val([3, 4], 0.0)
///     .unwrap()
///     .with_spacing([0.5, 2.0])
///     .unwrap();
///
/// assert_eq!(image.shape(), [3, 4]);
/// assert_eq!(image.spacing(), [0.5, 2.0]);
/// assert_eq!(image.numel(), 12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NdImage<T, const N: usize> {
    data: Vec<T>,
    shape: [usize; N],
    strides: [usize; N],
    spacing: [f64; N],
}

impl<T, const N: usize> NdImage<T, N> {
    /// Create a new image from its shape and row-major data.
    ///
    /// # Arguments
    ///
    /// * `shape` - The extent of each axis.
    /// * `data` - The samples in row-major order.
    ///
    /// # Errors
    ///
    /// If the data length does not match the product of the shape, an error is returned.
    pub fn new(shape: [usize; N], data: Vec<T>) -> Result<Self, ImageError> {
        let numel = shape.iter().product::<usize>();
        if data.len() != numel {
            return Err(ImageError::InvalidShape {
                expected: numel,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            shape,
            strides: get_strides_from_shape(shape),
            spacing: [1.0; N],
        })
    }

    /// Create a new image filled with a constant value.
    pub fn from_shape_val(shape: [usize; N], val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self::new(shape, vec![val; numel])
    }

    /// Create a new image by evaluating a function at every index.
    ///
    /// # Arguments
    ///
    /// * `shape` - The extent of each axis.
    /// * `f` - Called with the N-D index of every sample, in row-major order.
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Result<Self, ImageError>
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let strides = get_strides_from_shape(shape);
        let data = (0..numel)
            .map(|offset| f(index_from_offset(strides, offset)))
            .collect();
        Self::new(shape, data)
    }

    /// Create an image with the same shape and spacing as `self`, filled with `val`.
    pub fn filled_like<U: Clone>(&self, val: U) -> NdImage<U, N> {
        NdImage {
            data: vec![val; self.numel()],
            shape: self.shape,
            strides: self.strides,
            spacing: self.spacing,
        }
    }

    /// Consume the image and return it with the given spacing.
    ///
    /// # Errors
    ///
    /// If any spacing is not strictly positive and finite, an error is returned.
    pub fn with_spacing(mut self, spacing: [f64; N]) -> Result<Self, ImageError> {
        self.set_spacing(spacing)?;
        Ok(self)
    }

    /// Set the physical distance between adjacent samples along each axis.
    ///
    /// # Errors
    ///
    /// If any spacing is not strictly positive and finite, an error is returned
    /// and the image keeps its previous spacing.
    pub fn set_spacing(&mut self, spacing: [f64; N]) -> Result<(), ImageError> {
        for (axis, &s) in spacing.iter().enumerate() {
            if !(s.is_finite() && s > 0.0) {
                return Err(ImageError::InvalidSpacing(axis, s));
            }
        }
        self.spacing = spacing;
        Ok(())
    }

    /// The extent of each axis.
    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    /// The row-major strides of each axis.
    #[inline]
    pub fn strides(&self) -> [usize; N] {
        self.strides
    }

    /// The physical distance between adjacent samples along each axis.
    #[inline]
    pub fn spacing(&self) -> [f64; N] {
        self.spacing
    }

    /// The number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        N
    }

    /// The total number of samples.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// The number of samples along `axis`.
    ///
    /// # Errors
    ///
    /// If the axis does not exist, an error is returned.
    pub fn extent(&self, axis: usize) -> Result<usize, ImageError> {
        self.shape
            .get(axis)
            .copied()
            .ok_or(ImageError::AxisOutOfBounds(axis, N))
    }

    /// The spacing along `axis`.
    ///
    /// # Errors
    ///
    /// If the axis does not exist, an error is returned.
    pub fn axis_spacing(&self, axis: usize) -> Result<f64, ImageError> {
        self.spacing
            .get(axis)
            .copied()
            .ok_or(ImageError::AxisOutOfBounds(axis, N))
    }

    /// Get the offset of the sample at the given index, or `None` if it is out of bounds.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the N-D index of the sample stored at `offset`.
    ///
    /// # Errors
    ///
    /// If the offset is not smaller than the number of samples, an error is returned.
    pub fn get_index(&self, offset: usize) -> Result<[usize; N], ImageError> {
        if offset >= self.numel() {
            return Err(ImageError::IndexOutOfBounds(
                vec![offset],
                vec![self.numel()],
            ));
        }
        Ok(index_from_offset(self.strides, offset))
    }

    /// Get a reference to the sample at the given index.
    ///
    /// ```
    /// use deriche_image::NdImage;
    ///
    /// let image = NdImage::<u8, 2>::new([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(image.get([1, 0]), Some(&3));
    /// assert!(image.get([2, 0]).is_none());
    /// ```
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index).and_then(|i| self.data.get(i))
    }

    /// Overwrite the sample at the given index.
    ///
    /// # Errors
    ///
    /// If the index is out of bounds, an error is returned and the image is untouched.
    pub fn set(&mut self, index: [usize; N], val: T) -> Result<(), ImageError> {
        let offset = self.get_iter_offset(index).ok_or_else(|| {
            ImageError::IndexOutOfBounds(index.to_vec(), self.shape.to_vec())
        })?;
        self.data[offset] = val;
        Ok(())
    }

    /// The samples as a row-major slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The samples as a mutable row-major slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return the row-major samples.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Check that `other` has the same shape as `self`.
    ///
    /// # Errors
    ///
    /// If the shapes differ, an error is returned.
    pub fn check_same_shape<U>(&self, other: &NdImage<U, N>) -> Result<(), ImageError> {
        if self.shape != other.shape {
            return Err(ImageError::ShapeMismatch(
                self.shape.to_vec(),
                other.shape.to_vec(),
            ));
        }
        Ok(())
    }

    /// The offsets of the first sample of every line parallel to `axis`.
    ///
    /// The samples of a line starting at `start` live at
    /// `start + i * strides[axis]` for `i in 0..shape[axis]`. There is one line
    /// for every position of the remaining axes.
    ///
    /// # Errors
    ///
    /// If the axis does not exist, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use deriche_image::NdImage;
    ///
    /// let image = NdImage::<f32, 2>::from_shape_val([2, 3], 0.0).unwrap();
    /// assert_eq!(image.line_offsets(0).unwrap(), vec![0, 1, 2]);
    /// assert_eq!(image.line_offsets(1).unwrap(), vec![0, 3]);
    /// ```
    pub fn line_offsets(&self, axis: usize) -> Result<Vec<usize>, ImageError> {
        let extent = self.extent(axis)?;
        if self.numel() == 0 {
            return Ok(Vec::new());
        }
        let stride = self.strides[axis];
        Ok((0..self.numel())
            .filter(|offset| (offset / stride) % extent == 0)
            .collect())
    }
}

fn index_from_offset<const N: usize>(strides: [usize; N], offset: usize) -> [usize; N] {
    let mut idx = [0; N];
    let mut rem = offset;
    for (dim_i, &s) in strides.iter().enumerate() {
        if s == 0 {
            continue;
        }
        idx[dim_i] = rem / s;
        rem %= s;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_new() -> Result<(), ImageError> {
        let image = NdImage::<u8, 3>::new([2, 3, 4], vec![0; 24])?;
        assert_eq!(image.shape(), [2, 3, 4]);
        assert_eq!(image.strides(), [12, 4, 1]);
        assert_eq!(image.spacing(), [1.0, 1.0, 1.0]);
        assert_eq!(image.ndim(), 3);
        assert_eq!(image.numel(), 24);
        Ok(())
    }

    #[test]
    fn test_image_invalid_shape() {
        let res = NdImage::<u8, 2>::new([2, 3], vec![0; 5]);
        assert_eq!(
            res.unwrap_err(),
            ImageError::InvalidShape {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn test_image_from_shape_fn() -> Result<(), ImageError> {
        let image = NdImage::<usize, 2>::from_shape_fn([2, 3], |[r, c]| r * 10 + c)?;
        assert_eq!(image.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(image.get_index(4)?, [1, 1]);
        assert!(image.get_index(6).is_err());
        Ok(())
    }

    #[test]
    fn test_image_spacing() -> Result<(), ImageError> {
        let mut image = NdImage::<f32, 2>::from_shape_val([2, 2], 0.0)?;
        image.set_spacing([0.5, 3.0])?;
        assert_eq!(image.axis_spacing(1)?, 3.0);

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let res = image.set_spacing([1.0, bad]);
            assert!(matches!(res, Err(ImageError::InvalidSpacing(1, _))));
        }
        // a rejected spacing leaves the previous one in place
        assert_eq!(image.spacing(), [0.5, 3.0]);
        assert_eq!(
            image.axis_spacing(2),
            Err(ImageError::AxisOutOfBounds(2, 2))
        );
        Ok(())
    }

    #[test]
    fn test_image_get_set() -> Result<(), ImageError> {
        let mut image = NdImage::<f64, 3>::from_shape_val([2, 2, 2], 0.0)?;
        image.set([1, 0, 1], 5.0)?;
        assert_eq!(image.get([1, 0, 1]), Some(&5.0));
        assert_eq!(image.as_slice()[5], 5.0);

        let res = image.set([0, 2, 0], 1.0);
        assert!(matches!(res, Err(ImageError::IndexOutOfBounds(_, _))));
        assert_eq!(image.as_slice().iter().sum::<f64>(), 5.0);
        Ok(())
    }

    #[test]
    fn test_image_filled_like() -> Result<(), ImageError> {
        let image = NdImage::<u8, 2>::from_shape_val([3, 2], 7)?.with_spacing([2.0, 0.25])?;
        let other = image.filled_like(0.0f32);
        assert_eq!(other.shape(), image.shape());
        assert_eq!(other.spacing(), image.spacing());
        assert!(other.as_slice().iter().all(|&v| v == 0.0));
        image.check_same_shape(&other)?;

        let smaller = NdImage::<u8, 2>::from_shape_val([2, 2], 0)?;
        assert!(image.check_same_shape(&smaller).is_err());
        Ok(())
    }

    #[test]
    fn test_line_offsets_3d() -> Result<(), ImageError> {
        let image = NdImage::<u8, 3>::from_shape_val([2, 3, 4], 0)?;

        let along_0 = image.line_offsets(0)?;
        assert_eq!(along_0.len(), 12);
        assert_eq!(along_0, (0..12).collect::<Vec<_>>());

        let along_1 = image.line_offsets(1)?;
        assert_eq!(along_1, vec![0, 1, 2, 3, 12, 13, 14, 15]);

        let along_2 = image.line_offsets(2)?;
        assert_eq!(along_2, vec![0, 4, 8, 12, 16, 20]);

        assert!(image.line_offsets(3).is_err());
        Ok(())
    }

    #[test]
    fn test_line_offsets_empty() -> Result<(), ImageError> {
        let image = NdImage::<u8, 2>::new([0, 5], vec![])?;
        assert!(image.line_offsets(0)?.is_empty());
        assert!(image.line_offsets(1)?.is_empty());
        Ok(())
    }
}
