use crate::space::EuclideanSpace;
use crate::{ImgError, Result};
use serde::{Deserialize, Serialize};

/// An axis-aligned box of integer coordinates with inclusive per-dimension bounds. An empty
/// dimension is expressed as `max == min - 1`.
pub trait Interval: EuclideanSpace {
    fn min(&self, d: usize) -> i64;

    fn max(&self, d: usize) -> i64;

    /// The number of integer positions along dimension `d`.
    fn dimension(&self, d: usize) -> usize {
        (self.max(d) - self.min(d) + 1) as usize
    }

    fn dimensions(&self) -> Vec<usize> {
        (0..self.num_dimensions()).map(|d| self.dimension(d)).collect()
    }

    fn min_vec(&self) -> Vec<i64> {
        (0..self.num_dimensions()).map(|d| self.min(d)).collect()
    }

    fn max_vec(&self) -> Vec<i64> {
        (0..self.num_dimensions()).map(|d| self.max(d)).collect()
    }

    fn size(&self) -> usize {
        (0..self.num_dimensions()).map(|d| self.dimension(d)).product()
    }

    fn is_empty(&self) -> bool {
        (0..self.num_dimensions()).any(|d| self.dimension(d) == 0)
    }

    fn contains(&self, position: &[i64]) -> bool {
        position
            .iter()
            .enumerate()
            .all(|(d, &p)| p >= self.min(d) && p <= self.max(d))
    }
}

/// An interval with its bounds stored explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinalInterval {
    min: Vec<i64>,
    max: Vec<i64>,
}

impl FinalInterval {
    /// Create an interval from inclusive minimum and maximum corners.
    ///
    /// # Arguments
    ///
    /// * `min`: the inclusive lower corner
    /// * `max`: the inclusive upper corner, with `max[d] >= min[d] - 1` in every dimension
    ///
    /// returns: Result<FinalInterval, ImgError>
    pub fn new(min: Vec<i64>, max: Vec<i64>) -> Result<Self> {
        if min.is_empty() {
            return Err(ImgError::InvalidDimension(
                "an interval needs at least one dimension".into(),
            ));
        }
        if min.len() != max.len() {
            return Err(ImgError::dimension_mismatch("max corner", min.len(), max.len()));
        }
        if let Some(d) = (0..min.len()).find(|&d| max[d] < min[d] - 1) {
            return Err(ImgError::InvalidDimension(format!(
                "max {} is below min {} - 1 in dimension {d}",
                max[d], min[d]
            )));
        }

        Ok(Self { min, max })
    }

    /// Create an interval starting at the origin with the given extents.
    pub fn from_dimensions(dimensions: &[usize]) -> Result<Self> {
        let min = vec![0; dimensions.len()];
        Self::from_min_size(&min, dimensions)
    }

    pub fn from_min_size(min: &[i64], size: &[usize]) -> Result<Self> {
        if min.len() != size.len() {
            return Err(ImgError::dimension_mismatch("size", min.len(), size.len()));
        }
        let max = min
            .iter()
            .zip(size.iter())
            .map(|(&m, &s)| m + s as i64 - 1)
            .collect();
        Self::new(min.to_vec(), max)
    }

    /// Copy the bounds of any other interval.
    pub fn from_interval(other: &impl Interval) -> Self {
        Self {
            min: other.min_vec(),
            max: other.max_vec(),
        }
    }

    /// Shift the interval by `offset` in every dimension.
    pub fn translated(&self, offset: &[i64]) -> Result<Self> {
        if offset.len() != self.min.len() {
            return Err(ImgError::dimension_mismatch(
                "offset",
                self.min.len(),
                offset.len(),
            ));
        }
        Ok(Self {
            min: self.min.iter().zip(offset).map(|(a, b)| a + b).collect(),
            max: self.max.iter().zip(offset).map(|(a, b)| a + b).collect(),
        })
    }

    /// Check that `other` has the same shape (extents) as this interval, regardless of where
    /// either one is located.
    pub fn check_same_shape(&self, other: &impl Interval) -> Result<()> {
        if other.num_dimensions() != self.num_dimensions() {
            return Err(ImgError::dimension_mismatch(
                "interval",
                self.num_dimensions(),
                other.num_dimensions(),
            ));
        }
        if self.dimensions() != other.dimensions() {
            return Err(ImgError::InvalidDimension(format!(
                "interval shapes differ: {:?} vs {:?}",
                self.dimensions(),
                other.dimensions()
            )));
        }
        Ok(())
    }
}

impl EuclideanSpace for FinalInterval {
    fn num_dimensions(&self) -> usize {
        self.min.len()
    }
}

impl Interval for FinalInterval {
    fn min(&self, d: usize) -> i64 {
        self.min[d]
    }

    fn max(&self, d: usize) -> i64 {
        self.max[d]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dimension_allowed() -> Result<()> {
        let i = FinalInterval::new(vec![0, 3], vec![4, 2])?;
        assert_eq!(i.dimensions(), vec![5, 0]);
        assert!(i.is_empty());
        assert_eq!(i.size(), 0);
        Ok(())
    }

    #[test]
    fn max_below_min_minus_one_rejected() {
        let r = FinalInterval::new(vec![0], vec![-2]);
        assert!(matches!(r, Err(ImgError::InvalidDimension(_))));
    }

    #[test]
    fn zero_dimensional_rejected() {
        assert!(FinalInterval::new(vec![], vec![]).is_err());
    }

    #[test]
    fn contains_and_translate() -> Result<()> {
        let i = FinalInterval::from_dimensions(&[5, 3])?;
        assert!(i.contains(&[0, 0]));
        assert!(i.contains(&[4, 2]));
        assert!(!i.contains(&[5, 2]));
        assert!(!i.contains(&[-1, 0]));

        let t = i.translated(&[-2, 10])?;
        assert_eq!(t.min_vec(), vec![-2, 10]);
        assert_eq!(t.max_vec(), vec![2, 12]);
        i.check_same_shape(&t)?;
        Ok(())
    }

    #[test]
    fn shape_mismatch() -> Result<()> {
        let a = FinalInterval::from_dimensions(&[5, 3])?;
        let b = FinalInterval::from_dimensions(&[3, 5])?;
        assert!(a.check_same_shape(&b).is_err());
        Ok(())
    }
}
