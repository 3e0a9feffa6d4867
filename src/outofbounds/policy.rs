use crate::outofbounds::fold::Boundary;
use crate::types::RealType;
use crate::{ImgError, Result};
use serde::{Deserialize, Serialize};

/// What an `OutOfBounds` wrapper produces for a position outside its interval, typed on the
/// element of the wrapped accessor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutOfBoundsPolicy<T> {
    /// A fixed sentinel, independent of the distance to the interval
    Value(T),

    /// Reflect the coordinate back into the interval
    Mirror(Boundary),

    /// Wrap the coordinate around the interval
    Periodic,

    /// Mirror (edge repeated), attenuating the mirrored value towards zero with the distance
    /// beyond the interval
    MirrorExpWindow { decay_rate: f64 },
}

impl<T: RealType> Default for OutOfBoundsPolicy<T> {
    fn default() -> Self {
        OutOfBoundsPolicy::Value(T::zero())
    }
}

impl<T> OutOfBoundsPolicy<T> {
    pub(crate) fn validate(&self) -> Result<()> {
        if let OutOfBoundsPolicy::MirrorExpWindow { decay_rate } = self {
            check_decay_rate(*decay_rate)?;
        }
        Ok(())
    }
}

fn check_decay_rate(decay_rate: f64) -> Result<()> {
    if decay_rate > 0.0 && decay_rate <= 1.0 {
        Ok(())
    } else {
        Err(ImgError::OutOfRange(format!(
            "exponential window decay rate {decay_rate} is not in (0, 1]"
        )))
    }
}

/// The weight applied to a mirrored value whose position lies `distances[d]` elements beyond the
/// interval in each dimension.
pub fn exp_window_weight(decay_rate: f64, distances: impl IntoIterator<Item = u64>) -> f64 {
    let total = distances
        .into_iter()
        .fold(0u64, |acc, d| acc.saturating_add(d));
    (-decay_rate * total as f64).exp()
}

/// The element-type independent selection of an out-of-bounds strategy, as it appears in
/// configuration files.
///
/// ```
/// use ndimg::outofbounds::OutOfBoundsFactory;
///
/// let f: OutOfBoundsFactory =
///     serde_json::from_str(r#"{"type": "mirror_exp_window", "decay_rate": 0.5}"#).unwrap();
/// assert_eq!(f, OutOfBoundsFactory::MirrorExpWindow { decay_rate: 0.5 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutOfBoundsFactory {
    Value {
        #[serde(default)]
        value: f64,
    },
    MirrorSingle,
    MirrorDouble,
    Periodic,
    MirrorExpWindow {
        decay_rate: f64,
    },
}

impl Default for OutOfBoundsFactory {
    fn default() -> Self {
        OutOfBoundsFactory::Value { value: 0.0 }
    }
}

impl OutOfBoundsFactory {
    /// Resolve into a policy for element type `T`. The sentinel of `Value` is converted with
    /// `RealType::from_real`.
    pub fn policy<T: RealType>(&self) -> Result<OutOfBoundsPolicy<T>> {
        let policy = match *self {
            OutOfBoundsFactory::Value { value } => OutOfBoundsPolicy::Value(T::from_real(value)),
            OutOfBoundsFactory::MirrorSingle => OutOfBoundsPolicy::Mirror(Boundary::Single),
            OutOfBoundsFactory::MirrorDouble => OutOfBoundsPolicy::Mirror(Boundary::Double),
            OutOfBoundsFactory::Periodic => OutOfBoundsPolicy::Periodic,
            OutOfBoundsFactory::MirrorExpWindow { decay_rate } => {
                OutOfBoundsPolicy::MirrorExpWindow { decay_rate }
            }
        };
        policy.validate()?;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(0.0)]
    #[test_case(-0.1)]
    #[test_case(1.5)]
    #[test_case(f64::NAN)]
    fn bad_decay_rates(rate: f64) {
        let f = OutOfBoundsFactory::MirrorExpWindow { decay_rate: rate };
        assert!(matches!(f.policy::<f32>(), Err(ImgError::OutOfRange(_))));
    }

    #[test]
    fn value_converts_to_element_type() -> Result<()> {
        let f = OutOfBoundsFactory::Value { value: 128.4 };
        assert_eq!(f.policy::<u8>()?, OutOfBoundsPolicy::Value(128u8));
        assert_eq!(
            OutOfBoundsFactory::default().policy::<f64>()?,
            OutOfBoundsPolicy::Value(0.0)
        );
        Ok(())
    }

    #[test]
    fn parse_variants() -> Result<()> {
        let v: OutOfBoundsFactory = serde_json::from_str(r#"{"type": "value"}"#)?;
        assert_eq!(v, OutOfBoundsFactory::Value { value: 0.0 });
        let m: OutOfBoundsFactory = serde_json::from_str(r#"{"type": "mirror_double"}"#)?;
        assert_eq!(m.policy::<i32>()?, OutOfBoundsPolicy::Mirror(Boundary::Double));
        let p: OutOfBoundsFactory = serde_json::from_str(r#"{"type": "periodic"}"#)?;
        assert_eq!(p, OutOfBoundsFactory::Periodic);
        Ok(())
    }

    #[test]
    fn window_weight() {
        assert_relative_eq!(exp_window_weight(0.5, [0, 0]), 1.0);
        assert_relative_eq!(exp_window_weight(0.5, [2, 1]), (-1.5f64).exp());
    }
}
