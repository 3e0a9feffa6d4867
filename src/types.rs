//! Element type capabilities. Storage containers only require `NativeType`, a plain copyable
//! value with a known primitive kind. Numeric algorithms (and the out-of-bounds wrappers, which
//! have to produce values for positions that have no storage) additionally require `RealType`,
//! which gives a lossy round trip through `f64`.

use num_traits::{Bounded, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The primitive representation behind a native element type. Storage strategies use this to
/// decide at runtime whether they have a specialization for an element type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeKind {
    Bit,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl NativeKind {
    pub fn bits(self) -> usize {
        match self {
            NativeKind::Bit => 1,
            NativeKind::Int8 | NativeKind::UInt8 => 8,
            NativeKind::Int16 | NativeKind::UInt16 => 16,
            NativeKind::Int32 | NativeKind::UInt32 | NativeKind::Float32 => 32,
            NativeKind::Int64 | NativeKind::UInt64 | NativeKind::Float64 => 64,
        }
    }
}

pub trait NativeType: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    const KIND: NativeKind;
}

/// A scalar element which can be read and written as a real number.
pub trait RealType: NativeType + Zero + Bounded + ToPrimitive + PartialOrd {
    /// Convert a real value into this type. Integer types round to the nearest integer and
    /// saturate at their limits, NaN becomes zero.
    fn from_real(value: f64) -> Self;

    /// Produce a zero-initialized value of the same type.
    fn create_variable(&self) -> Self {
        Self::zero()
    }

    fn set(&mut self, other: &Self) {
        *self = *other;
    }

    fn real_double(&self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    fn real_float(&self) -> f32 {
        self.real_double() as f32
    }

    fn set_real(&mut self, value: f64) {
        *self = Self::from_real(value);
    }
}

impl NativeType for bool {
    const KIND: NativeKind = NativeKind::Bit;
}

macro_rules! integer_types {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl NativeType for $t {
                const KIND: NativeKind = NativeKind::$kind;
            }

            impl RealType for $t {
                fn from_real(value: f64) -> Self {
                    // Float to integer `as` casts saturate and map NaN to zero
                    value.round() as $t
                }
            }
        )*
    };
}

macro_rules! float_types {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl NativeType for $t {
                const KIND: NativeKind = NativeKind::$kind;
            }

            impl RealType for $t {
                fn from_real(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

integer_types!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
);

float_types!(f32 => Float32, f64 => Float64);
