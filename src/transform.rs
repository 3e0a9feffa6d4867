//! Positionables which drive another positionable. `Round` maps real valued positions onto an
//! integer accessor.

mod round;

pub use round::{Round, round_f32, round_f64};
