use crate::space::{EuclideanSpace, Localizable, Positionable, RealLocalizable, RealPositionable};

/// A free-standing integer position, useful as a positioning target and for carrying
/// coordinates between accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    position: Vec<i64>,
}

impl Point {
    pub fn new(position: Vec<i64>) -> Self {
        Self { position }
    }

    pub fn origin(n: usize) -> Self {
        Self {
            position: vec![0; n],
        }
    }

    pub fn coords(&self) -> &[i64] {
        &self.position
    }
}

impl EuclideanSpace for Point {
    fn num_dimensions(&self) -> usize {
        self.position.len()
    }
}

impl Localizable for Point {
    fn long_position(&self, d: usize) -> i64 {
        self.position[d]
    }
}

impl Positionable for Point {
    fn set_position_dim(&mut self, value: i64, d: usize) {
        self.position[d] = value;
    }

    fn move_dim(&mut self, distance: i64, d: usize) {
        self.position[d] += distance;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealPoint {
    position: Vec<f64>,
}

impl RealPoint {
    pub fn new(position: Vec<f64>) -> Self {
        Self { position }
    }

    pub fn origin(n: usize) -> Self {
        Self {
            position: vec![0.0; n],
        }
    }

    pub fn coords(&self) -> &[f64] {
        &self.position
    }
}

impl EuclideanSpace for RealPoint {
    fn num_dimensions(&self) -> usize {
        self.position.len()
    }
}

impl RealLocalizable for RealPoint {
    fn double_position(&self, d: usize) -> f64 {
        self.position[d]
    }
}

impl RealPositionable for RealPoint {
    fn set_real_position_dim(&mut self, value: f64, d: usize) {
        self.position[d] = value;
    }

    fn move_real_dim(&mut self, distance: f64, d: usize) {
        self.position[d] += distance;
    }
}
