use crate::space::{
    EuclideanSpace, Localizable, Positionable, RealLocalizable, RealPositionable, Sampler,
    SamplerMut,
};

/// Round half away from zero, truncating towards zero after the half shift, so that
/// `round_f64(-0.5) == -1`, `round_f64(0.5) == 1` and `round_f64(-0.49) == 0`.
pub fn round_f64(r: f64) -> i64 {
    if r < 0.0 {
        (r - 0.5) as i64
    } else {
        (r + 0.5) as i64
    }
}

pub fn round_f32(r: f32) -> i64 {
    if r < 0.0 {
        (r - 0.5) as i64
    } else {
        (r + 0.5) as i64
    }
}

/// Drives an integer positionable from real valued positions. The real position is kept as a
/// shadow; on every real move the rounded coordinate is compared with the target's current
/// coordinate and only the difference is forwarded.
#[derive(Debug, Clone)]
pub struct Round<P> {
    target: P,
    position: Vec<f64>,
}

impl<P: Localizable + Positionable> Round<P> {
    /// Wrap `target`, starting the real position at the target's current integer position.
    pub fn new(target: P) -> Self {
        let position = target.position_vec().into_iter().map(|v| v as f64).collect();
        Self { target, position }
    }

    pub fn target(&self) -> &P {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut P {
        &mut self.target
    }

    pub fn into_target(self) -> P {
        self.target
    }

    fn sync_dim(&mut self, d: usize) {
        let delta = round_f64(self.position[d]) - self.target.long_position(d);
        if delta != 0 {
            self.target.move_dim(delta, d);
        }
    }
}

impl<P: EuclideanSpace> EuclideanSpace for Round<P> {
    fn num_dimensions(&self) -> usize {
        self.position.len()
    }
}

impl<P: Localizable + Positionable> RealLocalizable for Round<P> {
    fn double_position(&self, d: usize) -> f64 {
        self.position[d]
    }
}

impl<P: Localizable + Positionable> Localizable for Round<P> {
    fn long_position(&self, d: usize) -> i64 {
        self.target.long_position(d)
    }
}

impl<P: Localizable + Positionable> RealPositionable for Round<P> {
    fn set_real_position_dim(&mut self, value: f64, d: usize) {
        self.position[d] = value;
        self.target.set_position_dim(round_f64(value), d);
    }

    fn move_real_dim(&mut self, distance: f64, d: usize) {
        self.position[d] += distance;
        self.sync_dim(d);
    }

    fn set_real_position(&mut self, position: &[f64]) {
        let n = self.position.len();
        self.position.copy_from_slice(&position[..n]);
        let discrete = self.position.iter().map(|&r| round_f64(r)).collect::<Vec<_>>();
        self.target.set_position(&discrete);
    }

    fn move_real_by(&mut self, distance: &[f64]) {
        for d in 0..self.position.len() {
            self.position[d] += distance[d];
            self.sync_dim(d);
        }
    }
}

impl<P: Localizable + Positionable> Positionable for Round<P> {
    fn set_position_dim(&mut self, value: i64, d: usize) {
        self.position[d] = value as f64;
        self.target.set_position_dim(value, d);
    }

    fn move_dim(&mut self, distance: i64, d: usize) {
        self.position[d] += distance as f64;
        self.target.move_dim(distance, d);
    }
}

impl<P: Sampler> Sampler for Round<P> {
    type Element = P::Element;

    fn get(&self) -> &P::Element {
        self.target.get()
    }
}

impl<P: SamplerMut> SamplerMut for Round<P> {
    fn get_mut(&mut self) -> &mut P::Element {
        self.target.get_mut()
    }
}
