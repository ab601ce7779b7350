//! Stateless hash noise for Monte Carlo sampling.
//!
//! Every random number in the renderer is a pure function of its inputs, so
//! any pixel, sample, or bounce can be evaluated on any thread in any order
//! and still reproduce bit-for-bit.
//!
//! The hashes are the classic sine/fract family. They are evaluated in `f64`:
//! in `f32`, arguments in the thousands collapse onto a handful of sine
//! values and the output bands visibly.
//!
//! - Period: `sin` repeats every 2π, so [`rand_scalar`] repeats when its
//!   input moves by 2π / 91.3458 ≈ 0.0688 and [`rand_vec2`] repeats along
//!   the direction (12.9898, 78.233) every 2π / |(12.9898, 78.233)| ≈ 0.0793.
//!   [`Seed`] never feeds the same lane offset twice, so the period is not
//!   observable in practice.
//! - Bias: `fract(A sin x)` is close to uniform for large `A`; values within
//!   about 1e-4 of 0 and 1 are slightly under-represented.

use crate::{DVec2, DVec3, Vec2};

/// Largest f32 strictly below 1.0.
const ONE_MINUS_EPSILON: f32 = 1.0 - f32::EPSILON / 2.0;

const SCALAR_FREQUENCY: f64 = 91.3458;
const SCALAR_AMPLITUDE: f64 = 47453.5453;
const VEC2_WEIGHTS: DVec2 = DVec2::new(12.9898, 78.233);
const VEC2_AMPLITUDE: f64 = 43758.5453;

/// Per-lane offsets of the three nested hashes.
const LANE_SHIFT: DVec3 = DVec3::new(0.754_877_666 / 78.233, 0.569_840_291, 0.618_033_989 / 78.233);

/// Random lanes available to each bounce of a path.
pub const DIMENSIONS_PER_BOUNCE: u32 = 8;

/// Bounce lanes reserved per sample. Bounce indices must stay below this.
pub const MAX_BOUNCE_STREAMS: u32 = 256;

#[inline]
fn fract_sin(x: f64, amplitude: f64) -> f32 {
    let v = x.sin() * amplitude;
    let f = (v - v.floor()) as f32;
    // Narrowing can round 0.99999999 up to 1.0
    f.min(ONE_MINUS_EPSILON)
}

/// Hash a scalar to `[0, 1)`.
#[inline]
pub fn rand_scalar(co: f64) -> f32 {
    fract_sin(co * SCALAR_FREQUENCY, SCALAR_AMPLITUDE)
}

/// Hash a 2D point to `[0, 1)`.
#[inline]
pub fn rand_vec2(co: DVec2) -> f32 {
    fract_sin(co.dot(VEC2_WEIGHTS), VEC2_AMPLITUDE)
}

/// Coordinates of one stochastic sample: where on screen, when, which
/// sample of the pixel, and which bounce of the path.
///
/// A `Seed` is a value, not a generator. [`Seed::rand`] is a pure function of
/// the seed and the requested dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub uv: Vec2,
    pub time: f32,
    pub sample: u32,
    pub bounce: u32,
}

impl Seed {
    /// Seed for screen position `uv` at animation time `time`.
    pub fn new(uv: Vec2, time: f32) -> Self {
        Self {
            uv,
            time,
            sample: 0,
            bounce: 0,
        }
    }

    /// Same seed, for sample index `sample` of the pixel.
    #[inline]
    pub fn with_sample(self, sample: u32) -> Self {
        Self { sample, ..self }
    }

    /// Same seed, for bounce `bounce` of the path.
    #[inline]
    pub fn with_bounce(self, bounce: u32) -> Self {
        Self { bounce, ..self }
    }

    /// Index of `dimension` among all lanes of this pixel.
    #[inline]
    fn lane(&self, dimension: u32) -> f64 {
        let bounce = (self.bounce % MAX_BOUNCE_STREAMS) as u64;
        let dimension = (dimension % DIMENSIONS_PER_BOUNCE) as u64;
        let stream = self.sample as u64 * MAX_BOUNCE_STREAMS as u64 + bounce;
        (stream * DIMENSIONS_PER_BOUNCE as u64 + dimension) as f64
    }

    /// Uniform value in `[0, 1)` for lane `dimension` of this seed.
    ///
    /// Nests the 2D and scalar hashes: the screen position picks a value, the
    /// time is folded in through the scalar hash, and the pair is hashed
    /// again so neighbouring lanes decorrelate.
    pub fn rand(&self, dimension: u32) -> f32 {
        let lane = self.lane(dimension);
        let uv = self.uv.as_dvec2();
        let a = rand_vec2(DVec2::new(uv.x, uv.y + lane * LANE_SHIFT.x));
        let b = rand_scalar(self.time as f64 + lane * LANE_SHIFT.y + a as f64);
        rand_vec2(DVec2::new(a as f64 * 7.0, b as f64 * 3.0 + lane * LANE_SHIFT.z))
    }

    /// Two uniform values from lanes `dimension` and `dimension + 1`.
    #[inline]
    pub fn rand2(&self, dimension: u32) -> Vec2 {
        Vec2::new(self.rand(dimension), self.rand(dimension + 1))
    }
}
