/// A parameter window `[min, max]` along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// No value lies strictly between the bounds (this includes NaN bounds).
    pub fn is_empty(&self) -> bool {
        !(self.min < self.max)
    }

    /// `min < x < max`. Intersection roots must pass this test, so a hit
    /// exactly at `t_min` (a ray leaving the surface it started on) is
    /// rejected.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounds_is_exclusive() {
        let window = Interval::new(0.001, 1000.0);
        assert!(window.surrounds(4.0));
        for t in [0.001, 1000.0, 0.0, -4.0, f32::NAN, f32::INFINITY] {
            assert!(!window.surrounds(t), "t={t}");
        }
    }

    #[test]
    fn test_is_empty() {
        assert!(Interval::new(3.0, 3.0).is_empty());
        assert!(Interval::new(5.0, 1.0).is_empty());
        assert!(Interval::new(f32::NAN, 1.0).is_empty());
        assert!(!Interval::new(0.001, 1000.0).is_empty());
    }
}
