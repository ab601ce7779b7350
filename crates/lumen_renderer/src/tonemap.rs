//! Luminance-preserving extended Reinhard tone mapping.

use lumen_core::Color;
use lumen_math::LUMA_WEIGHTS;

/// Map HDR `color` to display range.
///
/// The luminance is compressed with `L (1 + L / white²) / (1 + L)`, the color
/// is rescaled to the new luminance, gamma `1 / gamma` is applied and the
/// result is clamped to `[0, 1]`. Zero luminance maps to black.
pub fn tonemap(color: Color, white: f32, gamma: f32) -> Color {
    let luma = color.dot(LUMA_WEIGHTS);
    if !(luma.is_finite() && luma > 0.0) {
        return Color::ZERO;
    }

    let mapped = luma * (1.0 + luma / (white * white)) / (1.0 + luma);
    let scaled = (color * (mapped / luma)).max(Color::ZERO);
    scaled.powf(1.0 / gamma).clamp(Color::ZERO, Color::ONE)
}

/// Convert a display-range color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_zero_luma() {
        assert_eq!(tonemap(Color::ZERO, 2.0, 1.0), Color::ZERO);
        assert_eq!(tonemap(Color::new(-1.0, 0.0, 0.0), 2.0, 1.0), Color::ZERO);
        assert_eq!(tonemap(Color::splat(f32::NAN), 2.0, 1.0), Color::ZERO);
    }

    #[test]
    fn test_white_point_maps_to_white() {
        // L = white gives L' = white (1 + 1/white) / (1 + white) = 1
        let c = tonemap(Color::splat(2.0), 2.0, 1.0);
        assert!((c - Color::ONE).length() < 1e-5);
    }

    #[test]
    fn test_preserves_hue_below_white() {
        let input = Color::new(0.2, 0.1, 0.05);
        let c = tonemap(input, 2.0, 1.0);
        assert!((c.x / c.y - 2.0).abs() < 1e-4);
        assert!((c.y / c.z - 2.0).abs() < 1e-4);
        assert!(c.x < input.x);
    }

    #[test]
    fn test_output_is_clamped() {
        let c = tonemap(Color::new(30.0, 30.0, 12.0), 2.0, 1.0);
        assert_eq!(c, Color::ONE);
        let c = tonemap(Color::new(50.0, 0.0, 0.0), 2.0, 1.0);
        assert!(c.max_element() <= 1.0 && c.min_element() >= 0.0);
    }

    #[test]
    fn test_gamma() {
        let linear = tonemap(Color::splat(0.5), 2.0, 1.0);
        let encoded = tonemap(Color::splat(0.5), 2.0, 2.2);
        assert!((encoded.x - linear.x.powf(1.0 / 2.2)).abs() < 1e-5);
        assert!(encoded.x > linear.x);
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::ONE), [255, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::new(0.5, 2.0, -1.0)), [128, 255, 0, 255]);
    }
}
