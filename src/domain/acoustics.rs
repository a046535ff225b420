/// Distance attenuation for positional ambient sound.

use super::geometry::Vec2;

/// Linear falloff: 1.0 at the source, 0.0 at `radius` and beyond.
pub fn attenuation(listener: Vec2, source: Vec2, radius: f32) -> f32 {
    let d = listener.distance(source);
    if radius <= 0.0 {
        return if d == 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - d / radius).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_volume_at_source() {
        let p = Vec2::new(10.0, 10.0);
        assert_eq!(attenuation(p, p, 100.0), 1.0);
    }

    #[test]
    fn halfway_is_half() {
        let v = attenuation(Vec2::ZERO, Vec2::new(50.0, 0.0), 100.0);
        assert!((v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn silent_at_and_past_radius() {
        assert_eq!(attenuation(Vec2::ZERO, Vec2::new(0.0, 100.0), 100.0), 0.0);
        assert_eq!(attenuation(Vec2::ZERO, Vec2::new(300.0, 400.0), 100.0), 0.0);
    }

    #[test]
    fn degenerate_radius() {
        assert_eq!(attenuation(Vec2::ZERO, Vec2::ZERO, 0.0), 1.0);
        assert_eq!(attenuation(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.0), 0.0);
        assert_eq!(attenuation(Vec2::ZERO, Vec2::new(1.0, 0.0), -5.0), 0.0);
    }
}
