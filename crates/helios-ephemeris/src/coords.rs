//! Ecliptic → scene-space mapping.
//!
//! The scene is Y-up, so ecliptic north (Z) becomes scene Y and the ecliptic
//! Y axis becomes scene Z. Every body goes through the same scale; relative
//! geometry breaks if any consumer uses a different one.

use glam::DVec3;

use crate::{HeliocentricVector, SceneVector};

/// Scene units per astronomical unit.
pub const AU_TO_SCENE_SCALE: f64 = 40.0;

/// `(x, y, z)` AU → `(x, z, y) * AU_TO_SCENE_SCALE`.
pub fn to_scene(v: &HeliocentricVector) -> SceneVector {
    let p = v.position;
    SceneVector(DVec3::new(p.x, p.z, p.y) * AU_TO_SCENE_SCALE)
}

/// Inverse of [`to_scene`]; the result carries no velocity.
pub fn from_scene(v: SceneVector) -> HeliocentricVector {
    let s = v.0 / AU_TO_SCENE_SCALE;
    HeliocentricVector::new(s.x, s.z, s.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_swap_and_scale() {
        let v = HeliocentricVector::new(1.0, 2.0, 3.0);
        let s = to_scene(&v).0;
        assert_eq!(s.x, 1.0 * AU_TO_SCENE_SCALE);
        assert_eq!(s.y, v.position.z * AU_TO_SCENE_SCALE);
        assert_eq!(s.z, v.position.y * AU_TO_SCENE_SCALE);
    }

    #[test]
    fn test_axis_swap_holds_for_many_vectors() {
        for k in -50..50 {
            let f = k as f64 * 0.37;
            let v = HeliocentricVector::new(f, -2.0 * f + 0.5, f * f - 3.0);
            let s = to_scene(&v).0;
            assert_eq!(s.y, v.position.z * AU_TO_SCENE_SCALE);
            assert_eq!(s.z, v.position.y * AU_TO_SCENE_SCALE);
        }
    }

    #[test]
    fn test_inverse() {
        let v = HeliocentricVector::new(-0.4, 5.1, 0.02);
        let back = from_scene(to_scene(&v));
        assert!((back.position - v.position).length() < 1e-12);
    }

    #[test]
    fn test_linear() {
        let a = HeliocentricVector::new(1.0, 0.5, -0.25);
        let b = HeliocentricVector::new(-3.0, 2.0, 0.75);
        let sum = HeliocentricVector {
            position: a.position + b.position,
            velocity: None,
        };
        let lhs = to_scene(&sum).0;
        let rhs = to_scene(&a).0 + to_scene(&b).0;
        assert!((lhs - rhs).length() < 1e-12);
    }
}
