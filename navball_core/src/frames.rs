// navball_core/src/frames.rs

use nalgebra::Quaternion;

use crate::messages::OrientationSample;

// --- Telemetry (Z-up) -> Render (Y-up) ---

/// Maps a telemetry orientation into the render engine's quaternion.
///
/// Telemetry is published Z-up, the render engine is Y-up, so the y and z
/// components trade places: `(x, y, z, w)` becomes `(x, z, y, w)`. This is a
/// fixed axis permutation applied verbatim on every frame. It does not
/// re-normalize or re-orthogonalize anything.
pub fn to_render_quaternion(sample: &OrientationSample) -> Quaternion<f64> {
    // nalgebra's Quaternion::new takes (w, i, j, k).
    Quaternion::new(sample.w, sample.x, sample.z, sample.y)
}

/// Reads a render quaternion back as an `(x, y, z, w)` tuple in render order.
pub fn render_components(q: &Quaternion<f64>) -> (f64, f64, f64, f64) {
    (q.i, q.j, q.k, q.w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn swaps_y_and_z() {
        let q = to_render_quaternion(&OrientationSample::new(0.1, 0.2, 0.3, 0.9));
        assert_eq!(render_components(&q), (0.1, 0.3, 0.2, 0.9));
    }

    #[test]
    fn identity_stays_identity() {
        let q = to_render_quaternion(&OrientationSample::IDENTITY);
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn applying_twice_returns_the_original() {
        let enu_yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.7)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -0.3);
        let c = enu_yaw.coords;
        let original = OrientationSample::new(c.x, c.y, c.z, c.w);

        let (x, y, z, w) = render_components(&to_render_quaternion(&original));
        let twice = to_render_quaternion(&OrientationSample::new(x, y, z, w));

        assert_eq!(render_components(&twice), (original.x, original.y, original.z, original.w));
    }

    #[test]
    fn does_not_normalize() {
        let q = to_render_quaternion(&OrientationSample::new(0.0, 2.0, 0.0, 0.0));
        assert_abs_diff_eq!(q.norm(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q.k, 2.0, epsilon = 1e-12);
    }
}
