// navball_sim/src/simulation/core/transforms.rs

use bevy::prelude::{Quat as BevyQuat, Vec3 as BevyVec3};
use nalgebra::{Quaternion, UnitQuaternion};
use navball_core::messages::{HeadingSample, OrientationSample};

// =========================================================================
// == Render Space (navball_core) -> Bevy ==
// =========================================================================

/// Converts a render-space quaternion from the core pipeline into a Bevy `Quat`.
/// Components are copied as-is; nothing is normalized.
pub fn render_quat_to_bevy_quat(q: &Quaternion<f64>) -> BevyQuat {
    BevyQuat::from_xyzw(q.i as f32, q.j as f32, q.k as f32, q.w as f32)
}

/// A rotation about Bevy's vertical (+Y) axis.
pub fn vertical_rotation_to_bevy_quat(angle: f64) -> BevyQuat {
    BevyQuat::from_rotation_y(angle as f32)
}

pub fn array_to_bevy_vec3(v: [f64; 3]) -> BevyVec3 {
    BevyVec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

// =========================================================================
// == Simulated Telemetry (ENU) -> Wire Samples ==
// =========================================================================

/// Packs an ENU attitude into the `{x, y, z, w}` sample published on the bus.
pub fn enu_quat_to_sample(q: &UnitQuaternion<f64>) -> OrientationSample {
    let c = q.coords;
    OrientationSample::new(c.x, c.y, c.z, c.w)
}

/// The horizontal course of an ENU velocity, as published on the bus.
pub fn enu_velocity_to_sample(east: f64, north: f64, up: f64) -> HeadingSample {
    HeadingSample::new(east, north, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use navball_core::frames::to_render_quaternion;
    use std::f64::consts::FRAC_PI_2;

    const F32_EPSILON: f32 = 1e-6;

    #[test]
    fn identity_maps_to_bevy_identity() {
        let q = render_quat_to_bevy_quat(&Quaternion::identity());
        assert_abs_diff_eq!(q.w, 1.0, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(q.x, 0.0, epsilon = F32_EPSILON);
    }

    #[test]
    fn enu_yaw_lands_on_the_bevy_vertical_axis() {
        // A pure ENU yaw (about Z up) has its only vector part in z. After the
        // y/z swap it must sit in Bevy's y component.
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let render = to_render_quaternion(&enu_quat_to_sample(&yaw));
        let bevy = render_quat_to_bevy_quat(&render);

        assert_abs_diff_eq!(bevy.x, 0.0, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(bevy.z, 0.0, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(bevy.y, (FRAC_PI_2 / 2.0).sin() as f32, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(bevy.w, (FRAC_PI_2 / 2.0).cos() as f32, epsilon = F32_EPSILON);
    }

    #[test]
    fn vertical_rotation_turns_forward_to_the_right() {
        // The heading marker points along +Z at zero; a quarter turn points it along +X.
        let turned = vertical_rotation_to_bevy_quat(FRAC_PI_2) * BevyVec3::Z;
        assert_abs_diff_eq!(turned.x, 1.0, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(turned.z, 0.0, epsilon = F32_EPSILON);
    }
}
