// navball_sim/src/simulation/plugins/vehicle/mod.rs

use nalgebra::UnitQuaternion;
use rand_distr::{Distribution, Normal};
use serde_json::json;
use std::time::Duration;

use crate::prelude::*;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::transforms::{enu_quat_to_sample, enu_velocity_to_sample};

// =========================================================================
// == Topic Names ==
// =========================================================================

pub const ATTITUDE_TOPIC: &str = "/vehicle/attitude";
pub const IMU_TOPIC: &str = "/imu/orientation";
pub const VELOCITY_TOPIC: &str = "/vehicle/velocity";
pub const DIAGNOSTICS_TOPIC: &str = "/diagnostics";
const DIAGNOSTICS_SCHEMA: &str = "DiagnosticArray";

// =========================================================================
// == Ground Truth Motion ==
// =========================================================================

/// The vehicle's true ENU attitude `t` seconds into the run: a slow yaw
/// with pitch and roll oscillating on top.
pub fn attitude_at(t: f64) -> UnitQuaternion<f64> {
    let yaw = 0.2 * t;
    let pitch = 0.35 * (0.5 * t).sin();
    let roll = 0.5 * (0.3 * t).sin();
    UnitQuaternion::from_euler_angles(roll, pitch, yaw)
}

/// The vehicle's ENU velocity at `t`. It moves along its yaw, and stands
/// still for half of every cycle so the heading indicator gets hidden too.
pub fn velocity_at(t: f64) -> [f64; 3] {
    let speed = (0.1 * t).sin().max(0.0) * 10.0;
    let yaw = 0.2 * t;
    [speed * yaw.cos(), speed * yaw.sin(), 0.0]
}

// =========================================================================
// == Vehicle Resource & Plugin ==
// =========================================================================

#[derive(Resource)]
pub struct SimulatedVehicle {
    attitude_timer: Timer,
    imu_timer: Timer,
    velocity_timer: Timer,
    diagnostics_timer: Timer,
    /// Per-axis attitude noise for the IMU topic; `None` publishes it clean.
    imu_noise: Option<Normal<f64>>,
}

impl SimulatedVehicle {
    pub fn from_settings(settings: &VehicleSettings) -> Self {
        let imu_noise = match Normal::new(0.0, settings.imu_noise_std_rad) {
            Ok(noise) => Some(noise),
            Err(e) => {
                warn!(
                    "Invalid IMU noise {} ({}), publishing it noise-free.",
                    settings.imu_noise_std_rad, e
                );
                None
            }
        };
        Self {
            attitude_timer: rate_timer(settings.attitude_rate_hz),
            imu_timer: rate_timer(settings.imu_rate_hz),
            velocity_timer: rate_timer(settings.velocity_rate_hz),
            diagnostics_timer: rate_timer(1.0),
            imu_noise,
        }
    }
}

/// Rates outside `[MIN_RATE_HZ, MAX_RATE_HZ]` are clamped; non-positive or
/// non-finite rates fall back to 1 Hz.
const MIN_RATE_HZ: f32 = 1e-3;
const MAX_RATE_HZ: f32 = 1e6;

fn rate_timer(rate_hz: f32) -> Timer {
    let rate = if rate_hz.is_finite() && rate_hz > 0.0 {
        rate_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ)
    } else {
        1.0
    };
    Timer::new(Duration::from_secs_f32(1.0 / rate), TimerMode::Repeating)
}

pub struct SimulatedVehiclePlugin;

impl Plugin for SimulatedVehiclePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_vehicle_topics)
            .add_systems(
                Update,
                publish_vehicle_telemetry.in_set(NavballSet::Telemetry),
            );
    }
}

// =========================================================================
// == Systems ==
// =========================================================================

fn spawn_vehicle_topics(
    mut commands: Commands,
    settings: Res<AppSettings>,
    mut bus: ResMut<TelemetryBus>,
) {
    let capacity = settings.vehicle.buffer_capacity;
    let orientation = &settings.schemas.orientation;
    let heading = &settings.schemas.heading;

    bus.create_topic(ATTITUDE_TOPIC, orientation, capacity);
    bus.create_topic(IMU_TOPIC, orientation, capacity);
    bus.create_topic(VELOCITY_TOPIC, heading, capacity);
    bus.create_topic(DIAGNOSTICS_TOPIC, DIAGNOSTICS_SCHEMA, capacity);

    info!(
        "Simulated vehicle publishing attitude at {:.1} Hz, IMU at {:.1} Hz, velocity at {:.1} Hz",
        settings.vehicle.attitude_rate_hz,
        settings.vehicle.imu_rate_hz,
        settings.vehicle.velocity_rate_hz
    );
    commands.insert_resource(SimulatedVehicle::from_settings(&settings.vehicle));
}

/// Ticks every publisher and pushes the samples that are due onto the bus.
fn publish_vehicle_telemetry(
    time: Res<Time>,
    vehicle: Option<ResMut<SimulatedVehicle>>,
    mut bus: ResMut<TelemetryBus>,
    mut rng: ResMut<SimulationRng>,
) {
    let Some(mut vehicle) = vehicle else {
        return;
    };
    let delta = time.delta();
    let t = time.elapsed_secs_f64();

    if vehicle.attitude_timer.tick(delta).just_finished() {
        publish_sample(&mut bus, ATTITUDE_TOPIC, &enu_quat_to_sample(&attitude_at(t)));
    }

    if vehicle.imu_timer.tick(delta).just_finished() {
        let mut measured = attitude_at(t);
        if let Some(noise) = vehicle.imu_noise {
            let rng = &mut rng.0;
            let error = UnitQuaternion::from_euler_angles(
                noise.sample(rng),
                noise.sample(rng),
                noise.sample(rng),
            );
            measured *= error;
        }
        publish_sample(&mut bus, IMU_TOPIC, &enu_quat_to_sample(&measured));
    }

    if vehicle.velocity_timer.tick(delta).just_finished() {
        let [east, north, up] = velocity_at(t);
        publish_sample(&mut bus, VELOCITY_TOPIC, &enu_velocity_to_sample(east, north, up));
    }

    if vehicle.diagnostics_timer.tick(delta).just_finished() {
        bus.publish(
            DIAGNOSTICS_TOPIC,
            json!({ "level": "OK", "message": "vehicle simulation running", "uptime_s": t }),
        );
    }
}

fn publish_sample<T: serde::Serialize>(bus: &mut TelemetryBus, topic: &str, sample: &T) {
    match serde_json::to_value(sample) {
        Ok(payload) => {
            bus.publish(topic, payload);
        }
        Err(e) => error!("Failed to encode sample for '{}': {}", topic, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use navball_core::extraction::heading_angle;
    use navball_core::messages::HeadingSample;

    #[test]
    fn timer_rates_are_kept_in_range() {
        assert_abs_diff_eq!(rate_timer(10.0).duration().as_secs_f32(), 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(rate_timer(1e-39).duration().as_secs_f32(), 1000.0, epsilon = 1e-2);
        assert!(rate_timer(1e9).duration() > Duration::ZERO);
        for rate in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            assert_eq!(rate_timer(rate).duration(), Duration::from_secs(1));
        }
    }

    #[test]
    fn attitude_starts_level() {
        let q = attitude_at(0.0);
        assert_abs_diff_eq!(q.angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn velocity_follows_yaw_while_moving() {
        // At t = 5 the vehicle is moving with yaw 1 rad from east.
        let t = 5.0;
        let [east, north, up] = velocity_at(t);
        assert_eq!(up, 0.0);
        assert!(east.hypot(north) > 0.0);

        // heading_angle measures from north towards east.
        let angle = heading_angle(&HeadingSample::new(east, north, up)).unwrap();
        assert_abs_diff_eq!(angle, std::f64::consts::FRAC_PI_2 - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn vehicle_stands_still_half_the_cycle() {
        // sin(0.1 t) < 0 for t in (10π, 20π).
        let [east, north, _] = velocity_at(15.0 * std::f64::consts::PI);
        assert_eq!(east, 0.0);
        assert_eq!(north, 0.0);
    }

    #[test]
    fn invalid_noise_disables_imu_noise() {
        let settings = VehicleSettings {
            imu_noise_std_rad: -1.0,
            ..Default::default()
        };
        assert!(SimulatedVehicle::from_settings(&settings).imu_noise.is_none());
        assert!(SimulatedVehicle::from_settings(&VehicleSettings::default())
            .imu_noise
            .is_some());
    }
}
