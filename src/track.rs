//! Reference driving environment: a ring road between two concentric walls.

use crate::agent::{DriverAction, SENSOR_COUNT};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Sensor directions relative to the car heading, in degrees
pub const SENSOR_ANGLES: [f64; SENSOR_COUNT] = [-60.0, -30.0, 0.0, 30.0, 60.0];

/// Maximum turn rate in radians per second at full steering
const STEERING_RATE: f64 = 5.0;

/// Top speed in track units per second at full throttle
const ENGINE_SPEED: f64 = 100.0;

/// A simulation the trainer can drop driver agents into.
///
/// Vehicles are owned by the caller so episodes can run in parallel against a
/// shared, immutable environment.
pub trait Environment: Sync {
    type Vehicle: Send;

    /// Place a fresh vehicle at the start line
    fn spawn(&self) -> Self::Vehicle;

    /// Sensor readings for the vehicle, or `None` once it has crashed
    fn sense(&self, vehicle: &Self::Vehicle) -> Option<[f64; SENSOR_COUNT]>;

    /// Apply one action for one simulation tick
    fn advance(&self, vehicle: &mut Self::Vehicle, action: DriverAction);

    /// Non-negative score for the distance covered so far
    fn evaluate(&self, vehicle: &Self::Vehicle) -> f64;

    /// Whether the vehicle must be stopped without having crashed
    fn timed_out(&self, vehicle: &Self::Vehicle) -> bool;
}

/// Circuit geometry and episode limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Radius of the inner wall
    pub inner_radius: f64,
    /// Radius of the outer wall
    pub outer_radius: f64,
    /// Evenly spaced checkpoints around the ring
    pub checkpoints: u32,
    /// Ticks allowed between two new checkpoints
    pub checkpoint_timeout: u32,
    /// Hard limit on episode length
    pub max_ticks: u32,
    /// Seconds per tick
    pub time_step: f64,
    /// Sensor readings are capped at this distance
    pub sensor_range: f64,
    /// A sensor reading below this is a crash
    pub collision_threshold: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            inner_radius: 150.0,
            outer_radius: 250.0,
            checkpoints: 16,
            checkpoint_timeout: 150,
            max_ticks: 3000,
            time_step: 0.02,
            sensor_range: 250.0,
            collision_threshold: 3.0,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !is_positive(self.inner_radius) {
            return Err("track inner_radius must be > 0".to_string());
        }
        if !is_positive(self.outer_radius - self.inner_radius) {
            return Err("track outer_radius must exceed inner_radius".to_string());
        }
        if !is_positive(self.time_step) {
            return Err("track time_step must be a positive number".to_string());
        }
        if !is_positive(self.sensor_range) {
            return Err("track sensor_range must be > 0".to_string());
        }
        let half_width = (self.outer_radius - self.inner_radius) / 2.0;
        if !(0.0..half_width).contains(&self.collision_threshold) {
            return Err("track collision_threshold must be below half the road width".to_string());
        }
        if self.checkpoints == 0 || self.checkpoint_timeout == 0 || self.max_ticks == 0 {
            return Err("track checkpoints, checkpoint_timeout and max_ticks must be > 0".to_string());
        }
        Ok(())
    }

    /// Radius of the centerline
    pub fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// State of one car on a `CircuitTrack`
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, counter-clockwise from the x axis
    pub heading: f64,
    pub ticks: u32,
    /// Polar angle travelled around the ring, unwrapped, counter-clockwise positive
    progress: f64,
    last_angle: f64,
    best_checkpoint: i64,
    ticks_since_checkpoint: u32,
}

impl Car {
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn checkpoints_reached(&self) -> u32 {
        self.best_checkpoint.max(0) as u32
    }
}

/// Ring road centered on the origin, driven counter-clockwise
#[derive(Debug, Clone)]
pub struct CircuitTrack {
    config: TrackConfig,
}

impl CircuitTrack {
    pub fn new(config: TrackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// Distance along a ray to the nearest wall, capped at the sensor range
    fn cast_ray(&self, x: f64, y: f64, angle: f64) -> f64 {
        let (dy, dx) = angle.sin_cos();
        let b = x * dx + y * dy;
        let dist_sq = x * x + y * y;

        let mut nearest = self.config.sensor_range;
        // Inside the outer wall the far root is the hit
        let outer_disc = b * b - (dist_sq - self.config.outer_radius.powi(2));
        if outer_disc >= 0.0 {
            let t = -b + outer_disc.sqrt();
            if t >= 0.0 {
                nearest = nearest.min(t);
            }
        }
        // Outside the inner wall the near root is the hit
        let inner_disc = b * b - (dist_sq - self.config.inner_radius.powi(2));
        if inner_disc >= 0.0 {
            let t = -b - inner_disc.sqrt();
            if t >= 0.0 {
                nearest = nearest.min(t);
            }
        }
        nearest
    }

    fn checkpoint_index(&self, progress: f64) -> i64 {
        let spacing = TAU / self.config.checkpoints as f64;
        (progress / spacing).floor() as i64
    }
}

impl Environment for CircuitTrack {
    type Vehicle = Car;

    fn spawn(&self) -> Car {
        Car {
            x: self.config.mid_radius(),
            y: 0.0,
            heading: PI / 2.0,
            ticks: 0,
            progress: 0.0,
            last_angle: 0.0,
            best_checkpoint: 0,
            ticks_since_checkpoint: 0,
        }
    }

    fn sense(&self, car: &Car) -> Option<[f64; SENSOR_COUNT]> {
        let radius = car.radius();
        if radius <= self.config.inner_radius || radius >= self.config.outer_radius {
            return None;
        }

        let mut readings = [0.0; SENSOR_COUNT];
        for (reading, offset) in readings.iter_mut().zip(SENSOR_ANGLES) {
            *reading = self.cast_ray(car.x, car.y, car.heading + offset.to_radians());
        }

        if readings.iter().any(|&r| r < self.config.collision_threshold) {
            None
        } else {
            Some(readings)
        }
    }

    fn advance(&self, car: &mut Car, action: DriverAction) {
        let dt = self.config.time_step;
        car.heading += (action.direction * 2.0 - 1.0) * STEERING_RATE * dt;
        let speed = action.engine_force * ENGINE_SPEED;
        car.x += car.heading.cos() * speed * dt;
        car.y += car.heading.sin() * speed * dt;
        car.ticks += 1;

        let angle = car.y.atan2(car.x);
        let mut delta = angle - car.last_angle;
        if delta > PI {
            delta -= TAU;
        } else if delta <= -PI {
            delta += TAU;
        }
        car.progress += delta;
        car.last_angle = angle;

        let checkpoint = self.checkpoint_index(car.progress);
        if checkpoint > car.best_checkpoint {
            car.best_checkpoint = checkpoint;
            car.ticks_since_checkpoint = 0;
        } else {
            car.ticks_since_checkpoint += 1;
        }
    }

    fn evaluate(&self, car: &Car) -> f64 {
        (car.progress * self.config.mid_radius()).max(0.0)
    }

    fn timed_out(&self, car: &Car) -> bool {
        car.ticks >= self.config.max_ticks
            || car.ticks_since_checkpoint >= self.config.checkpoint_timeout
    }
}
