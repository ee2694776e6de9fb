//! Live, user-tunable parameters.
//!
//! The parameter panel is an outside collaborator: it only ever writes
//! [`ParamEdit`]s. Values are clamped to the ranges the panel exposes, and the
//! core reads the current values once per frame. Only a particle count change
//! asks the caller for a particle rebuild.

use std::ops::RangeInclusive;

use cgmath::Vector3;

pub const LIGHT_X: RangeInclusive<f32> = -20.0..=20.0;
pub const LIGHT_Y: RangeInclusive<f32> = 0.0..=30.0;
pub const LIGHT_Z: RangeInclusive<f32> = -20.0..=20.0;
pub const LIGHT_INTENSITY: RangeInclusive<f32> = 50.0..=700.0;
pub const LIGHT_ANGLE: RangeInclusive<f32> = 0.1..=std::f32::consts::FRAC_PI_2;
pub const LIGHT_PENUMBRA: RangeInclusive<f32> = 0.0..=1.0;
/// Must stay below [`ORBIT_DIVISOR_BASE`] so the orbit divisor never reaches zero.
pub const SPIN_SPEED: RangeInclusive<f32> = 100.0..=2000.0;
pub const SPIN_DISTANCE: RangeInclusive<f32> = 2.0..=20.0;
pub const PARTICLE_COUNT: RangeInclusive<usize> = 0..=5000;
pub const PARTICLE_SIZE: RangeInclusive<f32> = 0.01..=0.2;
pub const PARTICLE_SPEED: RangeInclusive<f32> = 0.0..=5.0;

/// The camera orbit angle is `now_millis / (ORBIT_DIVISOR_BASE - speed)`.
pub const ORBIT_DIVISOR_BASE: f32 = 2050.0;

fn clamp(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    pub position: Vector3<f32>,
    pub intensity: f32,
    /// Cone half angle in radians.
    pub angle: f32,
    /// Fraction of the cone over which the light fades out.
    pub penumbra: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            position: Vector3::new(5.0, 10.0, 5.0),
            intensity: 200.0,
            angle: std::f32::consts::FRAC_PI_6,
            penumbra: 0.3,
        }
    }
}

/// How fast and how far the camera circles the table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSpin {
    pub distance: f32,
    /// Higher values mean a faster orbit.
    pub speed: f32,
}

impl Default for CameraSpin {
    fn default() -> Self {
        Self {
            distance: 10.0,
            speed: 100.0,
        }
    }
}

impl CameraSpin {
    /// Orbit angle in radians at `now_millis`.
    pub fn angle(&self, now_millis: f64) -> f64 {
        let speed = clamp(self.speed, &SPIN_SPEED);
        now_millis / (ORBIT_DIVISOR_BASE - speed) as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleParams {
    pub count: usize,
    pub size: f32,
    pub speed: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: 500,
            size: 0.05,
            speed: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Params {
    pub light: LightParams,
    pub spin: CameraSpin,
    pub particles: ParticleParams,
}

/// A single write coming from the parameter panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamEdit {
    LightPosition(Vector3<f32>),
    LightIntensity(f32),
    LightAngle(f32),
    LightPenumbra(f32),
    SpinSpeed(f32),
    SpinDistance(f32),
    ParticleCount(usize),
    ParticleSize(f32),
    ParticleSpeed(f32),
}

/// What the caller has to do after an edit was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamChange {
    Unchanged,
    /// Picked up by the next frame, nothing else to do.
    Updated,
    /// The particle field must be rebuilt with this many particles.
    RebuildParticles(usize),
}

impl Params {
    pub fn apply(&mut self, edit: ParamEdit) -> ParamChange {
        let before = *self;
        match edit {
            ParamEdit::LightPosition(p) => {
                self.light.position = Vector3::new(
                    clamp(p.x, &LIGHT_X),
                    clamp(p.y, &LIGHT_Y),
                    clamp(p.z, &LIGHT_Z),
                )
            }
            ParamEdit::LightIntensity(v) => self.light.intensity = clamp(v, &LIGHT_INTENSITY),
            ParamEdit::LightAngle(v) => self.light.angle = clamp(v, &LIGHT_ANGLE),
            ParamEdit::LightPenumbra(v) => self.light.penumbra = clamp(v, &LIGHT_PENUMBRA),
            ParamEdit::SpinSpeed(v) => self.spin.speed = clamp(v, &SPIN_SPEED),
            ParamEdit::SpinDistance(v) => self.spin.distance = clamp(v, &SPIN_DISTANCE),
            ParamEdit::ParticleCount(n) => {
                self.particles.count = n.clamp(*PARTICLE_COUNT.start(), *PARTICLE_COUNT.end());
                if self.particles.count != before.particles.count {
                    return ParamChange::RebuildParticles(self.particles.count);
                }
            }
            ParamEdit::ParticleSize(v) => self.particles.size = clamp(v, &PARTICLE_SIZE),
            ParamEdit::ParticleSpeed(v) => self.particles.speed = clamp(v, &PARTICLE_SPEED),
        }
        if *self == before {
            ParamChange::Unchanged
        } else {
            ParamChange::Updated
        }
    }
}
