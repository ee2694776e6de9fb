//! The ambient particle field hovering over the table.
//!
//! Particles are created in bulk by [`ParticleField::rebuild`] and then only
//! animated: each frame moves every particle around its fixed base position
//! with a phase offset equal to its index, and recomputes one tint shared by
//! the whole field. Only a change of the particle count requires a rebuild.
//!
//! A rebuild builds the complete new set first and swaps it in with a single
//! assignment, bumping [`ParticleField::generation`]. Render buffers remember
//! the generation they were sized for and are recreated when it changes.

use cgmath::Vector3;
use rand::Rng;

/// Base positions are sampled uniformly from this box.
pub const SPAWN_MIN: [f32; 3] = [-5.0, -0.5, -5.0];
pub const SPAWN_MAX: [f32; 3] = [5.0, 4.5, 5.0];

/// Milliseconds per unit of the motion clock (seconds).
pub const MOTION_CLOCK_DIVISOR: f64 = 1000.0;
/// Milliseconds per unit of the tint clock. Slower than the motion clock.
pub const TINT_CLOCK_DIVISOR: f64 = 5000.0;

const SWAY_XZ: f64 = 0.05;
const SWAY_Y: f64 = 0.1;
const TINT_SATURATION: f32 = 0.8;
const TINT_LIGHTNESS: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    base_position: Vector3<f32>,
    display_position: Vector3<f32>,
}

impl Particle {
    pub fn new(base_position: Vector3<f32>) -> Self {
        Self {
            base_position,
            display_position: base_position,
        }
    }

    pub fn base_position(&self) -> Vector3<f32> {
        self.base_position
    }

    pub fn display_position(&self) -> Vector3<f32> {
        self.display_position
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldPhase {
    Uninitialized,
    Populated,
    Disposed,
}

#[derive(Debug)]
pub struct ParticleField {
    phase: FieldPhase,
    particles: Vec<Particle>,
    generation: u64,
    /// sRGB tint shared by every particle.
    tint: [f32; 3],
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleField {
    pub fn new() -> Self {
        Self {
            phase: FieldPhase::Uninitialized,
            particles: Vec::new(),
            generation: 0,
            tint: hsl_to_rgb(tint_hue(0.0), TINT_SATURATION, TINT_LIGHTNESS),
        }
    }

    /// Replaces the whole particle set with `count` freshly sampled particles.
    pub fn rebuild<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        if self.phase == FieldPhase::Disposed {
            log::warn!("Ignoring rebuild of a disposed particle field");
            return;
        }
        let particles: Vec<Particle> = (0..count)
            .map(|_| {
                Particle::new(Vector3::new(
                    rng.gen_range(SPAWN_MIN[0]..SPAWN_MAX[0]),
                    rng.gen_range(SPAWN_MIN[1]..SPAWN_MAX[1]),
                    rng.gen_range(SPAWN_MIN[2]..SPAWN_MAX[2]),
                ))
            })
            .collect();
        self.particles = particles;
        self.generation += 1;
        self.phase = FieldPhase::Populated;
        log::debug!(
            "Particle field rebuilt with {} particles (generation {})",
            count,
            self.generation
        );
    }

    /// Animates all particles and the shared tint for the time `now_millis`.
    ///
    /// `speed` scales the motion clock only; the tint runs on its own clock.
    pub fn update(&mut self, now_millis: f64, speed: f32) {
        if self.phase != FieldPhase::Populated {
            return;
        }
        let t = now_millis / MOTION_CLOCK_DIVISOR * speed as f64;
        for (i, particle) in self.particles.iter_mut().enumerate() {
            particle.display_position = displaced(particle.base_position, i, t);
        }
        self.tint = hsl_to_rgb(
            tint_hue(now_millis / TINT_CLOCK_DIVISOR),
            TINT_SATURATION,
            TINT_LIGHTNESS,
        );
    }

    /// Releases the particles. Further updates and rebuilds are ignored.
    pub fn dispose(&mut self) {
        self.particles = Vec::new();
        self.phase = FieldPhase::Disposed;
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// Incremented by every rebuild.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn tint(&self) -> [f32; 3] {
        self.tint
    }
}

/// Position of particle `index` at motion time `t`.
pub fn displaced(base: Vector3<f32>, index: usize, t: f64) -> Vector3<f32> {
    let phase = index as f64;
    Vector3::new(
        base.x + ((t + phase).sin() * SWAY_XZ) as f32,
        base.y + ((t * 1.5 + phase).sin() * SWAY_Y) as f32,
        base.z + ((t + phase).cos() * SWAY_XZ) as f32,
    )
}

/// Hue of the field tint for tint-clock time `t_slow`, oscillating in `[0, 0.1]`.
pub fn tint_hue(t_slow: f64) -> f32 {
    (0.1 * (0.5 + 0.5 * t_slow.sin())) as f32
}

/// Converts hue, saturation and lightness (all in `[0, 1]`) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    [hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0)]
}
