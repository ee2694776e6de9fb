use rand::{SeedableRng, rngs::StdRng};
use tableau::{
    data_structures::particle::{
        FieldPhase, ParticleField, SPAWN_MAX, SPAWN_MIN, displaced, hsl_to_rgb, tint_hue,
    },
    params::{ParamChange, ParamEdit},
};

use crate::common::test_utils::{assert_close, seeded_context};

mod common;

fn populated(count: usize) -> ParticleField {
    let mut field = ParticleField::new();
    field.rebuild(count, &mut StdRng::seed_from_u64(42));
    field
}

#[test]
fn rebuild_samples_base_positions_inside_the_spawn_box() {
    let field = populated(5000);
    assert_eq!(field.phase(), FieldPhase::Populated);
    assert_eq!(field.count(), 5000);
    for particle in field.particles() {
        let p = particle.base_position();
        assert!(p.x >= SPAWN_MIN[0] && p.x < SPAWN_MAX[0]);
        assert!(p.y >= SPAWN_MIN[1] && p.y < SPAWN_MAX[1]);
        assert!(p.z >= SPAWN_MIN[2] && p.z < SPAWN_MAX[2]);
    }
}

#[test]
fn empty_field_survives_updates() {
    let mut field = populated(0);
    assert_eq!(field.phase(), FieldPhase::Populated);
    field.update(1000.0, 1.0);
    field.update(2000.0, 5.0);
    assert_eq!(field.count(), 0);
    assert!(field.particles().is_empty());
}

#[test]
fn base_positions_do_not_move_between_frames() {
    let mut field = populated(64);
    let bases: Vec<_> = field.particles().iter().map(|p| p.base_position()).collect();

    field.update(0.0, 1.0);
    let first: Vec<_> = field.particles().iter().map(|p| p.display_position()).collect();
    field.update(750.0, 1.0);
    let second: Vec<_> = field.particles().iter().map(|p| p.display_position()).collect();

    let after: Vec<_> = field.particles().iter().map(|p| p.base_position()).collect();
    assert_eq!(bases, after);
    assert_ne!(first, second);
}

#[test]
fn display_position_follows_phase_shifted_orbit() {
    let mut field = populated(3);
    field.update(2500.0, 2.0);
    let t = 2500.0 / 1000.0 * 2.0;
    for (i, particle) in field.particles().iter().enumerate() {
        let base = particle.base_position();
        let expected = displaced(base, i, t);
        assert_eq!(particle.display_position(), expected);
        assert_close(expected.x - base.x, ((t + i as f64).sin() * 0.05) as f32);
        assert_close(expected.y - base.y, ((t * 1.5 + i as f64).sin() * 0.1) as f32);
        assert_close(expected.z - base.z, ((t + i as f64).cos() * 0.05) as f32);
    }
}

#[test]
fn speed_scales_motion_but_not_tint() {
    let mut slow = populated(16);
    let mut fast = populated(16);
    slow.update(1234.0, 0.5);
    fast.update(1234.0, 4.0);

    assert_eq!(slow.tint(), fast.tint());
    assert_ne!(
        slow.particles()[3].display_position(),
        fast.particles()[3].display_position()
    );
}

#[test]
fn tint_hue_stays_in_the_warm_band() {
    for step in 0..200 {
        let h = tint_hue(step as f64 * 0.1);
        assert!((0.0..=0.1).contains(&h), "hue {}", h);
    }
    assert_close(tint_hue(0.0), 0.05);
    assert_close(tint_hue(std::f64::consts::FRAC_PI_2), 0.1);
}

#[test]
fn hsl_conversion_matches_known_colours() {
    assert_eq!(hsl_to_rgb(0.3, 0.0, 0.5), [0.5, 0.5, 0.5]);
    let red = hsl_to_rgb(0.0, 1.0, 0.5);
    assert_close(red[0], 1.0);
    assert_close(red[1], 0.0);
    assert_close(red[2], 0.0);
}

#[test]
fn rebuild_publishes_a_new_generation() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut field = ParticleField::new();
    assert_eq!(field.phase(), FieldPhase::Uninitialized);
    assert_eq!(field.generation(), 0);

    field.rebuild(100, &mut rng);
    let first = field.particles()[0].base_position();
    assert_eq!((field.count(), field.generation()), (100, 1));

    field.rebuild(10, &mut rng);
    assert_eq!((field.count(), field.generation()), (10, 2));
    assert_ne!(field.particles()[0].base_position(), first);
}

#[test]
fn disposed_field_ignores_updates_and_rebuilds() {
    let mut field = populated(8);
    field.dispose();
    assert_eq!(field.phase(), FieldPhase::Disposed);
    assert_eq!(field.count(), 0);

    field.update(500.0, 1.0);
    field.rebuild(8, &mut StdRng::seed_from_u64(3));
    assert_eq!(field.phase(), FieldPhase::Disposed);
    assert_eq!(field.count(), 0);
    assert_eq!(field.generation(), 1);
}

#[test]
fn only_a_count_edit_rebuilds_the_field() {
    let mut ctx = seeded_context();
    assert_eq!(ctx.particles.count(), 500);
    let generation = ctx.particles.generation();

    assert_eq!(ctx.apply(ParamEdit::ParticleSize(0.1)), ParamChange::Updated);
    assert_eq!(ctx.apply(ParamEdit::ParticleSpeed(3.0)), ParamChange::Updated);
    assert_eq!(ctx.particles.generation(), generation);

    assert_eq!(ctx.apply(ParamEdit::ParticleCount(500)), ParamChange::Unchanged);
    assert_eq!(ctx.particles.generation(), generation);

    assert_eq!(
        ctx.apply(ParamEdit::ParticleCount(1200)),
        ParamChange::RebuildParticles(1200)
    );
    assert_eq!(ctx.particles.count(), 1200);
    assert_eq!(ctx.particles.generation(), generation + 1);

    assert_eq!(
        ctx.apply(ParamEdit::ParticleCount(9000)),
        ParamChange::RebuildParticles(5000)
    );
    assert_eq!(ctx.particles.count(), ctx.params.particles.count);
}
