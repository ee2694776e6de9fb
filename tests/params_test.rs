use cgmath::Vector3;
use tableau::{
    config::Config,
    flow::{KeyAction, key_action},
    params::{CameraSpin, LightParams, ParamChange, ParamEdit, Params},
    pipelines::light::LightUniform,
};
use winit::keyboard::KeyCode;

use crate::common::test_utils::{assert_close, assert_vec_close};

mod common;

#[test]
fn edits_are_clamped_to_panel_ranges() {
    let mut params = Params::default();

    params.apply(ParamEdit::LightPosition(Vector3::new(-50.0, 45.0, 3.0)));
    assert_vec_close(params.light.position, Vector3::new(-20.0, 30.0, 3.0));

    params.apply(ParamEdit::LightIntensity(10.0));
    assert_close(params.light.intensity, 50.0);
    params.apply(ParamEdit::LightAngle(3.0));
    assert_close(params.light.angle, std::f32::consts::FRAC_PI_2);
    params.apply(ParamEdit::LightPenumbra(-1.0));
    assert_close(params.light.penumbra, 0.0);
    params.apply(ParamEdit::SpinSpeed(2050.0));
    assert_close(params.spin.speed, 2000.0);
    params.apply(ParamEdit::SpinDistance(1.0));
    assert_close(params.spin.distance, 2.0);
    params.apply(ParamEdit::ParticleSize(1.0));
    assert_close(params.particles.size, 0.2);
    params.apply(ParamEdit::ParticleSpeed(f32::NAN));
    assert_close(params.particles.speed, 0.0);
}

#[test]
fn apply_reports_what_changed() {
    let mut params = Params::default();
    assert_eq!(params.apply(ParamEdit::SpinDistance(10.0)), ParamChange::Unchanged);
    assert_eq!(params.apply(ParamEdit::SpinDistance(12.0)), ParamChange::Updated);
    assert_eq!(
        params.apply(ParamEdit::ParticleCount(0)),
        ParamChange::RebuildParticles(0)
    );
    assert_eq!(params.apply(ParamEdit::ParticleCount(0)), ParamChange::Unchanged);
}

#[test]
fn orbit_divisor_never_reaches_zero() {
    let spin = CameraSpin {
        distance: 10.0,
        speed: 2050.0,
    };
    let angle = spin.angle(1000.0);
    assert!(angle.is_finite());
    assert!((angle - 20.0).abs() < 1e-9);

    let slowest = CameraSpin {
        distance: 10.0,
        speed: 0.0,
    };
    assert!((slowest.angle(1950.0) - 1.0).abs() < 1e-9);
}

#[test]
fn keys_step_parameters_from_their_current_value() {
    let params = Params::default();
    assert_eq!(
        key_action(KeyCode::ArrowRight, &params),
        Some(KeyAction::Edit(ParamEdit::SpinSpeed(200.0)))
    );
    assert_eq!(
        key_action(KeyCode::Equal, &params),
        Some(KeyAction::Edit(ParamEdit::ParticleCount(600)))
    );
    assert_eq!(
        key_action(KeyCode::KeyW, &params),
        Some(KeyAction::Edit(ParamEdit::LightPosition(Vector3::new(
            5.0, 10.0, 4.0
        ))))
    );
    assert_eq!(key_action(KeyCode::KeyR, &params), Some(KeyAction::Reload));
    assert_eq!(key_action(KeyCode::F1, &params), None);

    let mut few = Params::default();
    few.apply(ParamEdit::ParticleCount(50));
    assert_eq!(
        key_action(KeyCode::Minus, &few),
        Some(KeyAction::Edit(ParamEdit::ParticleCount(0)))
    );
}

#[test]
fn light_uniform_points_the_cone_at_the_origin() {
    let light = LightParams::default();
    let uniform = LightUniform::new(&light, &Config::default());

    let len = (5.0f32 * 5.0 + 10.0 * 10.0 + 5.0 * 5.0).sqrt();
    assert_vec_close(
        Vector3::from(uniform.direction),
        Vector3::new(-5.0 / len, -10.0 / len, -5.0 / len),
    );
    assert_close(uniform.cos_outer, light.angle.cos());
    assert_close(uniform.cos_inner, (light.angle * 0.7).cos());
    assert!(uniform.cos_inner > uniform.cos_outer);
    assert_close(uniform.intensity, 200.0);
}

#[test]
fn light_at_the_origin_points_down() {
    let light = LightParams {
        position: Vector3::new(0.0, 0.0, 0.0),
        ..Default::default()
    };
    let uniform = LightUniform::new(&light, &Config::default());
    assert_eq!(uniform.direction, [0.0, -1.0, 0.0]);
}
