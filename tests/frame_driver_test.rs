use cgmath::Vector3;
use futures::FutureExt;
use tableau::{
    data_structures::{particle::{FieldPhase, displaced}, scene_graph::ObjectKey},
    flow::FrameDriver,
    params::ParamEdit,
    render::RenderBackend,
    scene::TABLE_KEY,
};

use crate::common::test_utils::{
    FixedClock, RecordingBackend, Stub, StubLoader, assert_close, assert_vec_close, box_mesh,
    seeded_context,
};

mod common;

#[test]
fn camera_starts_on_the_positive_x_axis() {
    let mut ctx = seeded_context();
    let mut backend = RecordingBackend::default();
    let mut driver = FrameDriver::new(FixedClock::at(0.0));

    assert!(driver.tick(&mut ctx, &mut backend));

    let camera = backend.frames[0].camera_position;
    assert_vec_close(camera, Vector3::new(10.0, ctx.config.camera.height, 0.0));
}

#[test]
fn camera_orbit_speeds_up_with_spin_speed() {
    let mut ctx = seeded_context();
    let mut backend = RecordingBackend::default();
    let clock = FixedClock::at(1950.0 * std::f64::consts::FRAC_PI_2);
    let mut driver = FrameDriver::new(clock);

    driver.tick(&mut ctx, &mut backend);
    let quarter = backend.frames[0].camera_position;
    assert_close(quarter.x, 0.0);
    assert_close(quarter.z, 10.0);

    // divisor 2050 - 1075 = 975, so the same instant is half a turn further
    ctx.apply(ParamEdit::SpinSpeed(1075.0));
    ctx.apply(ParamEdit::SpinDistance(4.0));
    driver.tick(&mut ctx, &mut backend);
    let half = backend.frames[1].camera_position;
    assert_close(half.x, -4.0);
    assert_close(half.z, 0.0);
}

#[test]
fn render_sees_particles_before_they_are_advanced() {
    let mut ctx = seeded_context();
    let mut backend = RecordingBackend::default();
    let mut driver = FrameDriver::new(FixedClock::at(1234.0));

    let bases: Vec<_> = ctx.particles.particles().iter().map(|p| p.base_position()).collect();
    driver.tick(&mut ctx, &mut backend);

    assert_eq!(backend.frames[0].display_positions, bases);
    let t = 1234.0 / 1000.0 * ctx.params.particles.speed as f64;
    for (i, particle) in ctx.particles.particles().iter().enumerate() {
        assert_eq!(particle.display_position(), displaced(bases[i], i, t));
    }
}

#[test]
fn each_tick_reads_the_latest_parameters() {
    let mut ctx = seeded_context();
    let mut backend = RecordingBackend::default();
    let clock = FixedClock::at(0.0);
    let mut driver = FrameDriver::new(clock);

    driver.tick(&mut ctx, &mut backend);
    ctx.apply(ParamEdit::ParticleCount(42));
    driver.clock().set(16.0);
    driver.tick(&mut ctx, &mut backend);

    let counts: Vec<_> = backend.frames.iter().map(|f| (f.particles, f.instances)).collect();
    assert_eq!(counts, vec![(500, 500), (42, 42)]);
    assert_eq!(backend.frames[1].generation, backend.frames[0].generation + 1);
    assert_eq!(driver.ticks(), 2);
}

#[test]
fn failing_render_does_not_stop_the_loop() {
    let mut ctx = seeded_context();
    let mut backend = RecordingBackend {
        fail: true,
        ..Default::default()
    };
    let mut driver = FrameDriver::new(FixedClock::at(500.0));

    assert!(driver.tick(&mut ctx, &mut backend));
    assert!(driver.tick(&mut ctx, &mut backend));
    assert_eq!(backend.frames.len(), 2);
    let base = ctx.particles.particles()[0].base_position();
    assert_ne!(ctx.particles.particles()[0].display_position(), base);
}

#[test]
fn ticks_keep_drawing_while_a_load_is_pending() {
    let mut ctx = seeded_context();
    let loader = StubLoader::new()
        .with("mooncake.obj", Stub::Ready(box_mesh("cake", [2.0, 2.0, 0.5], [0.0; 3])))
        .with("mooncake_tall.obj", Stub::Pending)
        .with("plate.obj", Stub::Fail("corrupt"));
    let mut backend = RecordingBackend::default();
    let mut driver = FrameDriver::new(FixedClock::at(0.0));

    driver.tick(&mut ctx, &mut backend);
    for request in ctx.requests(&loader) {
        if let Some(completion) = request.now_or_never() {
            ctx.complete(completion);
        }
        driver.tick(&mut ctx, &mut backend);
    }

    let objects: Vec<_> = backend.frames.iter().map(|f| f.objects).collect();
    assert_eq!(objects, vec![1, 2, 3, 4, 4, 4, 4]);
    assert!(ctx.scene.contains(&TABLE_KEY));
    assert!(!ctx.scene.contains(&ObjectKey::Slot(3)));
    assert!(!ctx.scene.contains(&ObjectKey::Slot(5)));
    assert_eq!(ctx.loads().pending(), 2);
}

#[test]
fn stopped_driver_no_longer_ticks() {
    let mut ctx = seeded_context();
    let loader = StubLoader::new()
        .with("mooncake.obj", Stub::Ready(box_mesh("cake", [2.0, 2.0, 0.5], [0.0; 3])))
        .with("mooncake_tall.obj", Stub::Ready(box_mesh("tall", [1.4, 1.4, 0.5], [0.0; 3])))
        .with("plate.obj", Stub::Ready(box_mesh("plate", [60.0, 60.0, 2.0], [0.0; 3])));
    let mut backend = RecordingBackend::default();
    let mut driver = FrameDriver::new(FixedClock::at(0.0));

    let in_flight = ctx.requests(&loader);
    driver.tick(&mut ctx, &mut backend);
    driver.stop();
    ctx.teardown();

    for request in in_flight {
        let completion = request.now_or_never().expect("stub loads are ready");
        ctx.complete(completion);
    }
    assert_eq!(ctx.loads().pending(), 0);

    assert!(!driver.is_running());
    assert!(!driver.tick(&mut ctx, &mut backend));
    assert_eq!(backend.frames.len(), 1);
    assert_eq!(driver.ticks(), 1);
    assert_eq!(ctx.particles.phase(), FieldPhase::Disposed);
    assert!(ctx.scene.is_empty());
}

#[test]
fn resize_updates_aspect_and_ignores_zero_sizes() {
    let mut ctx = seeded_context();
    let mut backend = RecordingBackend::default();

    ctx.resize(1600, 800);
    backend.resize(1600, 800);
    assert_close(ctx.projection.aspect(), 2.0);

    ctx.resize(0, 0);
    assert_close(ctx.projection.aspect(), 2.0);
    ctx.resize(1600, 800);
    assert_close(ctx.projection.aspect(), 2.0);
    assert_eq!(backend.sizes, vec![(1600, 800)]);
}
