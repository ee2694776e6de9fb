use std::{cell::Cell, collections::HashMap};

use cgmath::Vector3;
use tableau::{
    config::Config,
    context::Context,
    data_structures::mesh::MeshResource,
    flow::Clock,
    render::{Frame, RenderBackend},
    resources::{LoadFuture, MeshLoader},
};

/// How the stub loader answers a request for one path.
#[derive(Clone)]
pub(crate) enum Stub {
    Ready(MeshResource),
    Fail(&'static str),
    /// Never resolves.
    Pending,
}

#[derive(Clone, Default)]
pub(crate) struct StubLoader {
    answers: HashMap<String, Stub>,
}

impl StubLoader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, path: &str, stub: Stub) -> Self {
        self.answers.insert(path.to_string(), stub);
        self
    }
}

impl MeshLoader for StubLoader {
    fn load(&self, path: &str) -> LoadFuture {
        match self.answers.get(path).cloned() {
            Some(Stub::Ready(mesh)) => Box::pin(async move { Ok(mesh) }),
            Some(Stub::Fail(reason)) => Box::pin(async move { Err(anyhow::anyhow!(reason)) }),
            Some(Stub::Pending) => Box::pin(futures::future::pending()),
            None => {
                let path = path.to_string();
                Box::pin(async move { Err(anyhow::anyhow!("no stub for {}", path)) })
            }
        }
    }
}

/// An axis aligned box of the given size, shifted by `offset`.
pub(crate) fn box_mesh(name: &str, size: [f32; 3], offset: [f32; 3]) -> MeshResource {
    let mut mesh = MeshResource::cuboid(name, size[0], size[1], size[2]);
    for p in mesh.positions.iter_mut() {
        p[0] += offset[0];
        p[1] += offset[1];
        p[2] += offset[2];
    }
    mesh
}

/// Three vertices on the same spot.
pub(crate) fn point_mesh(name: &str) -> MeshResource {
    MeshResource::new(name, vec![[1.0, 2.0, 3.0]; 3], vec![0, 1, 2])
}

pub(crate) fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
}

pub(crate) fn assert_vec_close(a: Vector3<f32>, b: Vector3<f32>) {
    assert_close(a.x, b.x);
    assert_close(a.y, b.y);
    assert_close(a.z, b.z);
}

pub(crate) struct FixedClock(pub(crate) Cell<f64>);

impl FixedClock {
    pub(crate) fn at(millis: f64) -> Self {
        Self(Cell::new(millis))
    }

    pub(crate) fn set(&self, millis: f64) {
        self.0.set(millis);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> f64 {
        self.0.get()
    }
}

/// What a backend saw when it was asked to render.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub(crate) camera_position: Vector3<f32>,
    pub(crate) objects: usize,
    pub(crate) particles: usize,
    pub(crate) generation: u64,
    pub(crate) display_positions: Vec<Vector3<f32>>,
    pub(crate) instances: usize,
}

#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub(crate) frames: Vec<Snapshot>,
    pub(crate) sizes: Vec<(u32, u32)>,
    pub(crate) fail: bool,
}

impl RenderBackend for RecordingBackend {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        let p = frame.camera.position;
        self.frames.push(Snapshot {
            camera_position: Vector3::new(p.x, p.y, p.z),
            objects: frame.scene.len(),
            particles: frame.particles.count(),
            generation: frame.particles.generation(),
            display_positions: frame
                .particles
                .particles()
                .iter()
                .map(|p| p.display_position())
                .collect(),
            instances: frame.particle_instances().len(),
        });
        if self.fail {
            anyhow::bail!("device lost");
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.sizes.push((width, height));
    }
}

/// The default tableau with a fixed particle seed.
pub(crate) fn seeded_context() -> Context {
    let config = Config {
        particle_seed: Some(7),
        ..Default::default()
    };
    match Context::with_defaults(config, 800, 600) {
        Ok(ctx) => ctx,
        Err(e) => panic!("default tableau must be valid: {}", e),
    }
}

/// Every ordering of `0..n`.
pub(crate) fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn go(prefix: &mut Vec<usize>, rest: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if rest.is_empty() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..rest.len() {
            let next = rest.remove(i);
            prefix.push(next);
            go(prefix, rest, out);
            prefix.pop();
            rest.insert(i, next);
        }
    }
    let mut out = Vec::new();
    go(&mut Vec::new(), &mut (0..n).collect(), &mut out);
    out
}
