//! Application state shared by the frame driver and the load coordinator.
//!
//! There are no globals: the [`Context`] owns the live parameters, the scene
//! graph, the particle field and the camera, and is handed to whoever needs
//! them.

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    camera::{Camera, Projection},
    config::Config,
    data_structures::{
        particle::ParticleField,
        scene_graph::SceneGraph,
    },
    error::Result,
    params::{ParamChange, ParamEdit, Params},
    pipelines::light::LightUniform,
    render::Frame,
    resources::{
        MeshLoader,
        coordinator::{CompletionFuture, LoadCompletion, LoadCoordinator, ManifestEntry},
        placement::PlacementTable,
    },
    scene,
};

pub struct Context {
    pub params: Params,
    pub config: Config,
    pub scene: SceneGraph,
    pub particles: ParticleField,
    pub camera: Camera,
    pub projection: Projection,
    loads: LoadCoordinator,
    rng: StdRng,
}

impl Context {
    /// Builds the session state with the table in place and the particle field populated.
    ///
    /// Fails when a manifest entry has no placement.
    pub fn new(
        config: Config,
        params: Params,
        manifest: Vec<ManifestEntry>,
        placements: &PlacementTable,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let loads = LoadCoordinator::new(manifest, placements)?;
        let rng = match config.particle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut scene = SceneGraph::new();
        scene.add(scene::table());

        let mut camera = Camera::new((params.spin.distance, config.camera.height, 0.0));
        camera.orbit(0.0, &params.spin, config.camera.height);
        let projection = Projection::new(width, height, &config.camera);

        let mut ctx = Self {
            params,
            config,
            scene,
            particles: ParticleField::new(),
            camera,
            projection,
            loads,
            rng,
        };
        ctx.particles.rebuild(ctx.params.particles.count, &mut ctx.rng);
        Ok(ctx)
    }

    /// The default tableau.
    pub fn with_defaults(config: Config, width: u32, height: u32) -> Result<Self> {
        Self::new(
            config,
            Params::default(),
            scene::default_manifest(),
            &scene::default_placements(),
            width,
            height,
        )
    }

    /// Applies a live parameter write, rebuilding the particle field when the count changed.
    pub fn apply(&mut self, edit: ParamEdit) -> ParamChange {
        let change = self.params.apply(edit);
        if let ParamChange::RebuildParticles(count) = change {
            self.particles.rebuild(count, &mut self.rng);
        }
        change
    }

    pub fn loads(&self) -> &LoadCoordinator {
        &self.loads
    }

    /// Issues one load per manifest entry for the current epoch.
    pub fn requests<L: MeshLoader + ?Sized>(&self, loader: &L) -> Vec<CompletionFuture> {
        self.loads.requests(loader)
    }

    /// Drops every loaded object and issues the manifest again.
    pub fn reload<L: MeshLoader + ?Sized>(&mut self, loader: &L) -> Vec<CompletionFuture> {
        self.loads.reload(&mut self.scene, loader)
    }

    /// Places a finished load. Failures are logged and only affect that one slot.
    pub fn complete(&mut self, completion: LoadCompletion) {
        self.loads.complete_logged(completion, &mut self.scene);
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            camera: &self.camera,
            projection: &self.projection,
            scene: &self.scene,
            particles: &self.particles,
            particle_size: self.params.particles.size,
            light: LightUniform::new(&self.params.light, &self.config),
            clear_colour: self.config.clear_colour,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Releases the particle field, empties the scene graph and closes the load coordinator
    /// so loads finishing afterwards are dropped.
    pub fn teardown(&mut self) {
        self.loads.close();
        self.particles.dispose();
        self.scene.clear();
        log::info!("Tableau torn down");
    }
}
