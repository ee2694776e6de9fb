//! Asynchronous loading and placement of the tableau's models.
//!
//! The coordinator owns a fixed manifest. [`LoadCoordinator::requests`] turns
//! every entry into an independent future; each future carries the index of
//! the slot it was issued for, bound by value when the request is created.
//! Whoever drives the futures hands the resulting [`LoadCompletion`]s back to
//! [`LoadCoordinator::complete`] in whatever order they arrive. Placement only
//! ever looks at data stored for that one slot, so the final scene is the
//! same for every completion order.

use std::{future::Future, pin::Pin};

use crate::{
    data_structures::{
        mesh::MeshResource,
        scene_graph::{Material, ObjectKey, SceneGraph, SceneObject},
    },
    error::{Result, TableauError},
    resources::{
        MeshLoader,
        normalize::normalize,
        placement::{PlacementSpec, PlacementTable},
    },
};

/// One model to load: where it comes from, where it goes and what it looks like.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestEntry {
    pub path: String,
    pub placement: String,
    pub material: Material,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>, placement: impl Into<String>, material: Material) -> Self {
        Self {
            path: path.into(),
            placement: placement.into(),
            material,
        }
    }
}

/// A manifest entry with its placement already resolved.
#[derive(Clone, Debug)]
struct Slot {
    path: String,
    placement: PlacementSpec,
    material: Material,
    state: SlotState,
}

/// Where a slot stands within the current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Requested, no completion seen yet.
    Pending,
    Placed,
    /// The load or the geometry failed. The slot stays empty until a reload.
    Failed,
}

/// Outcome of a single issued request.
#[derive(Debug)]
pub struct LoadCompletion {
    pub slot: usize,
    pub epoch: u64,
    pub result: anyhow::Result<MeshResource>,
}

#[cfg(not(target_arch = "wasm32"))]
pub type CompletionFuture = Pin<Box<dyn Future<Output = LoadCompletion> + Send>>;
#[cfg(target_arch = "wasm32")]
pub type CompletionFuture = Pin<Box<dyn Future<Output = LoadCompletion>>>;

/// What happened to a completion handed to [`LoadCoordinator::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placed {
    /// The object was added to the scene graph with this id.
    Added(u64),
    /// The completion belonged to an earlier epoch and was dropped.
    Stale,
}

pub struct LoadCoordinator {
    slots: Vec<Slot>,
    epoch: u64,
    closed: bool,
}

impl LoadCoordinator {
    /// Resolves every manifest entry against `placements`.
    ///
    /// Fails with [`TableauError::Configuration`] when an entry names a
    /// placement the table does not have.
    pub fn new(manifest: Vec<ManifestEntry>, placements: &PlacementTable) -> Result<Self> {
        let slots = manifest
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| {
                let placement = placements.get(&entry.placement).copied().ok_or_else(|| {
                    TableauError::configuration(format!(
                        "manifest entry {} ({}) refers to unknown placement '{}'",
                        idx, entry.path, entry.placement
                    ))
                })?;
                Ok(Slot {
                    path: entry.path,
                    placement,
                    material: entry.material,
                    state: SlotState::Pending,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            slots,
            epoch: 0,
            closed: false,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Slots of the current epoch still waiting for their completion.
    ///
    /// Failed slots are resolved and do not count. A closed coordinator waits for nothing.
    pub fn pending(&self) -> usize {
        if self.closed {
            return 0;
        }
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Pending)
            .count()
    }

    pub fn state(&self, slot: usize) -> Option<SlotState> {
        self.slots.get(slot).map(|s| s.state)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn path(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).map(|s| s.path.as_str())
    }

    /// Issues one load per slot for the current epoch.
    pub fn requests<L>(&self, loader: &L) -> Vec<CompletionFuture>
    where
        L: MeshLoader + ?Sized,
    {
        if self.closed {
            log::warn!("Ignoring load requests on a closed coordinator");
            return Vec::new();
        }
        let epoch = self.epoch;
        self.slots
            .iter()
            .enumerate()
            .map(|(slot, entry)| {
                let load = loader.load(&entry.path);
                let fut: CompletionFuture = Box::pin(async move {
                    LoadCompletion {
                        slot,
                        epoch,
                        result: load.await,
                    }
                });
                fut
            })
            .collect()
    }

    /// Starts a new epoch: placed objects leave the scene and every slot becomes pending.
    ///
    /// Completions still in flight from the previous epoch are ignored when they arrive.
    pub fn reload<L>(&mut self, scene: &mut SceneGraph, loader: &L) -> Vec<CompletionFuture>
    where
        L: MeshLoader + ?Sized,
    {
        if self.closed {
            log::warn!("Ignoring reload of a closed coordinator");
            return Vec::new();
        }
        self.epoch += 1;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            scene.remove(&ObjectKey::Slot(idx));
            slot.state = SlotState::Pending;
        }
        log::info!(
            "Reloading {} assets (epoch {})",
            self.slots.len(),
            self.epoch
        );
        self.requests(loader)
    }

    /// Ends loading for good. Every completion still in flight comes back as [`Placed::Stale`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.epoch += 1;
        log::debug!("Load coordinator closed at epoch {}", self.epoch);
    }

    /// Normalises, places and registers the object of a finished load.
    pub fn complete(
        &mut self,
        completion: LoadCompletion,
        scene: &mut SceneGraph,
    ) -> Result<Placed> {
        let LoadCompletion {
            slot: idx,
            epoch,
            result,
        } = completion;
        if self.closed || epoch != self.epoch {
            log::debug!(
                "Dropping completion for slot {} from epoch {} (current {})",
                idx,
                epoch,
                self.epoch
            );
            return Ok(Placed::Stale);
        }
        let slot = self.slots.get_mut(idx).ok_or_else(|| {
            TableauError::configuration(format!("completion for unknown slot {}", idx))
        })?;
        if slot.state != SlotState::Pending {
            return Err(TableauError::DuplicateCompletion { slot: idx });
        }

        let mesh = match result {
            Ok(mesh) => mesh,
            Err(source) => {
                slot.state = SlotState::Failed;
                return Err(TableauError::AssetLoad {
                    path: slot.path.clone(),
                    source: source.into(),
                });
            }
        };
        let normalization = match normalize(&mesh) {
            Ok(normalization) => normalization,
            Err(e) => {
                slot.state = SlotState::Failed;
                return Err(e);
            }
        };
        let transform = slot.placement.resolve(&normalization);
        let object = SceneObject::new(ObjectKey::Slot(idx), mesh, slot.material, transform)
            .with_normalization(normalization);
        let id = scene.add(object);
        slot.state = SlotState::Placed;
        log::info!(
            "Placed {} in slot {} (scale {:.4})",
            slot.path,
            idx,
            normalization.scale_factor
        );
        Ok(Placed::Added(id))
    }

    /// Like [`LoadCoordinator::complete`] but logs failures instead of returning them.
    ///
    /// Used by the event loop where a bad object must not affect anything else.
    pub fn complete_logged(&mut self, completion: LoadCompletion, scene: &mut SceneGraph) {
        let slot = completion.slot;
        if let Err(e) = self.complete(completion, scene) {
            if matches!(e, TableauError::InvalidGeometry { .. }) {
                log::warn!("Skipping slot {}: {}", slot, e);
            } else {
                log::error!("Slot {} could not be placed: {:#}", slot, anyhow::Error::from(e));
            }
        }
    }
}
