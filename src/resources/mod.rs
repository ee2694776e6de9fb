use std::{future::Future, path::PathBuf, pin::Pin};

use crate::data_structures::mesh::MeshResource;

/**
 * This module contains all logic for loading, normalising and placing meshes from external files.
 */
pub mod coordinator;
pub mod mesh;
pub mod normalize;
pub mod placement;

/// Future returned by a [`MeshLoader`]. Native loads run on the tokio runtime and must be `Send`.
#[cfg(not(target_arch = "wasm32"))]
pub type LoadFuture = Pin<Box<dyn Future<Output = anyhow::Result<MeshResource>> + Send>>;
#[cfg(target_arch = "wasm32")]
pub type LoadFuture = Pin<Box<dyn Future<Output = anyhow::Result<MeshResource>>>>;

/// Source of raw mesh data.
///
/// Implementations only fetch and decode; normalisation and placement happen
/// in the [`coordinator::LoadCoordinator`] once the future resolves.
pub trait MeshLoader {
    fn load(&self, path: &str) -> LoadFuture;
}

/// Loads `.obj`, `.gltf` and `.glb` files from the asset root.
#[derive(Clone, Debug)]
pub struct FileMeshLoader {
    root: PathBuf,
}

impl FileMeshLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MeshLoader for FileMeshLoader {
    fn load(&self, path: &str) -> LoadFuture {
        let root = self.root.clone();
        let path = path.to_string();
        Box::pin(async move {
            let bytes = load_binary(&root, &path).await?;
            mesh::decode(&path, &bytes)
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(root: &std::path::Path, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window available"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("could not read the page origin"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.display()))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(root: &std::path::Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        reqwest::get(url).await?.error_for_status()?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = root.join(file_name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
    };

    Ok(data)
}
