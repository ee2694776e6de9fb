use std::io::{BufReader, Cursor};

use anyhow::Context as _;

use crate::data_structures::mesh::MeshResource;

/// Decodes `bytes` according to the extension of `file_name`.
pub fn decode(file_name: &str, bytes: &[u8]) -> anyhow::Result<MeshResource> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let mut mesh = match extension.as_deref() {
        Some("obj") => decode_obj(file_name, bytes)?,
        Some("gltf") | Some("glb") => decode_gltf(file_name, bytes)?,
        other => anyhow::bail!("unsupported mesh format {:?} for {}", other, file_name),
    };
    mesh.ensure_normals();
    Ok(mesh)
}

/**
 * All models of an obj file are merged into one mesh. Materials are ignored as the
 * tableau assigns its own per manifest entry.
 */
pub fn decode_obj(file_name: &str, bytes: &[u8]) -> anyhow::Result<MeshResource> {
    let mut reader = BufReader::new(Cursor::new(bytes));
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .with_context(|| format!("could not parse {}", file_name))?;

    let mut mesh = MeshResource::new(file_name, Vec::new(), Vec::new());
    let mut with_normals = true;
    for m in models.iter() {
        let base = mesh.positions.len() as u32;
        let count = m.mesh.positions.len() / 3;
        mesh.positions.extend(
            m.mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]]),
        );
        if m.mesh.normals.len() == count * 3 {
            mesh.normals
                .extend(m.mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
        } else {
            with_normals = false;
        }
        mesh.indices.extend(m.mesh.indices.iter().map(|i| base + i));
    }
    if !with_normals {
        // partial normals are worse than none, recompute all of them
        mesh.normals.clear();
    }
    Ok(mesh)
}

/**
 * Reads positions, normals and indices of every primitive of every mesh. Node transforms
 * are not applied since the tableau normalises and places the result anyway.
 */
pub fn decode_gltf(file_name: &str, bytes: &[u8]) -> anyhow::Result<MeshResource> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).with_context(|| format!("could not parse {}", file_name))?;

    let mut mesh = MeshResource::new(file_name, Vec::new(), Vec::new());
    let mut with_normals = true;
    for gltf_mesh in document.meshes() {
        for primitive in gltf_mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let base = mesh.positions.len() as u32;
            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(positions) => positions.collect(),
                None => {
                    log::warn!(
                        "Primitive {} of mesh {:?} in {} has no positions",
                        primitive.index(),
                        gltf_mesh.name(),
                        file_name
                    );
                    continue;
                }
            };
            match reader.read_normals() {
                Some(normals) => mesh.normals.extend(normals),
                None => with_normals = false,
            }
            match reader.read_indices() {
                Some(indices) => mesh.indices.extend(indices.into_u32().map(|i| base + i)),
                None => mesh
                    .indices
                    .extend((0..positions.len() as u32).map(|i| base + i)),
            }
            mesh.positions.extend(positions);
        }
    }
    if !with_normals {
        mesh.normals.clear();
    }
    Ok(mesh)
}
