//! Scene folder conversion: `scene.xscene` + `terrain.bin` to
//! `<out>/<scene name>/terrain_ed.bin`.

use std::io;
use std::path::{Path, PathBuf};

use crate::container::TerrainContainer;
use crate::editor::{self, EncodeOptions};
use crate::error::{Error, Result};
use crate::scene::SceneMetadata;

pub const SCENE_FILE: &str = "scene.xscene";
pub const CONTAINER_FILE: &str = "terrain.bin";
pub const EDITOR_FILE: &str = "terrain_ed.bin";

#[must_use]
pub fn is_scene_folder(dir: &Path) -> bool {
    dir.join(SCENE_FILE).is_file()
}

/// Folders to convert: `src` itself when it holds a scene, otherwise each of
/// its subfolders in name order.
pub fn scene_folders(src: &Path) -> Result<Vec<PathBuf>> {
    if is_scene_folder(src) {
        return Ok(vec![src.to_path_buf()]);
    }

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(src).map_err(|e| Error::io(src, e))? {
        let path = entry.map_err(|e| Error::io(src, e))?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// Convert one scene folder and return the path written.
pub fn convert_scene(src: &Path, out: &Path, options: &EncodeOptions) -> Result<PathBuf> {
    let scene_path = src.join(SCENE_FILE);
    if !scene_path.is_file() {
        return Err(Error::io(
            scene_path,
            io::Error::new(io::ErrorKind::NotFound, "not a scene folder"),
        ));
    }

    let scene = SceneMetadata::read(&scene_path)?;
    let name = scene
        .name
        .clone()
        .ok_or(Error::MissingMetadata("scene has no name"))?;
    let container = TerrainContainer::open(src.join(CONTAINER_FILE), Some(&scene))?;
    let bytes = editor::encode(&container, &scene, options)?;

    let target_dir = out.join(&name);
    std::fs::create_dir_all(&target_dir).map_err(|e| Error::io(&target_dir, e))?;
    let target = target_dir.join(EDITOR_FILE);
    std::fs::write(&target, &bytes).map_err(|e| Error::io(&target, e))?;

    tracing::info!(
        "Converted scene '{}' ({} bytes) to {}",
        name,
        bytes.len(),
        target.display()
    );
    Ok(target)
}
