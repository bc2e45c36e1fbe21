//! Convert compiled terrain containers into editor terrain files.
//!
//! Built on [`terrain_decode`], this crate adds the parts that touch the
//! filesystem or span several chunks:
//!
//! - [`SceneMetadata`]: the `scene.xscene` description (grid size, height
//!   bounds, per-node detail levels and season masks)
//! - [`TerrainContainer`]: a fully decoded `terrain.bin`
//! - [`editor`]: the `terrain_ed.bin` encoder and decoder
//! - [`convert`]: whole scene folder conversion
//!
//! # Example
//!
//! ```no_run
//! use terrain::{EncodeOptions, SceneMetadata, TerrainContainer, editor};
//!
//! let scene = SceneMetadata::read("scenes/hills/scene.xscene")?;
//! let container = TerrainContainer::open("scenes/hills/terrain.bin", Some(&scene))?;
//! let bytes = editor::encode(&container, &scene, &EncodeOptions::default())?;
//! # Ok::<(), terrain::Error>(())
//! ```

mod error;

pub mod container;
pub mod convert;
pub mod editor;
pub mod scene;

pub use container::{Chunk, ChunkFrame, TerrainContainer};
pub use editor::{
    EditorFile, EditorHeader, EditorNode, EncodeOptions, HeightSamples, NormalLayout, WeightLayer,
};
pub use error::{Error, Result};
pub use scene::{SceneMetadata, SceneNode, SeasonMasks};
