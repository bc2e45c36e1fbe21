//! JSON summary of an editor file.

use std::path::Path;

use serde_json::{Value, json};
use terrain::{EditorFile, EditorNode, editor};

use crate::read_file;

pub fn run(file: &Path, dump: Option<&Path>) -> terrain::Result<()> {
    let bytes = read_file(file)?;
    let (header, payload) = editor::unpack(&bytes)?;

    if let Some(dump) = dump {
        std::fs::write(dump, &payload).map_err(|source| terrain::Error::Io {
            path: dump.to_path_buf(),
            source,
        })?;
        tracing::info!("Wrote {} payload bytes to {}", payload.len(), dump.display());
    }

    let (dimensions, nodes) = editor::decode_payload(&payload)?;
    let parsed = EditorFile {
        header,
        dimensions,
        nodes,
    };
    println!("{:#}", summary(&parsed));
    Ok(())
}

fn summary(file: &EditorFile) -> Value {
    json!({
        "scene_id": file.header.scene_id,
        "version": file.header.version,
        "compressed_size": file.header.compressed_size,
        "decompressed_size": file.header.decompressed_size,
        "dimensions": [file.dimensions.0, file.dimensions.1],
        "node_count": file.nodes.len(),
        "nodes": file.nodes.iter().map(node_summary).collect::<Vec<_>>(),
    })
}

fn node_summary(node: &EditorNode) -> Value {
    let (min, max) = bounds(&node.heights);
    json!({
        "position": [node.position.0, node.position.1],
        "masks": {
            "summer": node.masks.summer,
            "fall": node.masks.fall,
            "winter": node.masks.winter,
            "spring": node.masks.spring,
        },
        "normal_resolution": [node.normal_resolution.0, node.normal_resolution.1],
        "height_resolution": [node.height_resolution.0, node.height_resolution.1],
        "height_min": min,
        "height_max": max,
        "materials": node.materials.iter().map(|m| m.index).collect::<Vec<_>>(),
    })
}

fn bounds(values: &[f32]) -> (Option<f32>, Option<f32>) {
    let min = values.iter().copied().reduce(f32::min);
    let max = values.iter().copied().reduce(f32::max);
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain::SeasonMasks;
    use terrain::editor::{EditorHeader, RESERVED_LEVEL_WORDS, WeightLayer};

    #[test]
    fn summary_lists_nodes_and_materials() {
        let node = EditorNode {
            position: (1, 0),
            masks: SeasonMasks {
                summer: 1,
                fall: 2,
                winter: 3,
                spring: 4,
            },
            normal_resolution: (2, 2),
            normals: vec![0.5; 16],
            height_resolution: (2, 2),
            vertex_block: vec![0.0; 4],
            reserved_levels: [2; RESERVED_LEVEL_WORDS],
            heights: vec![3.0, -1.0, 8.0, 2.0],
            materials: vec![WeightLayer {
                index: 5,
                weights: vec![0.0; 4],
            }],
        };
        let file = EditorFile {
            header: EditorHeader::new(10, 20, 99),
            dimensions: (2, 1),
            nodes: vec![node],
        };

        let value = summary(&file);
        assert_eq!(value["scene_id"], 99);
        assert_eq!(value["compressed_size"], 50);
        assert_eq!(value["nodes"][0]["height_min"], -1.0);
        assert_eq!(value["nodes"][0]["height_max"], 8.0);
        assert_eq!(value["nodes"][0]["materials"], json!([5]));
        assert_eq!(value["nodes"][0]["masks"]["spring"], 4);
    }

    #[test]
    fn empty_heights_have_no_bounds() {
        assert_eq!(bounds(&[]), (None, None));
    }
}
