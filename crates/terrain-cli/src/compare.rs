//! Structural and bit-level comparison of two editor files.
//!
//! Prints one section per header, grid and mismatching node, then an overall
//! verdict. Floats are compared by bit pattern.

use std::path::Path;

use terrain::{EditorFile, EditorHeader, EditorNode, editor};

use crate::read_file;

/// Returns whether the files match.
pub fn run(left: &Path, right: &Path) -> terrain::Result<bool> {
    println!("Left: {}", left.display());
    println!("Right: {}\n", right.display());
    let left = editor::decode(&read_file(left)?)?;
    let right = editor::decode(&read_file(right)?)?;
    Ok(compare_files(&left, &right))
}

fn compare_files(left: &EditorFile, right: &EditorFile) -> bool {
    let mut all_passed = true;

    println!("--- Header ---");
    report(compare_header(&left.header, &right.header), &mut all_passed);

    println!("--- Grid ---");
    let grid = compare_u64(
        "dim_x",
        left.dimensions.0.into(),
        right.dimensions.0.into(),
    )
    .and_then(|()| {
        compare_u64(
            "dim_y",
            left.dimensions.1.into(),
            right.dimensions.1.into(),
        )
    })
    .and_then(|()| {
        compare_u64(
            "node_count",
            left.nodes.len() as u64,
            right.nodes.len() as u64,
        )
    });
    let grid_matches = grid.is_ok();
    report(grid, &mut all_passed);

    if grid_matches {
        let mut matching = 0;
        for (l, r) in left.nodes.iter().zip(&right.nodes) {
            if let Err(e) = compare_node(l, r) {
                println!("--- Node {:?} ---", l.position);
                println!("FAILED: {e}\n");
                all_passed = false;
            } else {
                matching += 1;
            }
        }
        println!("{matching} of {} nodes match\n", left.nodes.len());
    }

    if all_passed {
        println!("All comparisons PASSED!");
    } else {
        println!("Some comparisons FAILED!");
    }
    all_passed
}

fn report(result: Result<(), String>, all_passed: &mut bool) {
    match result {
        Ok(()) => println!("PASSED\n"),
        Err(e) => {
            println!("FAILED: {e}\n");
            *all_passed = false;
        }
    }
}

fn compare_header(left: &EditorHeader, right: &EditorHeader) -> Result<(), String> {
    compare_u64("scene_id", left.scene_id, right.scene_id)?;
    compare_i64("version", left.version, right.version)?;
    compare_i64(
        "decompressed_size",
        left.decompressed_size,
        right.decompressed_size,
    )?;
    compare_i64("reserved", left.reserved, right.reserved)?;
    // Compressed sizes depend on the encoder and are informational only.
    println!(
        "  compressed_size: left={}, right={}",
        left.compressed_size, right.compressed_size
    );
    Ok(())
}

fn compare_node(left: &EditorNode, right: &EditorNode) -> Result<(), String> {
    if left.position != right.position {
        return Err(format!(
            "position mismatch: left={:?}, right={:?}",
            left.position, right.position
        ));
    }
    if left.masks != right.masks {
        return Err(format!(
            "masks mismatch: left={:?}, right={:?}",
            left.masks, right.masks
        ));
    }
    if left.normal_resolution != right.normal_resolution
        || left.height_resolution != right.height_resolution
    {
        return Err(format!(
            "resolution mismatch: left=({:?}, {:?}), right=({:?}, {:?})",
            left.normal_resolution,
            left.height_resolution,
            right.normal_resolution,
            right.height_resolution
        ));
    }

    compare_f32_bits("normals", &left.normals, &right.normals)?;
    compare_f32_bits("vertex_block", &left.vertex_block, &right.vertex_block)?;
    if left.reserved_levels != right.reserved_levels {
        return Err("reserved_levels mismatch".to_string());
    }
    compare_f32_bits("heights", &left.heights, &right.heights)?;

    if left.materials.len() != right.materials.len() {
        return Err(format!(
            "material count mismatch: left={}, right={}",
            left.materials.len(),
            right.materials.len()
        ));
    }
    for (i, (l, r)) in left.materials.iter().zip(&right.materials).enumerate() {
        if l.index != r.index {
            return Err(format!(
                "materials[{i}].index: mismatch: left={}, right={}",
                l.index, r.index
            ));
        }
        compare_f32_bits(&format!("materials[{i}].weights"), &l.weights, &r.weights)?;
    }

    Ok(())
}

fn compare_u64(name: &str, left: u64, right: u64) -> Result<(), String> {
    if left != right {
        return Err(format!("{name}: mismatch: left={left}, right={right}"));
    }
    println!("  {name}: {left}");
    Ok(())
}

fn compare_i64(name: &str, left: i64, right: i64) -> Result<(), String> {
    if left != right {
        return Err(format!("{name}: mismatch: left={left}, right={right}"));
    }
    println!("  {name}: {left}");
    Ok(())
}

fn compare_f32_bits(name: &str, left: &[f32], right: &[f32]) -> Result<(), String> {
    if left.len() != right.len() {
        return Err(format!(
            "{name}: length mismatch: left={}, right={}",
            left.len(),
            right.len()
        ));
    }

    let mut differing = left
        .iter()
        .zip(right)
        .enumerate()
        .filter(|(_, (l, r))| l.to_bits() != r.to_bits());
    if let Some((i, (l, r))) = differing.next() {
        let count = 1 + differing.count();
        return Err(format!(
            "{name}[{i}]: mismatch: left={l}, right={r} ({count} of {} differ)",
            left.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain::SeasonMasks;
    use terrain::editor::RESERVED_LEVEL_WORDS;

    fn node(height: f32) -> EditorNode {
        EditorNode {
            position: (0, 0),
            masks: SeasonMasks::default(),
            normal_resolution: (2, 2),
            normals: vec![0.5; 16],
            height_resolution: (2, 2),
            vertex_block: vec![0.0; 4],
            reserved_levels: [2; RESERVED_LEVEL_WORDS],
            heights: vec![height; 4],
            materials: Vec::new(),
        }
    }

    fn file(nodes: Vec<EditorNode>) -> EditorFile {
        EditorFile {
            header: EditorHeader::new(10, 100, 1),
            dimensions: (1, nodes.len() as u32),
            nodes,
        }
    }

    #[test]
    fn identical_files_pass() {
        assert!(compare_files(&file(vec![node(1.0)]), &file(vec![node(1.0)])));
    }

    #[test]
    fn height_difference_fails() {
        assert!(!compare_files(&file(vec![node(1.0)]), &file(vec![node(2.0)])));
    }

    #[test]
    fn signed_zero_is_a_bit_difference() {
        let err = compare_f32_bits("heights", &[0.0, 1.0], &[-0.0, 1.0]).unwrap_err();
        assert!(err.starts_with("heights[0]"));
        assert!(err.contains("1 of 2 differ"));
    }

    #[test]
    fn identical_nan_bits_match() {
        assert!(compare_f32_bits("x", &[f32::NAN], &[f32::NAN]).is_ok());
    }

    #[test]
    fn grid_mismatch_skips_nodes() {
        assert!(!compare_files(
            &file(vec![node(1.0)]),
            &file(vec![node(1.0), node(1.0)])
        ));
    }
}
