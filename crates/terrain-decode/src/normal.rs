//! Normal map chunk decoding.

use crate::error::{DecodeError, DecodeResult};
use crate::grid::GridDims;
use crate::pixels::decode_png_with_width;
use crate::reader::ByteReader;
use crate::{ChunkKind, NodePayload};

/// Decode the decompressed normal chunk.
///
/// Every node is a 4-channel 8-bit image, read blue first (BGRA). Each
/// channel byte maps to `b / 255 + 0.5`. Nodes keep their stored order.
pub fn decode_normals(
    data: &[u8],
    node_count: usize,
    grid: Option<GridDims>,
) -> DecodeResult<Vec<NodePayload>> {
    let grid = GridDims::require(
        grid,
        node_count,
        "normal chunk needs the terrain grid dimensions",
    )?;

    let mut reader = ByteReader::new(data);
    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        nodes.push(NodePayload::Dense(decode_node(&mut reader, grid)?));
    }
    Ok(nodes)
}

fn decode_node(reader: &mut ByteReader<'_>, grid: GridDims) -> DecodeResult<Vec<f32>> {
    let pixels = decode_png_with_width(reader.read_sized()?, ChunkKind::Normal, 4)?;
    let pixel_count = pixels.pixel_count();

    // Samples are scattered into one bucket per grid row, concatenated after.
    // The bucket index is the node's pixel count modulo the grid width, so a
    // whole node always lands in a single bucket. Suspect, but kept until it
    // can be checked against a known-good editor file.
    let mut buckets: Vec<Vec<f32>> = vec![Vec::new(); grid.y];
    let bucket = pixel_count % grid.x;
    let Some(target) = buckets.get_mut(bucket) else {
        return Err(DecodeError::GridMismatch {
            height: grid.x,
            width: grid.y,
            len: bucket + 1,
        });
    };

    target.reserve(pixel_count * 4);
    for pixel in pixels.data.chunks_exact(4) {
        target.extend(pixel.iter().map(|&b| f32::from(b) / 255.0 + 0.5));
    }

    Ok(buckets.concat())
}
