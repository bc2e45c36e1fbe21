//! Paint weight chunk decoding.

use crate::error::DecodeResult;
use crate::grid::{GridDims, transpose};
use crate::pixels::{decode_png, pixels_to_floats};
use crate::reader::ByteReader;
use crate::{NodePayload, WeightLayers};

/// Presence flag value announcing that a PNG follows.
const LAYER_PRESENT: u32 = 1;

/// Decode the decompressed weight chunk.
///
/// Each node holds sixteen paint-layer slots, each opened by a `u32` flag.
/// Present layers are converted with the pixel-width rule and transposed like
/// heightmaps; the node list is then transposed into row-major order.
pub fn decode_weights(
    data: &[u8],
    node_count: usize,
    grid: Option<GridDims>,
) -> DecodeResult<Vec<NodePayload>> {
    let grid = GridDims::require(
        grid,
        node_count,
        "weight chunk needs the terrain grid dimensions",
    )?;

    let mut reader = ByteReader::new(data);
    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        nodes.push(NodePayload::Weights(decode_node(&mut reader)?));
    }

    transpose(nodes, grid.x, grid.y)
}

fn decode_node(reader: &mut ByteReader<'_>) -> DecodeResult<WeightLayers> {
    let mut layers: WeightLayers = Default::default();
    for layer in &mut layers {
        if reader.read_u32()? != LAYER_PRESENT {
            continue;
        }
        let pixels = decode_png(reader.read_sized()?)?;
        let values = pixels_to_floats(&pixels);
        *layer = Some(transpose(
            values,
            pixels.height as usize,
            pixels.width as usize,
        )?);
    }
    Ok(layers)
}
