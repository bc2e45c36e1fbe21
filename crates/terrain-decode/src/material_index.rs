//! Material-index chunk decoding.

use crate::NodePayload;
use crate::error::DecodeResult;
use crate::pixels::{decode_png, pixels_to_floats};
use crate::reader::ByteReader;

/// Number of material-index layers, independent of the node count.
pub const MATERIAL_INDEX_LAYERS: usize = 4;

/// Decode the decompressed material-index chunk into `layers` dense arrays.
///
/// The images carry shifted grid dimensions in their IHDR rather than a
/// resolution, so no reordering is attempted.
pub fn decode_material_index(data: &[u8], layers: usize) -> DecodeResult<Vec<NodePayload>> {
    let mut reader = ByteReader::new(data);
    let mut out = Vec::with_capacity(layers);
    for _ in 0..layers {
        let pixels = decode_png(reader.read_sized()?)?;
        out.push(NodePayload::Dense(pixels_to_floats(&pixels)));
    }
    Ok(out)
}
