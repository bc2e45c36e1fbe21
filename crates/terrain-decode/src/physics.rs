//! Physics material chunk decoding.

use crate::error::DecodeResult;
use crate::reader::ByteReader;
use crate::{NodePayload, PhysicsLayers};

/// Decode the decompressed physics chunk.
///
/// Each node has four `(u32 index, u32 size, size bytes)` records with one
/// raw byte per vertex. There is no image step and no reordering.
pub fn decode_physics(data: &[u8], node_count: usize) -> DecodeResult<Vec<NodePayload>> {
    let mut reader = ByteReader::new(data);
    let mut nodes = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let mut layers: PhysicsLayers = Default::default();
        for layer in &mut layers {
            // Record index, 0 to 3 in every file seen so far.
            let _index = reader.read_u32()?;
            let size = reader.read_u32()? as usize;
            *layer = Some(reader.read_bytes(size)?.to_vec());
        }
        nodes.push(NodePayload::Physics(layers));
    }
    Ok(nodes)
}
