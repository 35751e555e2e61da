//! GLB container framing.

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F534A;
const CHUNK_BIN: u32 = 0x004E4942;

/// Append one GLB chunk, padded to 4 bytes with `pad`
fn push_chunk(glb: &mut Vec<u8>, kind: u32, data: &[u8], pad: u8) {
    let padded = data.len().next_multiple_of(4);
    glb.extend_from_slice(&(padded as u32).to_le_bytes());
    glb.extend_from_slice(&kind.to_le_bytes());
    glb.extend_from_slice(data);
    glb.resize(glb.len() + padded - data.len(), pad);
}

/// Frame a finished glTF document and its BIN payload as GLB.
///
/// The document must already declare `buffers[0].byteLength == bin.len()`.
pub fn assemble_glb(root: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
    let json = serde_json::to_vec(root).expect("Failed to serialize glTF JSON");

    let mut glb = Vec::new();
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&0u32.to_le_bytes()); // total length, patched below
    push_chunk(&mut glb, CHUNK_JSON, &json, b' ');
    push_chunk(&mut glb, CHUNK_BIN, bin, 0);

    let total = glb.len() as u32;
    glb[8..12].copy_from_slice(&total.to_le_bytes());
    glb
}
