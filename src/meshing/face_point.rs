//! # Face Point
//!
//! The GPU-facing vertex record emitted by the mesher: one entry per visible
//! voxel, expanded into quads by the collaborator's geometry stage. The
//! record is a fixed 28-byte `repr(C)` layout; the packed words are a binary
//! contract shared with the shader and documented field by field below.
//!
//! ## Packed ambient occlusion (`ao[0]`, `ao[1]`)
//!
//! Each visible face carries one occlusion byte: four corners, two bits each,
//! values 0 (open) to 3 (fully occluded). The six face bytes are packed into
//! two 32-bit words:
//!
//! ```text
//! ao[0] = right << 24 | left << 16 | front << 8 | back
//! ao[1] = flip_bits << 16 | top << 8 | bottom
//! ```
//!
//! `flip_bits` holds one bit per face, bit `5 - f` for face `f` in the order
//! right, left, front, back, top, bottom. A set bit means the quad's diagonal
//! must be flipped when triangulated so the brighter diagonal stays the fixed
//! edge (avoids a visible lighting seam across the quad).
//!
//! ## Packed light (`light`)
//!
//! The 4-bit light values of the six axis neighbors, one nibble each, plus
//! one marker bit per face that is set when the face's neighbor voxel is
//! water (for shader-side underwater tinting):
//!
//! ```text
//! bits  0..=23  neighbor light: +x << 20 | -x << 16 | +z << 12 | -z << 8 | +y << 4 | -y
//! bits 24..=29  water markers, bit 24 + f, same face order as flip_bits
//! ```

/// Shift of the +x face byte inside `ao[0]`.
pub const AO_SHIFT_RIGHT: u32 = 24;
/// Shift of the -x face byte inside `ao[0]`.
pub const AO_SHIFT_LEFT: u32 = 16;
/// Shift of the +z face byte inside `ao[0]`.
pub const AO_SHIFT_FRONT: u32 = 8;
/// Shift of the -z face byte inside `ao[0]`.
pub const AO_SHIFT_BACK: u32 = 0;
/// Shift of the +y face byte inside `ao[1]`.
pub const AO_SHIFT_TOP: u32 = 8;
/// Shift of the -y face byte inside `ao[1]`.
pub const AO_SHIFT_BOTTOM: u32 = 0;
/// Shift of the six diagonal-flip bits inside `ao[1]`.
pub const AO_SHIFT_FLIP: u32 = 16;

/// Nibble shifts of the six neighbor light values inside `light`, in face
/// order right, left, front, back, top, bottom.
pub const LIGHT_SHIFTS: [u32; 6] = [20, 16, 12, 8, 4, 0];
/// First of the six per-face water marker bits inside `light`.
pub const LIGHT_SHIFT_WATER_MARKERS: u32 = 24;

/// One visible voxel in a chunk mesh.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes), chunk-local voxel coordinates
/// - Packed ambient occlusion: 2x u32 (8 bytes)
/// - Packed neighbor light: u32 (4 bytes)
/// - Texture-atlas id: u8 (1 byte)
/// - Visible-face bitmask: u8 (1 byte)
/// - Padding: 2 bytes (keeps the stride a multiple of 4)
///
/// Total stride: 28 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FacePoint {
    /// Chunk-local voxel position.
    pub position: [f32; 3],
    /// Packed per-corner ambient occlusion and flip bits (see module docs).
    pub ao: [u32; 2],
    /// Packed 6-neighbor light nibbles and water markers (see module docs).
    pub light: u32,
    /// Texture-atlas slot (`block id - 1`, after the exposed-top
    /// substitution).
    pub id: u8,
    /// Visible-face bitmask: `0x20` +x, `0x10` -x, `0x08` +z, `0x04` -z,
    /// `0x02` +y, `0x01` -y.
    pub visible_faces: u8,
    /// Explicit struct padding; always zero.
    pub _pad: [u8; 2],
}

impl FacePoint {
    /// Builds a face point from its packed components.
    pub fn new(position: [f32; 3], ao: [u32; 2], light: u32, id: u8, visible_faces: u8) -> Self {
        FacePoint {
            position,
            ao,
            light,
            id,
            visible_faces,
            _pad: [0; 2],
        }
    }

    /// Returns the vertex buffer layout the collaborator binds for chunk
    /// meshes.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: packed ao (vec2<u32>)
    /// - `location = 2`: packed light (u32)
    /// - `location = 3`: id and visible-face mask (vec2<u32> from two u8)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FacePoint>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Uint32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[u32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Uint32,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[u32; 6]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Uint8x2,
                },
            ],
        }
    }

    /// Occlusion level (0..=3) of corner `c` of the face with mask bit
    /// `face_bit`, unpacked from the packed words. Used by tests and debug
    /// tooling; the shader does the same arithmetic.
    pub fn corner_ao(&self, face_bit: u8, c: u32) -> u32 {
        debug_assert!(c < 4);
        let byte = match face_bit {
            0x20 => self.ao[0] >> AO_SHIFT_RIGHT,
            0x10 => self.ao[0] >> AO_SHIFT_LEFT,
            0x08 => self.ao[0] >> AO_SHIFT_FRONT,
            0x04 => self.ao[0] >> AO_SHIFT_BACK,
            0x02 => self.ao[1] >> AO_SHIFT_TOP,
            0x01 => self.ao[1] >> AO_SHIFT_BOTTOM,
            _ => panic!("not a face bit: {face_bit:#x}"),
        } & 0xFF;
        (byte >> (c * 2)) & 0x3
    }

    /// Light value (0..=15) of the neighbor on the face with mask bit
    /// `face_bit`.
    pub fn neighbor_light(&self, face_bit: u8) -> u32 {
        let f = match face_bit {
            0x20 => 0,
            0x10 => 1,
            0x08 => 2,
            0x04 => 3,
            0x02 => 4,
            0x01 => 5,
            _ => panic!("not a face bit: {face_bit:#x}"),
        };
        (self.light >> LIGHT_SHIFTS[f]) & 0xF
    }
}
