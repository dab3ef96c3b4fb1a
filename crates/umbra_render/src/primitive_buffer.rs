//! Packed primitive records and compute dispatch sizing.

use umbra_core::{Primitive, Scene};

/// Threads per group along X and Y, fixed by the render program.
pub const THREAD_GROUP_SIZE: u32 = 8;

/// One sphere as the render program reads it (40 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuPrimitive {
    pub position: [f32; 3],
    pub radius: f32,
    pub albedo: [f32; 3],
    pub specular: [f32; 3],
}

impl GpuPrimitive {
    /// Size of one record in bytes.
    pub const STRIDE: usize = std::mem::size_of::<GpuPrimitive>();
}

impl From<&Primitive> for GpuPrimitive {
    fn from(p: &Primitive) -> Self {
        Self {
            position: p.position.to_array(),
            radius: p.radius,
            albedo: p.albedo.to_array(),
            specular: p.specular.to_array(),
        }
    }
}

/// The uploaded records of one scene generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveBuffer {
    records: Vec<GpuPrimitive>,
}

impl PrimitiveBuffer {
    /// Pack a scene in acceptance order.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            records: scene.iter().map(GpuPrimitive::from).collect(),
        }
    }

    /// Wrap already packed records.
    pub fn from_records(records: Vec<GpuPrimitive>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[GpuPrimitive] {
        &self.records
    }

    /// Raw bytes in native order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    /// Decode records from raw bytes.
    ///
    /// Returns `None` when the length is not a whole number of records.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() % GpuPrimitive::STRIDE != 0 {
            return None;
        }
        let records = bytes
            .chunks_exact(GpuPrimitive::STRIDE)
            .map(bytemuck::pod_read_unaligned::<GpuPrimitive>)
            .collect();
        Some(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Size in bytes.
    pub fn byte_len(&self) -> usize {
        self.records.len() * GpuPrimitive::STRIDE
    }
}

/// Thread-group counts of a compute dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl DispatchSize {
    /// One thread per pixel in 8x8 groups, rounding up.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self {
            x: width.div_ceil(THREAD_GROUP_SIZE),
            y: height.div_ceil(THREAD_GROUP_SIZE),
            z: 1,
        }
    }

    /// Total thread count.
    pub fn threads(&self) -> u64 {
        let per_group = u64::from(THREAD_GROUP_SIZE * THREAD_GROUP_SIZE);
        u64::from(self.x) * u64::from(self.y) * u64::from(self.z) * per_group
    }
}
