// gpu/buffers.rs — device buffers for one classification pass.
//
// Three buffers, usages fixed at creation:
//
//   InputBuffer    STORAGE               points, written once through a
//                                         mapped-at-creation range, then
//                                         unmapped before any dispatch
//   OutputBuffer   STORAGE | COPY_SRC    0/1 per point, written only by the
//                                         kernel, read only by copy
//   StagingBuffer  MAP_READ | COPY_DST   host-visible copy of the output
//
// wgpu zero-fills every new buffer, so an OutputBuffer starts as all 0.0.
//
// SIZE CHECKS:
// Sizes are checked against the device's requested limits before asking
// wgpu for memory. Anything wgpu still refuses (validation or out-of-memory)
// is caught through an error scope around `create_buffer` and reported as
// `Error::AllocationFailure` instead of reaching the uncaptured-error
// handler, which panics.
//
// The typed wrappers carry the point count alongside the wgpu::Buffer so the
// orchestrator and reducer can cross-check lengths without trusting callers.

use crate::error::{Error, Result};
use crate::gpu::device::GpuDevice;
use crate::points::PointSet;

const F32_SIZE: u64 = std::mem::size_of::<f32>() as u64;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Point buffer bound read-only at slot 0. Already unmapped.
pub struct InputBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

/// Classification buffer bound at slot 1. One `f32` per point.
pub struct OutputBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

/// Host-mappable copy target for the classification buffer.
pub struct StagingBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl InputBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of points the buffer holds.
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl OutputBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of classification slots.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}

impl StagingBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Number of classification values the buffer receives.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Upload `points` into a new storage buffer.
///
/// The buffer is created mapped, filled with the packed `[N, x0, y0, ...]`
/// layout, and unmapped before returning; the host cannot touch it again.
pub fn create_input_buffer(gpu: &GpuDevice, points: &PointSet) -> Result<InputBuffer> {
    let size = points.byte_len();
    check_size(gpu, size, true)?;

    let buffer = create_checked(
        gpu,
        &wgpu::BufferDescriptor {
            label: Some("gpu-pi points"),
            size,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: true,
        },
    )?;
    buffer
        .slice(..)
        .get_mapped_range_mut()
        .copy_from_slice(points.as_bytes());
    buffer.unmap();

    tracing::debug!(points = points.len(), bytes = size, "uploaded point buffer");
    Ok(InputBuffer {
        buffer,
        count: points.len() as u32,
    })
}

/// Allocate a zeroed classification buffer of `byte_size` bytes.
pub fn create_output_buffer(gpu: &GpuDevice, byte_size: u64) -> Result<OutputBuffer> {
    let count = f32_count(byte_size)?;
    check_size(gpu, byte_size, true)?;

    let buffer = create_checked(
        gpu,
        &wgpu::BufferDescriptor {
            label: Some("gpu-pi classification"),
            size: byte_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        },
    )?;
    Ok(OutputBuffer { buffer, count })
}

/// Allocate a host-readable staging buffer of `byte_size` bytes.
pub fn create_staging_buffer(gpu: &GpuDevice, byte_size: u64) -> Result<StagingBuffer> {
    let count = f32_count(byte_size)?;
    check_size(gpu, byte_size, false)?;

    let buffer = create_checked(
        gpu,
        &wgpu::BufferDescriptor {
            label: Some("gpu-pi readback"),
            size: byte_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        },
    )?;
    Ok(StagingBuffer { buffer, count })
}

/// Byte size of a classification buffer for `n` points.
pub fn classification_bytes(n: usize) -> u64 {
    n as u64 * F32_SIZE
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn f32_count(byte_size: u64) -> Result<u32> {
    if byte_size == 0 || byte_size % F32_SIZE != 0 {
        return Err(Error::AllocationFailure {
            bytes: byte_size,
            reason: "size must be a non-zero multiple of 4".into(),
        });
    }
    u32::try_from(byte_size / F32_SIZE).map_err(|_| Error::AllocationFailure {
        bytes: byte_size,
        reason: "element count exceeds u32".into(),
    })
}

/// Reject sizes the device's limits cannot hold. Storage bindings have a
/// tighter cap than plain buffers.
fn check_size(gpu: &GpuDevice, bytes: u64, storage_binding: bool) -> Result<()> {
    let limits = gpu.limits();
    let limit = if storage_binding {
        limits.max_buffer_size.min(limits.max_storage_buffer_binding_size as u64)
    } else {
        limits.max_buffer_size
    };
    if bytes > limit {
        return Err(Error::AllocationFailure {
            bytes,
            reason: format!("exceeds device limit of {limit} bytes"),
        });
    }
    Ok(())
}

/// `create_buffer` wrapped in error scopes so a refused allocation comes
/// back as an `Err` rather than a panic from the uncaptured-error handler.
fn create_checked(gpu: &GpuDevice, desc: &wgpu::BufferDescriptor<'_>) -> Result<wgpu::Buffer> {
    gpu.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let buffer = gpu.device.create_buffer(desc);
    let validation = pollster::block_on(gpu.device.pop_error_scope());
    let oom = pollster::block_on(gpu.device.pop_error_scope());

    match oom.or(validation) {
        Some(e) => Err(Error::AllocationFailure {
            bytes: desc.size,
            reason: e.to_string(),
        }),
        None => Ok(buffer),
    }
}
