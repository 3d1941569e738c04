// gpu/classify.rs — dispatch of the unit-circle classification kernel.
//
// One pass, one command buffer:
//
//   compute pass   classify_points over ceil(N / wg) workgroups
//   copy           classification buffer → staging buffer (full size)
//   submit         single queue submission, returns a `Submission`
//
// GRID SIZE
// ─────────
// Exact ceiling division. N = 257 with wg = 256 launches 2 groups (512
// invocations); invocations 257..511 hit the kernel's bounds guard and
// write nothing. N = 512 launches exactly 2 groups, not 3.
//
// The grid is one-dimensional, so it must fit the device's
// `max_compute_workgroups_per_dimension`. With wg = 256 and the default
// 65,535 limit that is ~16.7M points, just under the 2^24 header cap.
//
// ERRORS
// ──────
// Shader compilation and pipeline creation run inside a validation error
// scope; so do recording and submission. A failure in either surfaces as
// `Error::SubmissionFailure`. Nothing is retried.

use crate::error::{Error, Result};
use crate::gpu::buffers::{InputBuffer, OutputBuffer, StagingBuffer};
use crate::gpu::device::{GpuDevice, WorkgroupSize};

/// WGSL kernel source with the `{{WG_SIZE}}` placeholder.
pub const CLASSIFY_WGSL: &str = include_str!("../shaders/classify.wgsl");

/// Entry point name inside `CLASSIFY_WGSL`.
pub const ENTRY_POINT: &str = "classify_points";

/// Kernel source specialised for `workgroup`.
pub fn shader_source(workgroup: WorkgroupSize) -> String {
    CLASSIFY_WGSL.replace("{{WG_SIZE}}", &workgroup.get().to_string())
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Handle for a submitted classification pass.
///
/// Consumed by [`read_estimate`](crate::gpu::readback::read_estimate), which
/// waits on `index` before mapping the staging buffer.
#[derive(Debug)]
pub struct Submission {
    pub index: wgpu::SubmissionIndex,
    /// Points classified (N).
    pub count: u32,
    /// Workgroups launched.
    pub groups: u32,
}

// ---------------------------------------------------------------------------
// GpuClassifier
// ---------------------------------------------------------------------------

/// Compiled classification pipeline.
///
/// Create once per device; call [`dispatch`](Self::dispatch) per pass.
pub struct GpuClassifier {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
    pub workgroup_size: WorkgroupSize,
}

impl GpuClassifier {
    /// Compile the kernel with the default 256-wide workgroup.
    pub fn new(gpu: &GpuDevice) -> Result<Self> {
        Self::with_workgroup_size(gpu, WorkgroupSize::default())
    }

    /// Compile the kernel for an explicit workgroup size.
    pub fn with_workgroup_size(gpu: &GpuDevice, workgroup_size: WorkgroupSize) -> Result<Self> {
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("classify.wgsl"),
            source: wgpu::ShaderSource::Wgsl(shader_source(workgroup_size).into()),
        });

        let bgl = gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GpuClassifier BGL"),
            entries: &[
                // 0 — points (storage, read-only)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // 1 — classification (storage, kernel writes only)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("GpuClassifier pipeline layout"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        let pipeline = gpu.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(ENTRY_POINT),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(ENTRY_POINT),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        if let Some(e) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(Error::SubmissionFailure(format!("classification pipeline: {e}")));
        }

        tracing::debug!(workgroup = %workgroup_size, "compiled classification pipeline");
        Ok(GpuClassifier {
            pipeline,
            bgl,
            workgroup_size,
        })
    }

    /// Record and submit one pass: classify every point of `input` into
    /// `output`, then copy `output` into `staging`.
    ///
    /// All three buffers must describe the same N.
    pub fn dispatch(
        &self,
        gpu: &GpuDevice,
        input: &InputBuffer,
        output: &OutputBuffer,
        staging: &StagingBuffer,
    ) -> Result<Submission> {
        let n = input.count();
        for actual in [output.count(), staging.count()] {
            if actual != n {
                return Err(Error::LengthMismatch {
                    expected: n as usize,
                    actual: actual as usize,
                });
            }
        }

        let groups = self.workgroup_size.groups_for(n);
        let max_groups = gpu.limits().max_compute_workgroups_per_dimension;
        if groups > max_groups {
            return Err(Error::SubmissionFailure(format!(
                "{groups} workgroups exceed the device limit of {max_groups} per dimension"
            )));
        }

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GpuClassifier BG"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.buffer().as_entire_binding(),
                },
            ],
        });

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("GpuClassifier dispatch"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(ENTRY_POINT),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups, 1, 1);
        }
        encoder.copy_buffer_to_buffer(output.buffer(), 0, staging.buffer(), 0, output.size());

        let index = gpu.queue.submit(std::iter::once(encoder.finish()));
        if let Some(e) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(Error::SubmissionFailure(e.to_string()));
        }

        tracing::debug!(
            points = n,
            groups,
            threads = self.workgroup_size.threads_for(n),
            "submitted classification pass"
        );
        Ok(Submission {
            index,
            count: n,
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_source_substitutes_workgroup() {
        let src = shader_source(WorkgroupSize(256));
        assert!(src.contains("@workgroup_size(256)"));
        assert!(!src.contains("{{WG_SIZE}}"));
        assert!(src.contains(&format!("fn {ENTRY_POINT}(")));
    }

    #[test]
    fn test_shader_binding_contract() {
        // Slot 0 read-only points with an f32 count header, slot 1 writable.
        assert!(CLASSIFY_WGSL
            .contains("@group(0) @binding(0) var<storage, read> points: PointSet;"));
        assert!(CLASSIFY_WGSL
            .contains("@group(0) @binding(1) var<storage, read_write> inside: array<f32>;"));
        assert!(CLASSIFY_WGSL.contains("count: f32"));
        assert!(CLASSIFY_WGSL.contains("if (idx >= u32(points.count))"));
        assert!(CLASSIFY_WGSL.contains("<= 1.0"));
    }
}
