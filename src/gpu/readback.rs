// gpu/readback.rs — staging buffer → host → estimate.
//
// The single host-side wait of a pass happens here: request the mapping,
// block in `device.poll` until the submission that wrote the staging buffer
// has retired, then read the mapped range.
//
// MAPPING LIFETIME
// ────────────────
// `MappedStaging` owns the mapped view and unmaps in `Drop`, so every exit
// after a successful map (reduce error, length mismatch, panic) releases
// the mapping. The guard only exists once `map_async` reported success:
// calling `unmap` on a buffer that never mapped is itself a wgpu error.
// Length checks run against the mapped view, after the guard exists, so a
// mismatched `Submission` still leaves the staging buffer reusable.

use std::sync::mpsc;

use crate::error::{Error, Result};
use crate::gpu::buffers::StagingBuffer;
use crate::gpu::classify::Submission;
use crate::gpu::device::GpuDevice;
use crate::reduce::{reduce, Estimate};

/// Wait for `submission`, map `staging`, and reduce it into an estimate.
pub fn read_estimate(
    gpu: &GpuDevice,
    staging: &StagingBuffer,
    submission: Submission,
) -> Result<Estimate> {
    let count = submission.count as usize;
    let mapped = MappedStaging::map(gpu, staging, submission)?;
    reduce(mapped.values(), count)
}

/// Wait for `submission` and copy the raw classification values out.
pub fn read_classification(
    gpu: &GpuDevice,
    staging: &StagingBuffer,
    submission: Submission,
) -> Result<Vec<f32>> {
    let count = submission.count as usize;
    let mapped = MappedStaging::map(gpu, staging, submission)?;
    let values = mapped.values();
    if values.len() != count {
        return Err(Error::LengthMismatch {
            expected: count,
            actual: values.len(),
        });
    }
    Ok(values.to_vec())
}

/// A read-mapped staging buffer, unmapped on drop.
struct MappedStaging<'a> {
    buffer: &'a wgpu::Buffer,
    view: Option<wgpu::BufferView<'a>>,
}

impl<'a> MappedStaging<'a> {
    fn map(gpu: &GpuDevice, staging: &'a StagingBuffer, submission: Submission) -> Result<Self> {
        let buffer = staging.buffer();
        let slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            // The receiver only disappears if `map` already returned.
            let _ = tx.send(r);
        });
        gpu.device.poll(wgpu::Maintain::wait_for(submission.index));

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(Error::MappingFailure(e.to_string())),
            Err(_) => {
                return Err(Error::MappingFailure(
                    "map callback dropped before completion (device lost?)".into(),
                ));
            }
        }

        Ok(MappedStaging {
            buffer,
            view: Some(slice.get_mapped_range()),
        })
    }

    fn values(&self) -> &[f32] {
        match &self.view {
            Some(view) => bytemuck::cast_slice(view),
            None => &[],
        }
    }
}

impl Drop for MappedStaging<'_> {
    fn drop(&mut self) {
        // The view must go before the buffer can unmap.
        drop(self.view.take());
        self.buffer.unmap();
    }
}
