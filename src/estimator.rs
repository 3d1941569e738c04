// estimator.rs — one full generate → upload → dispatch → reduce pass.
//
//   PointSet::generate*      host, single thread
//   create_*_buffer          upload points, allocate output + staging
//   GpuClassifier::dispatch  kernel + copy, one submission
//   read_estimate            wait, map, sum, unmap
//
// Strictly linear; exactly one batch is in flight. The host PointSet is not
// read again once uploaded. The input and output buffers drop at the end of
// `submit`; wgpu keeps them alive until the submission retires.

use std::time::Instant;

use crate::config::EstimatorConfig;
use crate::error::Result;
use crate::gpu::buffers::{
    classification_bytes, create_input_buffer, create_output_buffer, create_staging_buffer,
    StagingBuffer,
};
use crate::gpu::classify::{GpuClassifier, Submission};
use crate::gpu::device::{validate_workgroup_size, GpuDevice};
use crate::gpu::readback::{read_classification, read_estimate};
use crate::points::PointSet;
use crate::reduce::Estimate;

/// GPU Monte Carlo estimator of π.
///
/// Holds the compiled pipeline; create once and call [`run`](Self::run) or
/// [`estimate`](Self::estimate) as often as needed.
pub struct PiEstimator {
    classifier: GpuClassifier,
    config: EstimatorConfig,
}

impl PiEstimator {
    /// Validate `config` against `gpu` and compile the classification kernel.
    pub fn new(gpu: &GpuDevice, config: &EstimatorConfig) -> Result<Self> {
        config.validate()?;
        let workgroup = validate_workgroup_size(gpu.profile, config.workgroup_size)?;
        let classifier = GpuClassifier::with_workgroup_size(gpu, workgroup)?;
        Ok(PiEstimator {
            classifier,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate with the configured point count.
    pub fn run(&self, gpu: &GpuDevice) -> Result<Estimate> {
        self.estimate(gpu, self.config.num_points)
    }

    /// Estimate from `n` fresh points. Uses the configured seed if one is
    /// set, so repeated calls with a seed return the same estimate.
    pub fn estimate(&self, gpu: &GpuDevice, n: usize) -> Result<Estimate> {
        let points = match self.config.seed {
            Some(seed) => PointSet::generate_seeded(n, seed)?,
            None => PointSet::generate(n)?,
        };
        self.estimate_points(gpu, &points)
    }

    /// Run the GPU pass over caller-supplied points.
    pub fn estimate_points(&self, gpu: &GpuDevice, points: &PointSet) -> Result<Estimate> {
        let start = Instant::now();
        let (staging, submission) = self.submit(gpu, points)?;
        let estimate = read_estimate(gpu, &staging, submission)?;
        tracing::info!(
            points = estimate.total,
            inside = estimate.inside,
            pi = estimate.pi,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "estimate complete"
        );
        Ok(estimate)
    }

    /// Run the GPU pass and return the raw per-point classification values,
    /// index-aligned with `points`.
    pub fn classify_points(&self, gpu: &GpuDevice, points: &PointSet) -> Result<Vec<f32>> {
        let (staging, submission) = self.submit(gpu, points)?;
        read_classification(gpu, &staging, submission)
    }

    fn submit(&self, gpu: &GpuDevice, points: &PointSet) -> Result<(StagingBuffer, Submission)> {
        let input = create_input_buffer(gpu, points)?;
        let bytes = classification_bytes(points.len());
        let output = create_output_buffer(gpu, bytes)?;
        let staging = create_staging_buffer(gpu, bytes)?;
        let submission = self.classifier.dispatch(gpu, &input, &output, &staging)?;
        Ok((staging, submission))
    }
}

/// Acquire a device for `config.profile`, run one estimate, and release
/// everything.
pub fn estimate_pi(config: &EstimatorConfig) -> Result<Estimate> {
    config.validate()?;
    let gpu = GpuDevice::new_with_profile(config.profile)?;
    PiEstimator::new(&gpu, config)?.run(&gpu)
}
