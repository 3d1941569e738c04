// gpu-pi: Monte Carlo estimation of π on the GPU.
//
// N uniform points in the unit square are packed into a length-prefixed f32
// buffer, classified against the unit circle by a wgpu compute kernel (one
// invocation per point), and reduced on the host to 4 * inside / N.
//
// The CPU modules are the reference implementation; `gpu` holds the device
// pipeline validated against them.

pub mod classify;
pub mod config;
pub mod error;
pub mod estimator;
pub mod gpu;
pub mod points;
pub mod reduce;

pub use config::EstimatorConfig;
pub use error::{Error, Result};
pub use estimator::{estimate_pi, PiEstimator};
pub use gpu::device::{DeviceProfile, GpuDevice};
pub use points::PointSet;
pub use reduce::Estimate;
