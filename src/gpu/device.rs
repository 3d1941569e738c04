// gpu/device.rs — wgpu device abstraction.
//
// Responsibilities:
//   - Enumerate adapters on the primary backends and select the best
//     hardware one.
//   - Expose a `DeviceProfile` for requesting weaker limits than the
//     development machine has (catch limit violations before shipping).
//   - Provide `WorkgroupSize` — the 1D workgroup width validated against
//     the active profile and baked into the classification pipeline.
//
// ADAPTER SELECTION:
// wgpu's default `request_adapter` may hand back a software rasterizer
// (llvmpipe, WARP) when a real GPU exists. We enumerate explicitly and rank
// by device type, taking a Cpu adapter only when nothing else is present.
// That choice is logged at warn level since throughput will be poor.
//
// DEVICE LIMITS:
// Under `Downlevel` we request wgpu's downlevel defaults instead of the
// standard set. wgpu validates buffer sizes and dispatches against the
// *requested* limits, so a run that only fits on a big desktop GPU fails
// here too.
//
// The only suspension point is device acquisition itself; `pollster`
// drives the async request to completion on the calling thread.

use std::fmt;

use crate::config::DEFAULT_WORKGROUP_SIZE;
use crate::error::{Error, Result};

/// Hardware profile controlling which device limits are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceProfile {
    /// `wgpu::Limits::default()`: what any desktop-class GPU offers.
    Native,
    /// `wgpu::Limits::downlevel_defaults()`: GLES3 / older mobile class.
    Downlevel,
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceProfile::Native => write!(f, "Native"),
            DeviceProfile::Downlevel => write!(f, "Downlevel (simulated limits)"),
        }
    }
}

/// Invocations per workgroup for the 1D classification dispatch.
///
/// Must be a power of two no larger than the profile's
/// `max_compute_invocations_per_workgroup` (and `max_compute_workgroup_size_x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkgroupSize(pub u32);

impl WorkgroupSize {
    /// Invocations per group.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Number of workgroups needed to give every one of `n` points its own
    /// invocation. Exact ceiling division: when `n` is a multiple of the
    /// group size no spare group is launched.
    ///
    /// The last group may still run past `n`; the kernel guards with
    /// `if idx >= count { return; }`.
    pub fn groups_for(&self, n: u32) -> u32 {
        n.div_ceil(self.0)
    }

    /// Total invocations launched for `n` points (`groups_for(n) * size`).
    pub fn threads_for(&self, n: u32) -> u64 {
        self.groups_for(n) as u64 * self.0 as u64
    }
}

impl Default for WorkgroupSize {
    fn default() -> Self {
        WorkgroupSize(DEFAULT_WORKGROUP_SIZE)
    }
}

impl fmt::Display for WorkgroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invocations", self.0)
    }
}

/// Cached adapter information for logging and debugging.
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor: u32,
    pub device: u32,
    pub device_type: wgpu::DeviceType,
    pub backend: wgpu::Backend,
}

impl fmt::Display for AdapterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.name, self.backend, self.device_type)
    }
}

impl From<wgpu::AdapterInfo> for AdapterInfo {
    fn from(raw: wgpu::AdapterInfo) -> Self {
        AdapterInfo {
            name: raw.name,
            vendor: raw.vendor,
            device: raw.device,
            device_type: raw.device_type,
            backend: raw.backend,
        }
    }
}

/// The core GPU context: device, queue, and active profile.
///
/// Create once and reuse; instance and device creation dominate the cost of
/// a small run.
///
/// # Field drop order
/// Fields drop top to bottom. `_instance` is declared last so the
/// `wgpu::Instance` outlives `device` and `queue`.
pub struct GpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub profile: DeviceProfile,
    pub adapter_info: AdapterInfo,
    _instance: wgpu::Instance,
}

impl GpuDevice {
    /// Acquire the best available adapter with `DeviceProfile::Native` limits.
    ///
    /// # Errors
    /// `Error::ResourceUnavailable` if no adapter exists or the device
    /// request is refused.
    pub fn new() -> Result<Self> {
        Self::new_with_profile(DeviceProfile::Native)
    }

    /// Acquire a device requesting the limits of `profile`.
    pub fn new_with_profile(profile: DeviceProfile) -> Result<Self> {
        pollster::block_on(Self::init_async(profile))
    }

    async fn init_async(profile: DeviceProfile) -> Result<Self> {
        let flags = if cfg!(debug_assertions) {
            wgpu::InstanceFlags::VALIDATION
        } else {
            wgpu::InstanceFlags::empty()
        };

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags,
            ..Default::default()
        });

        let mut adapters = instance.enumerate_adapters(wgpu::Backends::PRIMARY);
        if adapters.is_empty() {
            return Err(Error::unavailable("no adapters on Vulkan, Metal or DX12"));
        }

        for a in &adapters {
            let info = a.get_info();
            tracing::debug!(
                name = %info.name,
                backend = ?info.backend,
                device_type = ?info.device_type,
                "found adapter"
            );
        }

        // Best-ranked adapter first; ties keep enumeration order.
        adapters.sort_by_key(|a| adapter_rank(a.get_info().device_type));
        let adapter = adapters.swap_remove(0);

        let adapter_info = AdapterInfo::from(adapter.get_info());
        if adapter_info.device_type == wgpu::DeviceType::Cpu {
            tracing::warn!(adapter = %adapter_info, "only a software adapter is available");
        }

        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gpu-pi"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits_for_profile(profile),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::ResourceUnavailable {
                reason: format!("device request on {adapter_info} failed"),
                source: Some(e),
            })?;

        tracing::info!(adapter = %adapter_info, %profile, "acquired compute device");

        Ok(GpuDevice {
            device,
            queue,
            profile,
            adapter_info,
            _instance: instance,
        })
    }

    /// Limits the device was created with.
    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }
}

impl fmt::Display for GpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GpuDevice {{ adapter: {}, profile: {} }}",
            self.adapter_info, self.profile
        )
    }
}

// ============================================================
// Limits helpers
// ============================================================

/// Lower is better. Software renderers go last.
fn adapter_rank(device_type: wgpu::DeviceType) -> u8 {
    match device_type {
        wgpu::DeviceType::DiscreteGpu => 0,
        wgpu::DeviceType::IntegratedGpu => 1,
        wgpu::DeviceType::VirtualGpu => 2,
        wgpu::DeviceType::Other => 3,
        wgpu::DeviceType::Cpu => 4,
    }
}

/// Build wgpu limits for the given profile.
fn limits_for_profile(profile: DeviceProfile) -> wgpu::Limits {
    match profile {
        DeviceProfile::Native => wgpu::Limits::default(),
        DeviceProfile::Downlevel => wgpu::Limits::downlevel_defaults(),
    }
}

/// Check a 1D workgroup width against the limits `profile` requests.
///
/// The one place a configured width is checked; `EstimatorConfig::validate`
/// and `PiEstimator::new` both go through it.
pub(crate) fn validate_workgroup_size(
    profile: DeviceProfile,
    size: u32,
) -> Result<WorkgroupSize> {
    let limits = limits_for_profile(profile);
    let max = limits
        .max_compute_invocations_per_workgroup
        .min(limits.max_compute_workgroup_size_x);
    if size == 0 || !size.is_power_of_two() {
        return Err(Error::InvalidConfig(format!(
            "workgroup size must be a non-zero power of two (got {size})"
        )));
    }
    if size > max {
        return Err(Error::InvalidConfig(format!(
            "workgroup size {size} exceeds profile limit of {max} invocations"
        )));
    }
    Ok(WorkgroupSize(size))
}

// ============================================================
// Tests
// ============================================================
