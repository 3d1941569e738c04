// config.rs — run configuration.
//
// N is the only parameter the estimate itself depends on. The rest tune how
// the pass runs: workgroup width, reproducible seeding, and which device
// limits to request.
//
// Environment overrides (all optional):
//   GPU_PI_POINTS     point count N
//   GPU_PI_SEED       u64 seed for reproducible point sets
//   GPU_PI_WORKGROUP  invocations per workgroup (power of two)
//   GPU_PI_PROFILE    `native` | `downlevel`

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::gpu::device::{validate_workgroup_size, DeviceProfile};
use crate::points::MAX_POINTS;

/// Default point count, matching the original 15 million sample run.
pub const DEFAULT_NUM_POINTS: usize = 15_000_000;

/// Default invocations per workgroup.
pub const DEFAULT_WORKGROUP_SIZE: u32 = 256;

/// Configuration for a [`PiEstimator`](crate::estimator::PiEstimator) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Number of random points (N).
    pub num_points: usize,
    /// Invocations per workgroup. Must be a power of two within the
    /// profile's limits.
    pub workgroup_size: u32,
    /// Fixed seed for point generation; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Device limits to request.
    pub profile: DeviceProfile,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            num_points: DEFAULT_NUM_POINTS,
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            seed: None,
            profile: DeviceProfile::Native,
        }
    }
}

impl EstimatorConfig {
    /// Defaults overridden by any `GPU_PI_*` variables present.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = EstimatorConfig::default();
        if let Some(v) = lookup("GPU_PI_POINTS") {
            cfg.num_points = parse_var("GPU_PI_POINTS", &v)?;
        }
        if let Some(v) = lookup("GPU_PI_SEED") {
            cfg.seed = Some(parse_var("GPU_PI_SEED", &v)?);
        }
        if let Some(v) = lookup("GPU_PI_WORKGROUP") {
            cfg.workgroup_size = parse_var("GPU_PI_WORKGROUP", &v)?;
        }
        if let Some(v) = lookup("GPU_PI_PROFILE") {
            cfg.profile = v.parse()?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.num_points == 0 || self.num_points > MAX_POINTS {
            return Err(Error::InvalidPointCount {
                requested: self.num_points,
                max: MAX_POINTS,
            });
        }
        validate_workgroup_size(self.profile, self.workgroup_size)?;
        Ok(())
    }
}

impl fmt::Display for EstimatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N={} workgroup={} profile={}",
            self.num_points, self.workgroup_size, self.profile
        )?;
        if let Some(seed) = self.seed {
            write!(f, " seed={seed}")?;
        }
        Ok(())
    }
}

impl FromStr for DeviceProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(DeviceProfile::Native),
            "downlevel" => Ok(DeviceProfile::Downlevel),
            other => Err(Error::InvalidConfig(format!("unknown device profile `{other}`"))),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .replace('_', "")
        .parse()
        .map_err(|e| Error::InvalidConfig(format!("{key}={value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = EstimatorConfig::default();
        assert_eq!(cfg.num_points, 15_000_000);
        assert_eq!(cfg.workgroup_size, 256);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let cfg = EstimatorConfig::from_lookup(lookup(&[
            ("GPU_PI_POINTS", "1_000_000"),
            ("GPU_PI_SEED", "42"),
            ("GPU_PI_WORKGROUP", "64"),
            ("GPU_PI_PROFILE", "Downlevel"),
        ]))
        .unwrap();
        assert_eq!(cfg.num_points, 1_000_000);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.workgroup_size, 64);
        assert_eq!(cfg.profile, DeviceProfile::Downlevel);
    }

    #[test]
    fn test_rejects_zero_points() {
        let err = EstimatorConfig::from_lookup(lookup(&[("GPU_PI_POINTS", "0")])).unwrap_err();
        assert!(matches!(err, Error::InvalidPointCount { requested: 0, .. }));
    }

    #[test]
    fn test_rejects_too_many_points() {
        let cfg = EstimatorConfig {
            num_points: MAX_POINTS + 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_odd_workgroup() {
        let cfg = EstimatorConfig {
            workgroup_size: 100,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_workgroup_over_profile_limit() {
        let cfg = EstimatorConfig {
            workgroup_size: 512,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
        let cfg = EstimatorConfig {
            workgroup_size: 128,
            ..Default::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(EstimatorConfig::from_lookup(lookup(&[("GPU_PI_SEED", "abc")])).is_err());
        assert!(EstimatorConfig::from_lookup(lookup(&[("GPU_PI_PROFILE", "rpi")])).is_err());
    }
}
