// demos/estimate_pi.rs — estimate π once on the GPU and print the result.
//
// USAGE
//   cargo run --release --example estimate_pi
//   cargo run --release --example estimate_pi -- 1000000
//   GPU_PI_SEED=7 RUST_LOG=debug cargo run --release --example estimate_pi
//
// Configuration comes from GPU_PI_* variables (see config.rs); a positional
// argument overrides the point count.

use std::time::Instant;

use gpu_pi::reduce::reference_estimate;
use gpu_pi::{EstimatorConfig, GpuDevice, PiEstimator, PointSet};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = EstimatorConfig::from_env().expect("invalid GPU_PI_* configuration");
    if let Some(arg) = std::env::args().nth(1) {
        config.num_points = arg.replace('_', "")
            .parse()
            .expect("point count must be an integer");
        config.validate().expect("invalid point count");
    }
    println!("Config: {config}");

    println!("Initialising GPU...");
    let gpu = match GpuDevice::new_with_profile(config.profile) {
        Ok(gpu) => gpu,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    println!("GPU: {}", gpu.adapter_info);

    let estimator =
        PiEstimator::new(&gpu, &config).expect("failed to build classification pipeline");

    let seed = config.seed.unwrap_or_else(rand::random);
    let t0 = Instant::now();
    let points =
        PointSet::generate_seeded(config.num_points, seed).expect("point generation failed");
    let gen_time = t0.elapsed();

    let t0 = Instant::now();
    let gpu_est = estimator
        .estimate_points(&gpu, &points)
        .expect("GPU pass failed");
    let gpu_time = t0.elapsed();

    let t0 = Instant::now();
    let cpu_est = reference_estimate(&points);
    let cpu_time = t0.elapsed();

    println!("\npi ~= {:.5}", gpu_est.pi);
    println!("  inside: {} / {}", gpu_est.inside, gpu_est.total);
    println!("  error:  {:.6}", gpu_est.abs_error());
    println!("  seed:   {seed}");
    println!(
        "  generate {:.2} ms, GPU {:.2} ms, CPU reference {:.2} ms",
        gen_time.as_secs_f64() * 1000.0,
        gpu_time.as_secs_f64() * 1000.0,
        cpu_time.as_secs_f64() * 1000.0
    );

    // Points within an ulp of the arc may legitimately differ when the
    // kernel's multiply-add is fused.
    if gpu_est.inside != cpu_est.inside {
        eprintln!(
            "note: GPU inside-count {} differs from CPU reference {}",
            gpu_est.inside, cpu_est.inside
        );
    }
}
