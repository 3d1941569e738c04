// gpu/mod.rs — wgpu compute layer.
//
// Each GPU module mirrors a CPU module in the parent crate. The CPU versions
// (classify.rs, reduce.rs) are the authoritative reference and the GPU tests
// check the kernel output against them value for value, except on points
// within an ulp of the arc (see `classify::contraction_sensitive`).
//
// Data flow for one pass:
//
//   PointSet ──upload──▶ InputBuffer ──classify_points──▶ OutputBuffer
//                                                            │ copy
//   Estimate ◀──reduce── mapped StagingBuffer ◀──────────────┘
//
// Every storage buffer is either read-only for the kernel (points) or written
// at a slot that is a function of the invocation id alone (classification),
// so the kernel needs no atomics and no barriers.

pub mod buffers;
pub mod classify;
pub mod device;
pub mod readback;
