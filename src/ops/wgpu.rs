//! GPU-accelerated tensor operations using WGPU.
//!
//! This module implements the element-wise exponentiation kernel on the GPU
//! using WGPU + WGSL. It handles GPU context initialization, shader
//! precompilation (via `lazy_static`) and compute dispatch.
//!
//! The context and pipeline are built once on first use. If no adapter or
//! device is available they stay `None` and every call returns `None`, which
//! makes the dispatch layer fall back to the CPU kernel.
//!
//! Tensor data is cast to `f32` for the GPU and returned as `f64`.

use crate::tensors::{Ten64, Tensor};
use briny::prelude::*;
use std::sync::mpsc;
use wgpu::util::DeviceExt;

const EXP: &str = include_str!("shaders/exp.wgsl");

const WORKGROUP_SIZE: usize = 64;
const MAX_WORKGROUPS: usize = 65_535;

/// Inputs whose `f32` exponential neither overflows nor leaves the normal range.
///
/// Bounded by `ln(f32::MAX)` and `ln(f32::MIN_POSITIVE)`.
pub const F32_EXP_RANGE: core::ops::RangeInclusive<f64> = -87.33..=88.72;

/// Basic wrapper for common GPU errors.
#[derive(Debug)]
pub enum GpuError {
    /// An error in requesting the adapter.
    Adapter(wgpu::RequestAdapterError),
    /// An error in requesting the GPU (device).
    Device(wgpu::RequestDeviceError),
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::Adapter(e) => write!(f, "Adapter error: {e}"),
            GpuError::Device(e) => write!(f, "Device error: {e}"),
        }
    }
}

/// A type of error closely related to the GPU.
#[derive(Debug)]
pub enum GpuFailure {
    /// Context creation failed.
    Gpu(GpuError),
    /// A shader failed source validation.
    Validation(ValidationError),
    /// Reading results back from the device failed.
    Readback(String),
}

impl From<GpuError> for GpuFailure {
    fn from(err: GpuError) -> Self {
        Self::Gpu(err)
    }
}

impl From<ValidationError> for GpuFailure {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl std::fmt::Display for GpuFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GpuFailure::Gpu(err) => write!(f, "GPU failure: {err}"),
            GpuFailure::Validation(_) => write!(f, "GPU failure: shader rejected by validation"),
            GpuFailure::Readback(msg) => write!(f, "GPU failure: {msg}"),
        }
    }
}

impl std::error::Error for GpuFailure {}

/// Holds the WGPU device and queue used for executing compute pipelines.
pub struct GpuContext {
    /// The actual GPU device.
    pub device: wgpu::Device,
    /// A queue for information related to the device.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Initializes a new GPU context, selecting the default adapter and creating a device + queue.
    ///
    /// Uses `pollster::block_on` to synchronously wait for the async WGPU calls.
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .map_err(GpuError::Adapter)?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(GpuError::Device)?;

        Ok(Self { device, queue })
    }
}

/// Wrapper for WGSL source code embedded in the crate.
pub struct WgslSource<'a>(pub &'a str);

impl Validate for WgslSource<'_> {
    fn validate(&self) -> Result<(), ValidationError> {
        let src = self.0;

        if src.len() > 65536 || !src.contains("fn main") {
            return Err(ValidationError);
        }

        if src.contains("import") || src.contains("#include") {
            return Err(ValidationError);
        }

        let forbidden = ["asm", "unsafe", "ptr", "std::"];
        if forbidden.iter().any(|bad| src.contains(bad)) {
            return Err(ValidationError);
        }

        Ok(())
    }
}

/// Validates a WGSL shader and compiles it on `device`.
pub fn load_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, GpuFailure> {
    WgslSource(source).validate()?;

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}

/// The compiled exp kernel: one read-only input buffer, one output buffer.
struct ExpKernel {
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl ExpKernel {
    fn new(ctx: &GpuContext) -> Result<Self, GpuFailure> {
        let module = load_shader(&ctx.device, "exp", EXP)?;
        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("exp_bgl"),
                    entries: &[storage_entry(0, true), storage_entry(1, false)],
                });
        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("exp_pipeline_layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });
        let pipeline = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("exp_pipeline"),
                layout: Some(&layout),
                module: &module,
                entry_point: Some("main"),
                cache: None,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            });

        Ok(Self {
            bind_group_layout,
            pipeline,
        })
    }
}

lazy_static::lazy_static! {
    static ref GPU_CONTEXT: Option<GpuContext> = match GpuContext::new() {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            log::debug!("wgpu context unavailable: {err}");
            None
        }
    };
    static ref EXP_KERNEL: Option<ExpKernel> = GPU_CONTEXT.as_ref().and_then(|ctx| {
        ExpKernel::new(ctx)
            .map_err(|err| log::debug!("exp kernel unavailable: {err}"))
            .ok()
    });
}

fn to_bytes(data: &[f32]) -> Vec<u8> {
    data.iter().flat_map(|x| x.to_ne_bytes()).collect()
}

fn from_bytes(bytes: &[u8], out: &mut [f32]) -> Result<(), GpuFailure> {
    if bytes.len() != out.len() * size_of::<f32>() {
        return Err(GpuFailure::Readback(format!(
            "expected {} bytes, got {}",
            out.len() * size_of::<f32>(),
            bytes.len()
        )));
    }
    for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(size_of::<f32>())) {
        *dst = f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(())
}

/// Performs element-wise `e^x` on the GPU.
///
/// # Returns
/// - `Some(Tensor)` on success
/// - `None` if the GPU is unavailable, the input is empty or too large for a
///   single dispatch, any element lies outside [`F32_EXP_RANGE`], or
///   execution fails
///
/// # Notes
/// - Uses f32 precision on GPU
pub fn wgpu_exp(input: &Ten64) -> Option<Ten64> {
    let len = input.numel();
    if len == 0 || len > WORKGROUP_SIZE * MAX_WORKGROUPS {
        return None;
    }
    if !input.data.iter().all(|x| F32_EXP_RANGE.contains(x)) {
        log::debug!("wgpu exp: input outside f32 exp range, leaving it to the cpu");
        return None;
    }

    let ctx = GPU_CONTEXT.as_ref()?;
    let kernel = EXP_KERNEL.as_ref()?;

    let data: Vec<f32> = input.data.iter().map(|&x| x as f32).collect();
    let mut output = vec![0.0f32; len];

    if let Err(err) = pollster::block_on(run_exp_shader(ctx, kernel, &data, &mut output)) {
        log::debug!("wgpu exp failed: {err}");
        return None;
    }

    Some(Tensor::new(
        input.shape.clone(),
        output.into_iter().map(f64::from).collect(),
    ))
}

async fn run_exp_shader(
    ctx: &GpuContext,
    kernel: &ExpKernel,
    input: &[f32],
    output: &mut [f32],
) -> Result<(), GpuFailure> {
    let device = &ctx.device;
    let size = (output.len() * size_of::<f32>()) as u64;

    let input_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("exp_input"),
        contents: &to_bytes(input),
        usage: wgpu::BufferUsages::STORAGE,
    });

    let output_buf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("exp_output"),
        size,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("exp_bind_group"),
        layout: &kernel.bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: input_buf.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: output_buf.as_entire_binding(),
            },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("exp_encoder"),
    });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("exp_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&kernel.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(input.len().div_ceil(WORKGROUP_SIZE) as u32, 1, 1);
    }

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("exp_staging"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    encoder.copy_buffer_to_buffer(&output_buf, 0, &staging, 0, size);
    ctx.queue.submit(Some(encoder.finish()));

    let (mapped_tx, mapped_rx) = mpsc::channel();
    staging
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            let _ = mapped_tx.send(result);
        });
    device
        .poll(wgpu::PollType::Wait)
        .map_err(|e| GpuFailure::Readback(e.to_string()))?;
    mapped_rx
        .recv()
        .map_err(|_| GpuFailure::Readback("staging map callback never ran".to_string()))?
        .map_err(|e| GpuFailure::Readback(e.to_string()))?;

    let mapped = staging.slice(..).get_mapped_range();
    let result = from_bytes(&mapped, output);
    drop(mapped);
    staging.unmap();

    result
}
