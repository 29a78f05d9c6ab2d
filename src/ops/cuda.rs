use crate::tensors::Ten64;

/// Element-wise `e^x` for the CUDA backend; forwards to [`super::wgpu::wgpu_exp`].
pub fn cuda_exp(input: &Ten64) -> Option<Ten64> {
    super::wgpu::wgpu_exp(input)
}
