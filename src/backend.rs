//! Backend selection for the Burn framework.
//!
//! The default build serves on CPU via NdArray. Building with the `wgpu`
//! feature switches the whole service to GPU-accelerated inference; no code
//! outside this module cares which one is active.

#[cfg(feature = "wgpu")]
pub type DefaultBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type DefaultBackend = burn::backend::NdArray;

/// Get the default device for the compiled backend
pub fn default_device() -> <DefaultBackend as burn::tensor::backend::Backend>::Device {
    <DefaultBackend as burn::tensor::backend::Backend>::Device::default()
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "wgpu")]
    {
        "Wgpu (GPU)"
    }

    #[cfg(not(feature = "wgpu"))]
    {
        "NdArray (CPU)"
    }
}
