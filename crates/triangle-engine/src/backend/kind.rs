use std::fmt;
use std::str::FromStr;

/// Native API a backend drives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BackendKind {
    Vulkan,
    /// Also serves requests for Direct3D 11, which wgpu does not provide.
    Direct3D12,
    OpenGl,
    Metal,
    /// Let wgpu pick the platform's primary API.
    #[default]
    Auto,
    /// No GPU at all.
    Headless,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Vulkan => "Vulkan",
            Self::Direct3D12 => "Direct3D 12",
            Self::OpenGl => "OpenGL",
            Self::Metal => "Metal",
            Self::Auto => "auto",
            Self::Headless => "headless",
        }
    }

    /// True for kinds served by the wgpu backend.
    pub fn is_gpu(self) -> bool {
        !matches!(self, Self::Headless)
    }

    pub(crate) fn wgpu_backends(self) -> wgpu::Backends {
        match self {
            Self::Vulkan => wgpu::Backends::VULKAN,
            Self::Direct3D12 => wgpu::Backends::DX12,
            Self::OpenGl => wgpu::Backends::GL,
            Self::Metal => wgpu::Backends::METAL,
            Self::Auto => wgpu::Backends::PRIMARY,
            Self::Headless => wgpu::Backends::empty(),
        }
    }

    pub(crate) fn from_wgpu(backend: wgpu::Backend) -> Self {
        match backend {
            wgpu::Backend::Vulkan => Self::Vulkan,
            wgpu::Backend::Dx12 => Self::Direct3D12,
            wgpu::Backend::Gl => Self::OpenGl,
            wgpu::Backend::Metal => Self::Metal,
            _ => Self::Auto,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown backend `{0}` (expected vulkan, d3d12, gl, metal, auto or headless)")]
pub struct ParseBackendKindError(String);

impl FromStr for BackendKind {
    type Err = ParseBackendKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vulkan" | "vk" => Ok(Self::Vulkan),
            "d3d12" | "dx12" | "d3d11" | "dx11" | "direct3d" => Ok(Self::Direct3D12),
            "gl" | "opengl" | "gles" => Ok(Self::OpenGl),
            "metal" | "mtl" => Ok(Self::Metal),
            "auto" => Ok(Self::Auto),
            "headless" | "null" => Ok(Self::Headless),
            _ => Err(ParseBackendKindError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("Vulkan".parse(), Ok(BackendKind::Vulkan));
        assert_eq!("dx11".parse(), Ok(BackendKind::Direct3D12));
        assert_eq!("opengl".parse(), Ok(BackendKind::OpenGl));
        assert_eq!(" metal ".parse(), Ok(BackendKind::Metal));
        assert_eq!("null".parse(), Ok(BackendKind::Headless));
    }

    #[test]
    fn rejects_unknown() {
        let err = "glide".parse::<BackendKind>().unwrap_err();
        assert!(err.to_string().contains("glide"));
    }

    #[test]
    fn headless_maps_to_no_wgpu_backends() {
        assert!(BackendKind::Headless.wgpu_backends().is_empty());
        assert!(!BackendKind::Headless.is_gpu());
        assert_eq!(BackendKind::Vulkan.wgpu_backends(), wgpu::Backends::VULKAN);
    }
}
