use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::{RendererError, RendererResult};

/// Built-in WGSL for the coloured triangle.
pub const TRIANGLE_WGSL: &str = include_str!("../../assets/shaders/triangle.wgsl");

/// Shader file the demo loads when `--shader` is given without a path.
///
/// Resolved against the working directory.
pub const DEFAULT_SHADER_PATH: &str = "assets/shaders/triangle.wgsl";

/// Entry point names every triangle shader must export.
pub(crate) const VERTEX_ENTRY: &str = "vs_main";
pub(crate) const FRAGMENT_ENTRY: &str = "fs_main";

/// Where the WGSL for the single vertex + fragment pair comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    /// Source compiled into the binary.
    Embedded(Cow<'static, str>),
    /// Source read once, at renderer construction.
    File(PathBuf),
}

impl ShaderSource {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Resolves the WGSL text.
    pub fn load(&self) -> RendererResult<Cow<'_, str>> {
        match self {
            Self::Embedded(src) => Ok(Cow::Borrowed(src.as_ref())),
            Self::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| {
                    RendererError::ShaderLoad {
                        path: path.clone(),
                        source,
                    }
                })?;
                log::debug!("loaded shader {} ({} bytes)", path.display(), text.len());
                Ok(Cow::Owned(text))
            }
        }
    }

    /// Human-readable label for logs and GPU object names.
    pub fn label(&self) -> String {
        match self {
            Self::Embedded(_) => "embedded triangle.wgsl".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self::Embedded(Cow::Borrowed(TRIANGLE_WGSL))
    }
}

/// Parses and validates WGSL, and checks both triangle entry points exist.
pub(crate) fn validate_wgsl(label: &str, source: &str) -> RendererResult<()> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| RendererError::shader_compile(format!("{label}: {}", e.emit_to_string(source))))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| RendererError::shader_compile(format!("{label}: {}", e.emit_to_string(source))))?;

    let has_entry = |name: &str, stage: naga::ShaderStage| {
        module
            .entry_points
            .iter()
            .any(|ep| ep.name == name && ep.stage == stage)
    };

    if !has_entry(VERTEX_ENTRY, naga::ShaderStage::Vertex) {
        return Err(RendererError::shader_compile(format!(
            "{label}: missing vertex entry point `{VERTEX_ENTRY}`"
        )));
    }
    if !has_entry(FRAGMENT_ENTRY, naga::ShaderStage::Fragment) {
        return Err(RendererError::shader_compile(format!(
            "{label}: missing fragment entry point `{FRAGMENT_ENTRY}`"
        )));
    }
    Ok(())
}
