use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use winit::dpi::LogicalSize;

use triangle_engine::backend::headless::{HeadlessBackend, HeadlessSettings};
use triangle_engine::backend::wgpu::{WgpuBackend, WgpuSettings};
use triangle_engine::backend::BackendKind;
use triangle_engine::coords::Extent;
use triangle_engine::logging::{init_logging, LoggingConfig};
use triangle_engine::scene::{SceneDescriptor, ShaderSource, DEFAULT_SHADER_PATH};
use triangle_engine::time::DEFAULT_FPS_CAP;
use triangle_engine::window::{run_headless, Runtime, RuntimeConfig};

/// Frames drawn by `--backend headless` when `--headless-frames` is absent.
const DEFAULT_HEADLESS_FRAMES: u64 = 300;

#[derive(Parser, Debug)]
#[command(name = "triangle-demo", version, about = "Spinning RGB triangle")]
struct Cli {
    /// Graphics API: vulkan, d3d12 (d3d11 maps here), gl, metal, auto or headless.
    #[arg(long, default_value = "auto")]
    backend: BackendKind,

    /// Initial window width, in logical pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height, in logical pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Frame-rate cap, between 1 and 1000.
    #[arg(long, default_value_t = DEFAULT_FPS_CAP, value_parser = parse_fps, conflicts_with = "uncapped")]
    fps: f32,

    /// Render as fast as the present mode allows.
    #[arg(long)]
    uncapped: bool,

    /// Swap behavior; falls back to fifo when unsupported.
    #[arg(long, value_enum, default_value_t = PresentModeArg::Fifo)]
    present_mode: PresentModeArg,

    /// Load WGSL from this file instead of the built-in shader. Without a
    /// value, loads the stock shader from disk.
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_SHADER_PATH)]
    shader: Option<PathBuf>,

    /// Render this many frames without a window, then exit.
    #[arg(long)]
    headless_frames: Option<u64>,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long = "log")]
    log_filter: Option<String>,
}

const FPS_RANGE: std::ops::RangeInclusive<f32> = 1.0..=1000.0;

fn parse_fps(s: &str) -> Result<f32, String> {
    let fps: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if FPS_RANGE.contains(&fps) {
        Ok(fps)
    } else {
        Err(format!(
            "{fps} is outside {}..={}; use --uncapped to disable the cap",
            FPS_RANGE.start(),
            FPS_RANGE.end()
        ))
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresentModeArg {
    Fifo,
    Immediate,
    Mailbox,
}

impl From<PresentModeArg> for wgpu::PresentMode {
    fn from(mode: PresentModeArg) -> Self {
        match mode {
            PresentModeArg::Fifo => wgpu::PresentMode::Fifo,
            PresentModeArg::Immediate => wgpu::PresentMode::Immediate,
            PresentModeArg::Mailbox => wgpu::PresentMode::Mailbox,
        }
    }
}

impl Cli {
    fn fps_cap(&self) -> Option<f32> {
        (!self.uncapped).then_some(self.fps)
    }

    fn scene(&self) -> anyhow::Result<SceneDescriptor> {
        let scene = SceneDescriptor::default();
        let Some(path) = &self.shader else {
            return Ok(scene);
        };
        anyhow::ensure!(path.is_file(), "shader file {} does not exist", path.display());
        Ok(scene.with_shader(ShaderSource::file(path)))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log_filter.clone(),
        ..LoggingConfig::default()
    });

    let scene = cli.scene()?;

    if cli.headless_frames.is_some() || cli.backend == BackendKind::Headless {
        return headless(&cli, &scene);
    }

    let config = RuntimeConfig {
        initial_size: LogicalSize::new(f64::from(cli.width), f64::from(cli.height)),
        fps_cap: cli.fps_cap(),
        ..RuntimeConfig::default()
    };
    let settings = WgpuSettings {
        api: cli.backend,
        present_mode: cli.present_mode.into(),
        ..WgpuSettings::default()
    };

    log::info!(
        "starting {}x{} on {} ({:?}, cap {:?})",
        cli.width,
        cli.height,
        settings.api,
        settings.present_mode,
        config.fps_cap
    );

    Runtime::run::<WgpuBackend>(config, settings, scene)
}

fn headless(cli: &Cli, scene: &SceneDescriptor) -> anyhow::Result<()> {
    if cli.backend.is_gpu() && cli.backend != BackendKind::Auto {
        log::warn!("--headless-frames ignores --backend {}", cli.backend);
    }

    let frames = cli.headless_frames.unwrap_or(DEFAULT_HEADLESS_FRAMES);
    let report = run_headless::<HeadlessBackend>(
        frames,
        Extent::clamped(cli.width, cli.height),
        &HeadlessSettings::default(),
        scene,
        cli.fps_cap(),
    )
    .context("headless run failed")?;

    anyhow::ensure!(
        report.leaked.is_empty(),
        "resources still live after destroy: {:?}",
        report.leaked
    );

    println!(
        "{} frames presented, {} skipped, {} swapchain rebuilds in {:.2?}",
        report.presented, report.skipped, report.swapchain_rebuilds, report.elapsed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_reference_window() {
        let cli = Cli::parse_from(["triangle-demo"]);
        assert_eq!(cli.backend, BackendKind::Auto);
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert_eq!(cli.fps_cap(), Some(DEFAULT_FPS_CAP));
        assert!(cli.headless_frames.is_none());
    }

    #[test]
    fn parses_backend_aliases_and_uncapped() {
        let cli = Cli::parse_from(["triangle-demo", "--backend", "dx11", "--uncapped"]);
        assert_eq!(cli.backend, BackendKind::Direct3D12);
        assert_eq!(cli.fps_cap(), None);
    }

    #[test]
    fn fps_and_uncapped_conflict() {
        let res = Cli::try_parse_from(["triangle-demo", "--fps", "30", "--uncapped"]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["triangle-demo", "--backend", "glide"]).is_err());
    }

    #[test]
    fn fps_outside_range_is_rejected() {
        for bad in ["1e-20", "0", "-5", "NaN", "inf", "5000", "fast"] {
            assert!(
                Cli::try_parse_from(["triangle-demo", "--fps", bad]).is_err(),
                "{bad}"
            );
        }
        let cli = Cli::parse_from(["triangle-demo", "--fps", "144"]);
        assert_eq!(cli.fps_cap(), Some(144.0));
    }

    #[test]
    fn bare_shader_flag_uses_the_stock_path() {
        let cli = Cli::parse_from(["triangle-demo", "--shader"]);
        assert_eq!(cli.shader, Some(PathBuf::from(DEFAULT_SHADER_PATH)));

        let cli = Cli::parse_from(["triangle-demo", "--shader", "custom.wgsl", "--uncapped"]);
        assert_eq!(cli.shader, Some(PathBuf::from("custom.wgsl")));
    }
}
