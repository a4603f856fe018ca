use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` provides one.
///
/// wgpu and naga are chatty at info level; keep them at warn.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "triangle_engine=debug,wgpu=warn") and wins over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// `None` drops timestamps from the output.
    pub timestamps: Option<env_logger::TimestampPrecision>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: Some(env_logger::TimestampPrecision::Millis),
        }
    }
}

impl LoggingConfig {
    /// Filter string that will be applied: explicit, then `RUST_LOG`, then
    /// [`DEFAULT_FILTER`].
    pub fn resolved_filter(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }

    fn builder(&self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&self.resolved_filter())
            .write_style(self.write_style)
            .format_timestamp(self.timestamps);
        builder
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once.
///
/// Later calls are ignored, as is a logger someone else installed first.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolved_filter();
        if config.builder().try_init().is_ok() {
            log::debug!("logging initialized ({filter})");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let cfg = LoggingConfig {
            env_filter: Some("triangle_engine=trace".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(cfg.resolved_filter(), "triangle_engine=trace");
    }

    #[test]
    fn blank_filter_is_ignored() {
        let cfg = LoggingConfig {
            env_filter: Some("  ".into()),
            ..LoggingConfig::default()
        };
        assert_ne!(cfg.resolved_filter().trim(), "");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
        log::info!("still alive");
    }
}
