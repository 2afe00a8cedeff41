use std::sync::Once;

/// Used when neither `--log` nor `RUST_LOG` is given. wgpu is chatty at info.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
///
/// `filter` uses env_logger syntax and is layered on top of `RUST_LOG`.
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER));
        if let Some(filter) = filter {
            builder.parse_filters(filter);
        }
        builder.init();

        log::debug!("logging initialized");
    });
}
