use log::SetLoggerError;

/// Install `env_logger` as the logger, filtering at `info` unless `RUST_LOG` says otherwise.
/// Fails if the binding installed a logger already. Does nothing without the
/// `builtin_env_logger` feature.
pub fn try_init() -> Result<(), SetLoggerError> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "builtin_env_logger")] {
            env_logger::try_init_from_env(
                env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
            )
        } else {
            Ok(())
        }
    }
}
