use serde::Deserialize;
use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::handler::{CompactHandler, Handler, TimestampedHandler};
use crate::layer::PrettyLayer;
use crate::options::{Options, OptionsError};

/// Which header a line starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// `--> message`
    #[default]
    Compact,
    /// `3:04PM INF message`
    Timestamped,
}

/// Configuration of the global subscriber installed by [`init_tracing_with_config`].
///
/// **Fields**
/// - `style`: header layout, see [`Style`].
/// - `options`: [`Options`] passed to the handler.
///
/// Lines are always written to stderr.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub style: Style,
    pub options: Options,
}

/// Error type returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),

    #[error("a global tracing subscriber is already installed")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Registry with a [`PrettyLayer`] rendering through `handler`.
///
/// Useful with `tracing::subscriber::with_default` to scope rendering to a
/// block, e.g. in tests.
pub fn subscriber<H>(handler: H) -> impl tracing::Subscriber + Send + Sync
where
    H: Handler + Clone + 'static,
{
    Registry::default().with(PrettyLayer::new(handler))
}

/// Initialize the global `tracing` subscriber from a [`LayerConfig`].
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`PrettyLayer`] as the global
/// default subscriber, so all `tracing` events in the process are printed
/// to stderr in the configured style.
pub fn init_tracing_with_config(config: LayerConfig) -> Result<(), InitError> {
    match config.style {
        Style::Compact => install(CompactHandler::new(io::stderr(), config.options)?),
        Style::Timestamped => install(TimestampedHandler::new(io::stderr(), config.options)?),
    }
}

/// Initialize tracing in the compact style with options read from the
/// `PRETTY_LOG_*` environment variables.
///
/// This is the recommended entrypoint for command-line tools.
pub fn init_tracing() -> Result<(), InitError> {
    init_tracing_with_config(LayerConfig {
        style: Style::Compact,
        options: Options::from_env()?,
    })
}

fn install<H>(handler: H) -> Result<(), InitError>
where
    H: Handler + Clone + 'static,
{
    tracing::subscriber::set_global_default(subscriber(handler))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    #[test]
    fn config_defaults_to_compact() {
        let config = LayerConfig::default();
        assert_eq!(config.style, Style::Compact);
        assert_eq!(config.options, Options::default());
    }

    #[test]
    fn invalid_options_fail_before_installing() {
        let config = LayerConfig {
            style: Style::Timestamped,
            options: Options::default()
                .with_level(Level::WARN)
                .with_time_format("%Q"),
        };
        assert!(matches!(
            init_tracing_with_config(config),
            Err(InitError::Options(OptionsError::InvalidTimeFormat(_)))
        ));
    }
}
