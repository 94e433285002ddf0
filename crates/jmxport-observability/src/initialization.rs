// Copyright (C) 2026  jmxport contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Global tracing subscriber installation.

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install a global subscriber with the given format and optional filter.
///
/// ```ignore
/// use jmxport_observability::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Json, Some("debug")).unwrap();
/// ```
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::new().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(config)
}

/// Install a global subscriber from a full [`LogConfig`].
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let filter = build_env_filter(&config)?;
    let layer = build_fmt_layer(&config).with_filter(filter);

    Registry::default()
        .with(layer)
        .try_init()
        .map_err(|e| LogError::AlreadyInitialized(e.to_string()))
}

fn build_fmt_layer(config: &LogConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_writer(writer_for(config.output))
        .with_target(config.include_targets);

    match (config.format, config.use_timestamps) {
        (LogFormat::Json, true) => base.json().boxed(),
        (LogFormat::Json, false) => base.json().without_time().boxed(),
        (LogFormat::Pretty, true) => base.pretty().with_ansi(config.use_color).boxed(),
        (LogFormat::Pretty, false) => base
            .pretty()
            .without_time()
            .with_ansi(config.use_color)
            .boxed(),
        (LogFormat::Compact, true) => base.compact().with_ansi(config.use_color).boxed(),
        (LogFormat::Compact, false) => base
            .compact()
            .without_time()
            .with_ansi(config.use_color)
            .boxed(),
    }
}

fn writer_for(output: LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}

fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let filter = config.effective_filter();
    EnvFilter::try_new(&filter).map_err(|e| LogError::InvalidFilter {
        filter,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Installing the global subscriber is one-shot per process, so only
    // filter construction is exercised here.

    #[test]
    fn test_module_directive_parses() {
        let config = LogConfig::new().with_level("jmxport_server=debug,tower_http=info");
        assert!(build_env_filter(&config).is_ok());
    }

    #[test]
    fn test_garbage_directive_rejected() {
        let config = LogConfig::new().with_level("jmxport_server=notalevel");
        assert!(matches!(
            build_env_filter(&config),
            Err(LogError::InvalidFilter { .. })
        ));
    }
}
