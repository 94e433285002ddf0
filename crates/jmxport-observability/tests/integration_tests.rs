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
//! Integration tests for logging setup.
//!
//! The global subscriber is installed exactly once in this binary; every
//! other test only builds configuration.

use jmxport_observability::{init_tracing_with_config, LogConfig, LogError, LogFormat, LogOutput};

#[test]
fn test_config_builder_chaining() {
    let config = LogConfig::new()
        .with_format(LogFormat::Json)
        .with_level("debug")
        .with_timestamps(false)
        .with_color(false)
        .with_targets(false)
        .with_output(LogOutput::Stdout);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level.as_deref(), Some("debug"));
    assert!(!config.use_timestamps);
    assert!(!config.use_color);
    assert!(!config.include_targets);
    assert_eq!(config.output, LogOutput::Stdout);
}

#[test]
fn test_second_install_is_rejected() {
    let config = || {
        LogConfig::new()
            .with_format(LogFormat::Compact)
            .with_level("warn")
            .with_color(false)
    };

    // Only this test installs a subscriber.
    assert!(init_tracing_with_config(config()).is_ok());
    assert!(matches!(
        init_tracing_with_config(config()),
        Err(LogError::AlreadyInitialized(_))
    ));
}
