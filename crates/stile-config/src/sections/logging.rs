// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration.

use serde::Deserialize;

/// Logging configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Tracing filter directive, e.g. `info` or `stile_sso=debug,info`.
	pub level: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
		}
	}
}

/// Logging configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| "info".to_string()),
		}
	}
}

/// Install a global tracing subscriber using the configured filter.
///
/// `RUST_LOG` overrides the configured level when set. Safe to call once per
/// process; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
	use tracing_subscriber::{fmt, EnvFilter};

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

	let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_level_is_info() {
		assert_eq!(LoggingConfigLayer::default().finalize().level, "info");
	}

	#[test]
	fn test_custom_level() {
		let layer = LoggingConfigLayer {
			level: Some("debug".to_string()),
		};
		assert_eq!(layer.finalize().level, "debug");
	}
}
