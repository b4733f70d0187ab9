// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for stile.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`STILE_*`)
//!
//! # Usage
//!
//! ```ignore
//! use stile_config::load_config;
//!
//! let config = load_config()?;
//! println!("Default org: {}", config.provisioning.default_org);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::StileConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved stile configuration.
#[derive(Debug, Clone, Default)]
pub struct StileConfig {
	pub database: DatabaseConfig,
	pub smtp: Option<stile_smtp::SmtpConfig>,
	pub provisioning: ProvisioningConfig,
	pub logging: LoggingConfig,
}

impl StileConfig {
	/// True when notification emails can actually be delivered: a transport
	/// is configured and at least one recipient is set.
	pub fn notifications_enabled(&self) -> bool {
		self.smtp.is_some() && !self.provisioning.admin_emails.is_empty()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`STILE_*`)
/// 2. Config file (`/etc/stile/stile.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<StileConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];

	sources.sort_by_key(|s| s.precedence());

	let mut merged = StileConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<StileConfig, ConfigError> {
	let mut merged = StileConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<StileConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];

	sources.sort_by_key(|s| s.precedence());

	let mut merged = StileConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: StileConfigLayer) -> Result<StileConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let provisioning = layer.provisioning.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	let smtp = layer.smtp.and_then(|l| l.finalize());

	validate_config(&provisioning, smtp.as_ref())?;

	info!(
		database = %database.url,
		default_org = %provisioning.default_org,
		default_role = %provisioning.default_role,
		admin_recipients = provisioning.admin_emails.len(),
		smtp_configured = smtp.is_some(),
		"Configuration loaded"
	);

	Ok(StileConfig {
		database,
		smtp,
		provisioning,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(
	provisioning: &ProvisioningConfig,
	smtp: Option<&stile_smtp::SmtpConfig>,
) -> Result<(), ConfigError> {
	if provisioning.default_org.is_empty() {
		return Err(ConfigError::Validation(
			"provisioning.default_org must not be empty".to_string(),
		));
	}

	for email in &provisioning.admin_emails {
		if !stile_smtp::is_valid_email(email) {
			return Err(ConfigError::InvalidValue {
				key: "provisioning.admin_emails".to_string(),
				message: format!("'{email}' is not a valid email address"),
			});
		}
	}

	if let Some(smtp) = smtp {
		if !stile_smtp::is_valid_email(&smtp.from_address) {
			return Err(ConfigError::InvalidValue {
				key: "smtp.from_address".to_string(),
				message: format!("'{}' is not a valid email address", smtp.from_address),
			});
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use stile_auth::OrgRole;

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(StileConfigLayer::default()).unwrap();
		assert_eq!(config.database.url, "sqlite:./stile.db");
		assert_eq!(config.provisioning.default_org, "scion");
		assert_eq!(config.provisioning.default_role, OrgRole::Member);
		assert!(config.smtp.is_none());
		assert!(!config.notifications_enabled());
	}

	#[test]
	fn test_invalid_admin_email_rejected() {
		let layer = StileConfigLayer {
			provisioning: Some(ProvisioningConfigLayer {
				admin_emails: Some(vec!["not-an-email".to_string()]),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(finalize(layer).is_err());
	}

	#[test]
	fn test_empty_default_org_rejected() {
		let layer = StileConfigLayer {
			provisioning: Some(ProvisioningConfigLayer {
				default_org: Some(String::new()),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(finalize(layer).is_err());
	}

	#[test]
	fn test_notifications_enabled_requires_both() {
		let layer = StileConfigLayer {
			smtp: Some(SmtpConfigLayer {
				host: Some("mail.example.com".to_string()),
				from_address: Some("noreply@example.com".to_string()),
				..Default::default()
			}),
			provisioning: Some(ProvisioningConfigLayer {
				admin_emails: Some(vec!["ops@example.com".to_string()]),
				..Default::default()
			}),
			..Default::default()
		};
		let config = finalize(layer).unwrap();
		assert!(config.notifications_enabled());
	}
}
