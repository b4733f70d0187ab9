// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP configuration.
//!
//! Resolves into [`stile_smtp::SmtpConfig`]. The section is optional: without
//! a host and from address there is no usable transport, so `finalize`
//! returns `None` and notification sending is skipped downstream.

use serde::Deserialize;
use stile_common_secret::SecretString;
use stile_smtp::SmtpConfig;

/// SMTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<SecretString>,
	#[serde(default)]
	pub from_address: Option<String>,
	#[serde(default)]
	pub from_name: Option<String>,
	#[serde(default)]
	pub starttls: Option<bool>,
}

impl SmtpConfigLayer {
	pub fn merge(&mut self, other: SmtpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.from_address.is_some() {
			self.from_address = other.from_address;
		}
		if other.from_name.is_some() {
			self.from_name = other.from_name;
		}
		if other.starttls.is_some() {
			self.starttls = other.starttls;
		}
	}

	/// Resolve into a usable SMTP configuration.
	///
	/// Returns `None` unless both `host` and `from_address` are set.
	pub fn finalize(self) -> Option<SmtpConfig> {
		let host = self.host?;
		let from_address = self.from_address?;

		Some(SmtpConfig {
			host,
			port: self.port.unwrap_or(25),
			username: self.username,
			password: self.password,
			from_address,
			from_name: self.from_name.unwrap_or_else(|| "Stile".to_string()),
			starttls: self.starttls.unwrap_or(false),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_finalize_requires_host() {
		let layer = SmtpConfigLayer {
			from_address: Some("noreply@example.com".to_string()),
			..Default::default()
		};
		assert!(layer.finalize().is_none());
	}

	#[test]
	fn test_finalize_requires_from_address() {
		let layer = SmtpConfigLayer {
			host: Some("mail.example.com".to_string()),
			..Default::default()
		};
		assert!(layer.finalize().is_none());
	}

	#[test]
	fn test_finalize_defaults() {
		let layer = SmtpConfigLayer {
			host: Some("mail.example.com".to_string()),
			from_address: Some("noreply@example.com".to_string()),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.port, 25);
		assert!(!config.starttls);
		assert_eq!(config.from_name, "Stile");
		assert!(config.username.is_none());
	}

	#[test]
	fn test_merge_prefers_other() {
		let mut base = SmtpConfigLayer {
			host: Some("mail-a.example.com".to_string()),
			port: Some(25),
			..Default::default()
		};
		base.merge(SmtpConfigLayer {
			host: Some("mail-b.example.com".to_string()),
			starttls: Some(true),
			..Default::default()
		});
		assert_eq!(base.host.as_deref(), Some("mail-b.example.com"));
		assert_eq!(base.port, Some(25));
		assert_eq!(base.starttls, Some(true));
	}
}
