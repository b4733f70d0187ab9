// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Auto-provisioning configuration.
//!
//! Controls which organization newly provisioned accounts are enrolled in,
//! with what role, and who gets notified when an account is created.

use serde::Deserialize;
use stile_auth::OrgRole;

use crate::error::ConfigError;

/// Provisioning configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
	/// Name of the organization new accounts are enrolled in. The organization
	/// must already exist; enrollment never creates it.
	pub default_org: String,
	/// Role granted on enrollment.
	pub default_role: OrgRole,
	/// Recipients for new-account notification emails. Empty means
	/// notifications are skipped.
	pub admin_emails: Vec<String>,
}

impl Default for ProvisioningConfig {
	fn default() -> Self {
		Self {
			default_org: "scion".to_string(),
			default_role: OrgRole::Member,
			admin_emails: Vec::new(),
		}
	}
}

/// Provisioning configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub default_org: Option<String>,
	#[serde(default)]
	pub default_role: Option<String>,
	#[serde(default)]
	pub admin_emails: Option<Vec<String>>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.default_org.is_some() {
			self.default_org = other.default_org;
		}
		if other.default_role.is_some() {
			self.default_role = other.default_role;
		}
		if other.admin_emails.is_some() {
			self.admin_emails = other.admin_emails;
		}
	}

	pub fn finalize(self) -> Result<ProvisioningConfig, ConfigError> {
		let default_role = match self.default_role {
			Some(raw) => raw
				.parse::<OrgRole>()
				.map_err(|e| ConfigError::InvalidValue {
					key: "provisioning.default_role".to_string(),
					message: e.to_string(),
				})?,
			None => OrgRole::Member,
		};

		Ok(ProvisioningConfig {
			default_org: self.default_org.unwrap_or_else(|| "scion".to_string()),
			default_role,
			admin_emails: self.admin_emails.unwrap_or_default(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ProvisioningConfigLayer::default().finalize().unwrap();
		assert_eq!(config.default_org, "scion");
		assert_eq!(config.default_role, OrgRole::Member);
		assert!(config.admin_emails.is_empty());
	}

	#[test]
	fn test_custom_role_parses() {
		let layer = ProvisioningConfigLayer {
			default_role: Some("editor".to_string()),
			..Default::default()
		};
		assert_eq!(layer.finalize().unwrap().default_role, OrgRole::Editor);
	}

	#[test]
	fn test_invalid_role_is_rejected() {
		let layer = ProvisioningConfigLayer {
			default_role: Some("overlord".to_string()),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("provisioning.default_role"));
	}

	#[test]
	fn test_merge_prefers_other() {
		let mut base = ProvisioningConfigLayer {
			default_org: Some("scion".to_string()),
			..Default::default()
		};
		base.merge(ProvisioningConfigLayer {
			default_org: Some("museum".to_string()),
			admin_emails: Some(vec!["ops@example.com".to_string()]),
			..Default::default()
		});
		let config = base.finalize().unwrap();
		assert_eq!(config.default_org, "museum");
		assert_eq!(config.admin_emails, vec!["ops@example.com".to_string()]);
	}
}
