// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// The source of a provisioning request, recorded as membership provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningSource {
	/// SAML/OIDC single sign-on.
	Sso,
}

impl std::fmt::Display for ProvisioningSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Sso => write!(f, "sso"),
		}
	}
}

/// Request to provision a user.
///
/// Captures the identity attributes extracted from an SSO assertion. Only the
/// email is required; name parts are optional and fall back to the email when
/// building the account's full name.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
	/// User's email address (required).
	pub email: String,

	/// Given name from the assertion, if present.
	pub given_name: Option<String>,

	/// Surname from the assertion, if present.
	pub surname: Option<String>,

	/// Source of this provisioning request.
	pub source: ProvisioningSource,
}

impl ProvisioningRequest {
	/// Create a request for SSO provisioning.
	pub fn sso(
		email: impl Into<String>,
		given_name: Option<String>,
		surname: Option<String>,
	) -> Self {
		Self {
			email: email.into(),
			given_name,
			surname,
			source: ProvisioningSource::Sso,
		}
	}

	/// Full name for the account: `"{given} {surname}"` when both name parts
	/// are present and non-empty, otherwise the email address.
	pub fn fullname(&self) -> String {
		match (self.given_name.as_deref(), self.surname.as_deref()) {
			(Some(given), Some(surname)) if !given.is_empty() && !surname.is_empty() => {
				format!("{given} {surname}")
			}
			_ => self.email.clone(),
		}
	}
}
