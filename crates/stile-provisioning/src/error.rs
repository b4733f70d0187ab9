// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use stile_db::DbError;

/// Errors from user provisioning, one variant per failure mode so callers
/// can react to each step differently.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	/// The request carried no usable email address.
	#[error("provisioning request has no email address")]
	MissingEmail,

	/// Every candidate username derived from the email is already taken.
	#[error("username namespace exhausted: {0}")]
	UsernameNamespaceExhausted(String),

	/// The configured target organization does not exist. Enrollment never
	/// creates organizations.
	#[error("organization '{0}' not found")]
	OrganizationNotFound(String),

	/// Underlying database failure.
	#[error(transparent)]
	Database(DbError),
}

impl From<DbError> for ProvisioningError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::NamespaceExhausted(msg) => ProvisioningError::UsernameNamespaceExhausted(msg),
			other => ProvisioningError::Database(other),
		}
	}
}
