// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for the identity domain.
//!
//! - **ID newtypes**: type-safe wrappers around UUIDs ([`UserId`], [`OrgId`],
//!   [`MembershipId`]) preventing accidental mixing
//! - **[`OrgRole`]**: the role a member holds within an organization
//! - **[`UserState`]**: account lifecycle state
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(OrgId, "Unique identifier for an organization.");
define_id_type!(MembershipId, "Unique identifier for an organization membership.");

// =============================================================================
// Organization Roles
// =============================================================================

/// Roles within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
	/// Manage members, datasets, and organization settings.
	Admin,
	/// Create and edit content owned by the organization.
	Editor,
	/// Read access to the organization's private content.
	Member,
}

impl OrgRole {
	/// Returns all available organization roles.
	pub fn all() -> &'static [OrgRole] {
		&[OrgRole::Admin, OrgRole::Editor, OrgRole::Member]
	}
}

impl fmt::Display for OrgRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrgRole::Admin => write!(f, "admin"),
			OrgRole::Editor => write!(f, "editor"),
			OrgRole::Member => write!(f, "member"),
		}
	}
}

impl FromStr for OrgRole {
	type Err = InvalidOrgRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"admin" => Ok(OrgRole::Admin),
			"editor" => Ok(OrgRole::Editor),
			"member" => Ok(OrgRole::Member),
			_ => Err(InvalidOrgRole(s.to_string())),
		}
	}
}

/// Error returned when parsing an unknown organization role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOrgRole(pub String);

impl fmt::Display for InvalidOrgRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown organization role '{}'", self.0)
	}
}

impl std::error::Error for InvalidOrgRole {}

// =============================================================================
// Account State
// =============================================================================

/// Lifecycle state of a user account.
///
/// SSO-provisioned accounts start out [`UserState::Active`]: the upstream
/// identity provider has already verified the principal, so there is no
/// email-confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserState {
	/// Account is usable.
	Active,
	/// Account awaits activation (never used for SSO-provisioned users).
	Pending,
	/// Account has been deactivated.
	Deleted,
}

impl fmt::Display for UserState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UserState::Active => write!(f, "active"),
			UserState::Pending => write!(f, "pending"),
			UserState::Deleted => write!(f, "deleted"),
		}
	}
}

impl FromStr for UserState {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"active" => Ok(UserState::Active),
			"pending" => Ok(UserState::Pending),
			"deleted" => Ok(UserState::Deleted),
			_ => Err(()),
		}
	}
}
