// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization and membership types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrgId, OrgRole, UserId};

/// An organization users can be enrolled into.
///
/// The provisioning flow never creates organizations; the configured default
/// organization must already exist in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
	/// Unique identifier for this organization.
	pub id: OrgId,

	/// Unique, URL-safe organization name (e.g., "scion").
	pub name: String,

	/// Human-readable title shown in the UI.
	pub title: String,

	/// When the organization was created.
	pub created_at: DateTime<Utc>,
}

/// A user's membership in an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgMembership {
	/// The organization.
	pub org_id: OrgId,

	/// The member.
	pub user_id: UserId,

	/// The member's role within the organization.
	pub role: OrgRole,

	/// Provenance of the membership (e.g., "sso"), if provisioned.
	pub provisioned_by: Option<String>,

	/// When the membership was created.
	pub created_at: DateTime<Utc>,
}
