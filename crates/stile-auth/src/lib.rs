// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity domain types for stile.
//!
//! This crate defines the entities the provisioning flow operates on: users,
//! organizations, memberships, and the typed IDs and roles that tie them
//! together. It carries no persistence; see `stile-db` for the repositories.

pub mod org;
pub mod types;
pub mod user;

pub use org::{OrgMembership, Organization};
pub use types::{InvalidOrgRole, MembershipId, OrgId, OrgRole, UserId, UserState};
pub use user::{
	generate_password_placeholder, is_username_reserved, username_base_from_email,
	validate_username, User, RESERVED_USERNAMES, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};
