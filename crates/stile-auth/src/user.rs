// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User entity and username derivation.
//!
//! This module provides:
//! - [`User`] - core user entity with activation state
//! - username validation and derivation from email addresses
//! - [`generate_password_placeholder`] - opaque credential for accounts that
//!   only ever authenticate through the upstream identity provider

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use stile_common_secret::SecretString;

use crate::types::{UserId, UserState};

/// Minimum username length after sanitisation.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length.
pub const USERNAME_MAX_LEN: usize = 39;

/// Length of generated password placeholders.
const PASSWORD_PLACEHOLDER_LEN: usize = 32;

/// Usernames that cannot be claimed by provisioned accounts.
/// Reserved for system use or likely to collide with routes.
pub const RESERVED_USERNAMES: &[&str] = &[
	"root",
	"admin",
	"administrator",
	"sysadmin",
	"system",
	"postmaster",
	"webmaster",
	"noreply",
	"no-reply",
	"support",
	"help",
	"info",
	"api",
	"auth",
	"sso",
	"login",
	"logout",
	"register",
	"settings",
	"profile",
	"account",
	"user",
	"users",
	"org",
	"orgs",
	"organization",
	"organizations",
	"member",
	"members",
	"anonymous",
	"guest",
	"null",
	"undefined",
	"none",
	"test",
	"stile",
];

/// Check if a username is reserved.
pub fn is_username_reserved(username: &str) -> bool {
	let lower = username.to_lowercase();
	RESERVED_USERNAMES.iter().any(|&reserved| reserved == lower)
}

/// A locally provisioned user account.
///
/// Accounts created by the SSO hook authenticate solely through the upstream
/// assertion; the stored password is an opaque placeholder and is never
/// accepted for login.
///
/// # PII Handling
///
/// `email` and `fullname` are user-provided PII and should be redacted in
/// logs where possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: UserId,

	/// Unique username derived from the email local part.
	pub username: String,

	/// Primary email address, unique across users.
	pub email: String,

	/// Display name. Defaults to the email when claims are incomplete.
	pub fullname: String,

	/// Opaque random credential placeholder. Never usable for login.
	pub password: SecretString,

	/// Account lifecycle state.
	pub state: UserState,

	/// When the user was created.
	pub created_at: DateTime<Utc>,

	/// When the user was last updated.
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Returns true if this account is usable.
	pub fn is_active(&self) -> bool {
		self.state == UserState::Active
	}
}

/// Validates a username.
/// Rules:
/// - 3-39 characters
/// - Lowercase alphanumeric and underscores only
/// - Cannot start with underscore
/// - Cannot be all numeric
/// - Cannot be a reserved username
pub fn validate_username(username: &str) -> Result<(), &'static str> {
	if username.len() < USERNAME_MIN_LEN {
		return Err("Username must be at least 3 characters");
	}
	if username.len() > USERNAME_MAX_LEN {
		return Err("Username must be at most 39 characters");
	}
	if !username
		.chars()
		.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
	{
		return Err("Username can only contain lowercase letters, numbers, and underscores");
	}
	if username.starts_with('_') {
		return Err("Username cannot start with underscore");
	}
	if username.chars().all(|c| c.is_ascii_digit()) {
		return Err("Username cannot be all numbers");
	}
	if is_username_reserved(username) {
		return Err("This username is reserved");
	}
	Ok(())
}

/// Derives a username candidate from an email address.
///
/// Takes the local part (before the `@`), lowercases it, and sanitises to
/// alphanumeric plus underscore. Collapses runs of underscores, prefixes
/// all-numeric local parts (a bare number is not a valid username), and pads
/// or truncates to the allowed length.
pub fn username_base_from_email(email: &str) -> String {
	let local = match email.find('@') {
		Some(at) => &email[..at],
		None => email,
	};

	let sanitized: String = local
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() {
				c.to_ascii_lowercase()
			} else {
				'_'
			}
		})
		.collect();

	let collapsed: String = sanitized
		.trim_start_matches('_')
		.split('_')
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join("_");

	let collapsed = if !collapsed.is_empty() && collapsed.chars().all(|c| c.is_ascii_digit()) {
		format!("user_{}", collapsed)
	} else {
		collapsed
	};

	if collapsed.len() < USERNAME_MIN_LEN {
		format!("user_{}", collapsed)
	} else if collapsed.len() > USERNAME_MAX_LEN {
		collapsed[..USERNAME_MAX_LEN].to_string()
	} else {
		collapsed
	}
}

/// Generate an opaque random password placeholder.
///
/// Provisioned accounts never authenticate with this value; it exists only
/// because the account schema requires a credential.
pub fn generate_password_placeholder() -> SecretString {
	let value: String = rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(PASSWORD_PLACEHOLDER_LEN)
		.map(char::from)
		.collect();
	SecretString::new(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn make_test_user() -> User {
		let now = Utc::now();
		User {
			id: UserId::generate(),
			username: "alice".to_string(),
			email: "alice@example.com".to_string(),
			fullname: "Alice Example".to_string(),
			password: generate_password_placeholder(),
			state: UserState::Active,
			created_at: now,
			updated_at: now,
		}
	}

	mod user {
		use super::*;

		#[test]
		fn provisioned_user_is_active() {
			let user = make_test_user();
			assert!(user.is_active());
		}

		#[test]
		fn deleted_user_is_not_active() {
			let mut user = make_test_user();
			user.state = UserState::Deleted;
			assert!(!user.is_active());
		}

		#[test]
		fn password_is_redacted_in_debug() {
			let user = make_test_user();
			let debug = format!("{user:?}");
			assert!(!debug.contains(user.password.expose()));
			assert!(debug.contains("[REDACTED]"));
		}
	}

	mod validate_username {
		use super::*;

		#[test]
		fn accepts_valid_usernames() {
			assert!(validate_username("alice").is_ok());
			assert!(validate_username("bob123").is_ok());
			assert!(validate_username("bob_smith").is_ok());
		}

		#[test]
		fn rejects_too_short() {
			assert!(validate_username("ab").is_err());
			assert!(validate_username("").is_err());
		}

		#[test]
		fn rejects_too_long() {
			let long = "a".repeat(40);
			assert!(validate_username(&long).is_err());
		}

		#[test]
		fn rejects_invalid_chars() {
			assert!(validate_username("user@name").is_err());
			assert!(validate_username("user.name").is_err());
			assert!(validate_username("User").is_err());
		}

		#[test]
		fn rejects_leading_underscore() {
			assert!(validate_username("_alice").is_err());
		}

		#[test]
		fn rejects_all_numeric() {
			assert!(validate_username("12345").is_err());
		}

		#[test]
		fn rejects_reserved() {
			assert!(validate_username("root").is_err());
			assert!(validate_username("admin").is_err());
			assert!(validate_username("sso").is_err());
		}
	}

	mod username_base_from_email {
		use super::*;

		#[test]
		fn takes_local_part_lowercased() {
			assert_eq!(username_base_from_email("Alice@example.com"), "alice");
			assert_eq!(username_base_from_email("bob@x.org"), "bob");
		}

		#[test]
		fn sanitises_punctuation_to_underscore() {
			assert_eq!(username_base_from_email("bob.smith@gmail.com"), "bob_smith");
			assert_eq!(username_base_from_email("a+tag@example.com"), "a_tag");
		}

		#[test]
		fn pads_short_local_parts() {
			assert_eq!(username_base_from_email("jo@example.com"), "user_jo");
		}

		#[test]
		fn truncates_long_local_parts() {
			let email = format!("{}@example.com", "a".repeat(60));
			assert_eq!(username_base_from_email(&email).len(), USERNAME_MAX_LEN);
		}

		#[test]
		fn prefixes_all_numeric_local_parts() {
			assert_eq!(username_base_from_email("12345@example.com"), "user_12345");
			assert_eq!(username_base_from_email("007@example.com"), "user_007");
		}
	}

	mod password_placeholder {
		use super::*;

		#[test]
		fn placeholders_are_unique() {
			let a = generate_password_placeholder();
			let b = generate_password_placeholder();
			assert_ne!(a.expose(), b.expose());
		}

		#[test]
		fn placeholder_has_expected_length() {
			assert_eq!(generate_password_placeholder().expose().len(), 32);
		}
	}

	mod username_proptests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn generated_base_is_always_valid_shape(
				local in "[a-zA-Z][a-zA-Z0-9@._+\\-]{0,50}"
			) {
				let email = format!("{local}@example.com");
				let base = username_base_from_email(&email);
				prop_assert!(base.len() >= USERNAME_MIN_LEN);
				prop_assert!(base.len() <= USERNAME_MAX_LEN);
				prop_assert!(base.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
			}

			#[test]
			fn generated_base_is_never_all_numeric(
				local in "[0-9]{1,50}"
			) {
				let email = format!("{local}@example.com");
				let base = username_base_from_email(&email);
				prop_assert!(!base.chars().all(|c| c.is_ascii_digit()));
			}

			#[test]
			fn reserved_usernames_rejected(
				reserved in proptest::sample::select(RESERVED_USERNAMES.to_vec())
			) {
				prop_assert!(validate_username(reserved).is_err());
			}
		}
	}
}
