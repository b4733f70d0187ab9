// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request provisioning outcomes.
//!
//! The hook never fails the host request; instead every path through the
//! flow folds into one of these values. "Skipped by design" and "failed
//! unexpectedly" are distinct so callers and tests can tell them apart.

use stile_auth::UserId;

/// Why the hook did not run at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// No upstream principal on the request.
	NoRemoteUser,
	/// A local session user is already attached.
	SessionPresent,
}

/// Why the flow aborted before an account was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
	/// The assertion carried no email claim.
	MissingEmail,
	/// Account resolution failed (database error, username namespace
	/// exhausted).
	ResolutionFailed(String),
}

/// Result of the enrollment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentStatus {
	/// Membership in the default org exists (created now or previously).
	Done,
	/// User already existed, so enrollment was not attempted.
	SkippedExistingUser,
	/// The configured organization does not exist.
	OrgMissing(String),
	/// Enrollment hit an unexpected error.
	Failed(String),
}

/// Result of the notification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
	/// Notification emails were delivered.
	Sent { recipients: usize },
	/// Notification was skipped by design.
	Skipped(NotifySkipReason),
	/// Delivery failed.
	Failed(String),
}

/// Why the notification step was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifySkipReason {
	/// The user was not created this request, so there is nothing to announce.
	ExistingUser,
	/// SMTP transport or admin recipients are not configured.
	Unconfigured,
}

/// What a provisioning run did for the resolved account.
#[derive(Debug, Clone)]
pub struct ProvisioningReport {
	pub user_id: UserId,
	pub username: String,
	pub email: String,
	/// True when the account was created during this request.
	pub created: bool,
	pub enrollment: EnrollmentStatus,
	pub notification: NotificationStatus,
}

/// Terminal state of one run of the provisioning hook.
#[derive(Debug, Clone)]
pub enum ProvisioningOutcome {
	/// The hook did not apply to this request.
	Skipped(SkipReason),
	/// The flow started but aborted before resolving an account.
	Aborted(AbortReason),
	/// An account was resolved; see the report for the step-by-step result.
	Completed(ProvisioningReport),
}

impl ProvisioningOutcome {
	/// The resolved username, when the flow completed.
	pub fn username(&self) -> Option<&str> {
		match self {
			ProvisioningOutcome::Completed(report) => Some(&report.username),
			_ => None,
		}
	}

	pub fn is_skipped(&self) -> bool {
		matches!(self, ProvisioningOutcome::Skipped(_))
	}
}
