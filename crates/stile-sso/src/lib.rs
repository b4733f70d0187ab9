// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SSO auto-provisioning hook for stile.
//!
//! When an upstream SSO layer authenticates a principal that has no local
//! account, this crate creates the account, enrolls it in the configured
//! default organization, and notifies administrators. Every run folds into a
//! [`ProvisioningOutcome`]; the hook never fails the host request.

pub mod assertion;
pub mod handler;
pub mod middleware;
pub mod outcome;

pub use assertion::{AssertionAttributes, ClaimField};
pub use handler::{RequestIdentity, SsoProvisioningHandler};
pub use middleware::provision_layer;
pub use outcome::{
	AbortReason, EnrollmentStatus, NotificationStatus, NotifySkipReason, ProvisioningOutcome,
	ProvisioningReport, SkipReason,
};
