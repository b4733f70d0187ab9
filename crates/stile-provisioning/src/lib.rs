// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User provisioning for stile.
//!
//! Turns identity attributes from an SSO assertion into a local account and
//! a membership in the configured default organization. Creation is
//! idempotent by email; enrollment is idempotent by `(org, user)`.

pub mod error;
pub mod request;
pub mod service;

pub use error::ProvisioningError;
pub use request::{ProvisioningRequest, ProvisioningSource};
pub use service::{ProvisionedUser, ProvisioningService, Result};
