// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, each with a resolved struct and a mergeable layer.

pub mod database;
pub mod logging;
pub mod provisioning;
pub mod smtp;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use logging::{init_tracing, LoggingConfig, LoggingConfigLayer};
pub use provisioning::{ProvisioningConfig, ProvisioningConfigLayer};
pub use smtp::SmtpConfigLayer;
