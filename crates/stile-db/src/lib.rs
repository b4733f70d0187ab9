// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence layer for stile.
//!
//! Repositories follow a store-trait pattern: each entity gets a `*Store`
//! trait for callers that want to mock persistence, and a `*Repository`
//! struct holding a `SqlitePool` that implements it. IDs are UUID strings,
//! timestamps RFC 3339 strings.

pub mod error;
pub mod org;
pub mod pool;
pub mod testing;
pub mod user;

pub use error::{DbError, Result};
pub use org::{OrgRepository, OrgStore};
pub use pool::create_pool;
pub use user::{UserRepository, UserStore, USERNAME_SUFFIX_CAP};
