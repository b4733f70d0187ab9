// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assertion attribute extraction.
//!
//! Upstream identity providers deliver a multi-valued attribute bag with each
//! assertion. This module maps the handful of claims the provisioning flow
//! cares about onto their upstream attribute names.

use std::collections::HashMap;

/// Identity claims the provisioning flow consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimField {
	Email,
	FirstName,
	LastName,
}

impl ClaimField {
	/// The attribute name the upstream provider uses for this claim.
	pub fn attribute_name(&self) -> &'static str {
		match self {
			ClaimField::Email => "emailAddress",
			ClaimField::FirstName => "givenName",
			ClaimField::LastName => "surname",
		}
	}
}

/// Multi-valued attribute bag from an SSO assertion.
///
/// Request-scoped and immutable once built. Missing attributes are never an
/// error here; callers decide which claims are required.
#[derive(Debug, Clone, Default)]
pub struct AssertionAttributes {
	attributes: HashMap<String, Vec<String>>,
}

impl AssertionAttributes {
	pub fn new(attributes: HashMap<String, Vec<String>>) -> Self {
		Self { attributes }
	}

	/// Look up a claim, returning the first non-empty value of the mapped
	/// attribute.
	pub fn claim(&self, field: ClaimField) -> Option<&str> {
		self
			.attributes
			.get(field.attribute_name())?
			.iter()
			.map(|v| v.trim())
			.find(|v| !v.is_empty())
	}

	/// Raw access to an attribute's values, for diagnostics.
	pub fn values(&self, attribute: &str) -> Option<&[String]> {
		self.attributes.get(attribute).map(|v| v.as_slice())
	}
}

impl FromIterator<(String, Vec<String>)> for AssertionAttributes {
	fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
		Self {
			attributes: iter.into_iter().collect(),
		}
	}
}
