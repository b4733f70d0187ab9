// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Axum adapter for the provisioning hook.
//!
//! The host's authentication layer is expected to insert [`RequestIdentity`]
//! and [`AssertionAttributes`] into request extensions before this layer
//! runs. The middleware executes the hook, attaches the outcome as an
//! extension, and always forwards the request.

use std::sync::Arc;

use axum::{
	extract::{Request, State},
	middleware::Next,
	response::Response,
};

use crate::assertion::AssertionAttributes;
use crate::handler::{RequestIdentity, SsoProvisioningHandler};
use crate::outcome::ProvisioningOutcome;

/// Run the provisioning hook for one request.
///
/// Missing extensions are treated as "no identity", which the hook maps to a
/// skipped outcome. The request is forwarded unconditionally.
pub async fn provision_layer(
	State(handler): State<Arc<SsoProvisioningHandler>>,
	mut request: Request,
	next: Next,
) -> Response {
	let identity = request
		.extensions()
		.get::<RequestIdentity>()
		.cloned()
		.unwrap_or_default();
	let attributes = request
		.extensions()
		.get::<AssertionAttributes>()
		.cloned()
		.unwrap_or_default();

	let outcome = handler.identify(&identity, &attributes).await;
	request.extensions_mut().insert(outcome);

	next.run(request).await
}

/// Extension accessor for downstream handlers.
pub fn outcome_from_request(request: &Request) -> Option<&ProvisioningOutcome> {
	request.extensions().get::<ProvisioningOutcome>()
}
