// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-request provisioning hook.
//!
//! `identify` runs on every authenticated request. It is deliberately
//! infallible: whatever happens inside (missing claims, database errors,
//! delivery failures) is logged and folded into a [`ProvisioningOutcome`],
//! never surfaced to the host request.

use std::sync::Arc;

use stile_config::StileConfig;
use stile_db::{OrgRepository, UserRepository};
use stile_email::{EmailRequest, EmailService};
use stile_provisioning::{
	ProvisionedUser, ProvisioningError, ProvisioningRequest, ProvisioningService,
};
use stile_smtp::SmtpClient;

use crate::assertion::{AssertionAttributes, ClaimField};
use crate::outcome::{
	AbortReason, EnrollmentStatus, NotificationStatus, NotifySkipReason, ProvisioningOutcome,
	ProvisioningReport, SkipReason,
};

/// Identity markers the host attaches to a request before the hook runs.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
	/// Principal asserted by the upstream SSO layer, if any.
	pub remote_user: Option<String>,
	/// Local session user already attached to the request, if any.
	pub session_user: Option<String>,
}

impl RequestIdentity {
	/// The hook acts only for an upstream principal with no local session.
	pub fn should_provision(&self) -> Option<SkipReason> {
		if self.remote_user.is_none() {
			return Some(SkipReason::NoRemoteUser);
		}
		if self.session_user.is_some() {
			return Some(SkipReason::SessionPresent);
		}
		None
	}
}

/// Auto-provisioning hook for SSO logins.
pub struct SsoProvisioningHandler {
	provisioning: ProvisioningService,
	email: Option<EmailService>,
	admin_emails: Vec<String>,
}

impl SsoProvisioningHandler {
	/// Create a handler from pre-built services.
	pub fn new(
		provisioning: ProvisioningService,
		email: Option<EmailService>,
		admin_emails: Vec<String>,
	) -> Self {
		Self {
			provisioning,
			email,
			admin_emails,
		}
	}

	/// Wire a handler from resolved configuration and a database pool.
	///
	/// # Errors
	/// Returns [`stile_smtp::SmtpError`] when SMTP is configured but the
	/// transport cannot be built.
	pub fn from_config(
		config: &StileConfig,
		pool: sqlx::SqlitePool,
	) -> Result<Self, stile_smtp::SmtpError> {
		let user_repo = Arc::new(UserRepository::new(pool.clone()));
		let org_repo = Arc::new(OrgRepository::new(pool));
		let provisioning =
			ProvisioningService::new(user_repo, org_repo, config.provisioning.clone());

		let email = match &config.smtp {
			Some(smtp_config) => {
				let client = SmtpClient::new(smtp_config.clone())?;
				Some(EmailService::new(Arc::new(client)))
			}
			None => None,
		};

		Ok(Self::new(
			provisioning,
			email,
			config.provisioning.admin_emails.clone(),
		))
	}

	/// Run the provisioning flow for one request.
	///
	/// Infallible: every failure mode maps to an outcome variant.
	#[tracing::instrument(
		name = "sso_identify",
		skip(self, identity, attributes),
		fields(remote_user = ?identity.remote_user)
	)]
	pub async fn identify(
		&self,
		identity: &RequestIdentity,
		attributes: &AssertionAttributes,
	) -> ProvisioningOutcome {
		if let Some(reason) = identity.should_provision() {
			tracing::trace!(?reason, "provisioning hook does not apply");
			return ProvisioningOutcome::Skipped(reason);
		}

		let Some(email) = attributes.claim(ClaimField::Email) else {
			tracing::warn!("assertion carries no email claim, aborting provisioning");
			return ProvisioningOutcome::Aborted(AbortReason::MissingEmail);
		};

		let request = ProvisioningRequest::sso(
			email,
			attributes.claim(ClaimField::FirstName).map(String::from),
			attributes.claim(ClaimField::LastName).map(String::from),
		);

		let provisioned = match self.provisioning.provision_user(&request).await {
			Ok(provisioned) => provisioned,
			Err(e) => {
				tracing::error!(error = %e, email = %request.email, "user resolution failed");
				return ProvisioningOutcome::Aborted(AbortReason::ResolutionFailed(e.to_string()));
			}
		};

		let enrollment = self.enroll(&provisioned, &request).await;
		let notification = self.notify(&provisioned).await;

		ProvisioningOutcome::Completed(ProvisioningReport {
			user_id: provisioned.user.id,
			username: provisioned.user.username.clone(),
			email: provisioned.user.email.clone(),
			created: provisioned.created,
			enrollment,
			notification,
		})
	}

	/// Enrollment step: only newly created accounts are enrolled.
	async fn enroll(
		&self,
		provisioned: &ProvisionedUser,
		request: &ProvisioningRequest,
	) -> EnrollmentStatus {
		if !provisioned.created {
			return EnrollmentStatus::SkippedExistingUser;
		}

		match self
			.provisioning
			.ensure_default_membership(&provisioned.user, request)
			.await
		{
			Ok(()) => EnrollmentStatus::Done,
			Err(ProvisioningError::OrganizationNotFound(name)) => {
				tracing::error!(org = %name, "default organization does not exist, skipping enrollment");
				EnrollmentStatus::OrgMissing(name)
			}
			Err(e) => {
				tracing::error!(error = %e, user_id = %provisioned.user.id, "enrollment failed");
				EnrollmentStatus::Failed(e.to_string())
			}
		}
	}

	/// Notification step: announce newly created accounts to administrators.
	async fn notify(&self, provisioned: &ProvisionedUser) -> NotificationStatus {
		if !provisioned.created {
			return NotificationStatus::Skipped(NotifySkipReason::ExistingUser);
		}

		let Some(email_service) = &self.email else {
			tracing::warn!("notification not sent: SMTP transport not configured");
			return NotificationStatus::Skipped(NotifySkipReason::Unconfigured);
		};
		if self.admin_emails.is_empty() {
			tracing::warn!("notification not sent: no admin recipients configured");
			return NotificationStatus::Skipped(NotifySkipReason::Unconfigured);
		}

		let request = EmailRequest::NewUserNotification {
			username: provisioned.user.username.clone(),
			fullname: provisioned.user.fullname.clone(),
			email: provisioned.user.email.clone(),
			org_name: self.provisioning.default_org().to_string(),
			role: self.provisioning.default_role().to_string(),
		};

		match email_service.send_to_all(&self.admin_emails, &request).await {
			Ok(()) => NotificationStatus::Sent {
				recipients: self.admin_emails.len(),
			},
			Err(e) => {
				tracing::error!(error = %e, "notification delivery failed");
				NotificationStatus::Failed(e.to_string())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use std::collections::HashMap;
	use stile_auth::{OrgId, Organization};
	use stile_config::ProvisioningConfig;
	use stile_db::testing::{create_all_tables, create_test_pool};

	async fn make_handler(
		config: ProvisioningConfig,
	) -> (SsoProvisioningHandler, Arc<OrgRepository>, sqlx::SqlitePool) {
		let pool = create_test_pool().await;
		create_all_tables(&pool).await;
		let user_repo = Arc::new(UserRepository::new(pool.clone()));
		let org_repo = Arc::new(OrgRepository::new(pool.clone()));
		let admin_emails = config.admin_emails.clone();
		let provisioning = ProvisioningService::new(user_repo, org_repo.clone(), config);
		(
			SsoProvisioningHandler::new(provisioning, None, admin_emails),
			org_repo,
			pool,
		)
	}

	async fn seed_org(org_repo: &OrgRepository, name: &str) {
		let org = Organization {
			id: OrgId::generate(),
			name: name.to_string(),
			title: name.to_string(),
			created_at: Utc::now(),
		};
		org_repo.create_org(&org).await.unwrap();
	}

	fn sso_identity() -> RequestIdentity {
		RequestIdentity {
			remote_user: Some("bob".to_string()),
			session_user: None,
		}
	}

	fn bob_attributes() -> AssertionAttributes {
		let mut map = HashMap::new();
		map.insert("emailAddress".to_string(), vec!["bob@x.org".to_string()]);
		map.insert("givenName".to_string(), vec!["Bob".to_string()]);
		map.insert("surname".to_string(), vec!["Jones".to_string()]);
		AssertionAttributes::new(map)
	}

	#[tokio::test]
	async fn provisions_new_user_end_to_end() {
		let (handler, org_repo, _pool) = make_handler(ProvisioningConfig::default()).await;
		seed_org(&org_repo, "scion").await;

		let outcome = handler.identify(&sso_identity(), &bob_attributes()).await;

		let ProvisioningOutcome::Completed(report) = outcome else {
			panic!("expected completed outcome");
		};
		assert!(report.created);
		assert_eq!(report.username, "bob");
		assert_eq!(report.email, "bob@x.org");
		assert_eq!(report.enrollment, EnrollmentStatus::Done);
		assert_eq!(
			report.notification,
			NotificationStatus::Skipped(NotifySkipReason::Unconfigured)
		);
	}

	#[tokio::test]
	async fn skips_without_remote_user() {
		let (handler, _, _pool) = make_handler(ProvisioningConfig::default()).await;

		let identity = RequestIdentity::default();
		let outcome = handler.identify(&identity, &bob_attributes()).await;
		assert!(matches!(
			outcome,
			ProvisioningOutcome::Skipped(SkipReason::NoRemoteUser)
		));
	}

	#[tokio::test]
	async fn skips_when_session_user_attached() {
		let (handler, _, _pool) = make_handler(ProvisioningConfig::default()).await;

		let identity = RequestIdentity {
			remote_user: Some("bob".to_string()),
			session_user: Some("bob".to_string()),
		};
		let outcome = handler.identify(&identity, &bob_attributes()).await;
		assert!(matches!(
			outcome,
			ProvisioningOutcome::Skipped(SkipReason::SessionPresent)
		));
	}

	#[tokio::test]
	async fn aborts_without_email_claim() {
		let (handler, _, _pool) = make_handler(ProvisioningConfig::default()).await;

		let mut map = HashMap::new();
		map.insert("givenName".to_string(), vec!["Bob".to_string()]);
		let attributes = AssertionAttributes::new(map);

		let outcome = handler.identify(&sso_identity(), &attributes).await;
		assert!(matches!(
			outcome,
			ProvisioningOutcome::Aborted(AbortReason::MissingEmail)
		));
	}

	#[tokio::test]
	async fn existing_user_skips_enrollment_and_notification() {
		let (handler, org_repo, _pool) = make_handler(ProvisioningConfig::default()).await;
		seed_org(&org_repo, "scion").await;

		let first = handler.identify(&sso_identity(), &bob_attributes()).await;
		let second = handler.identify(&sso_identity(), &bob_attributes()).await;

		let ProvisioningOutcome::Completed(first) = first else {
			panic!("expected completed outcome");
		};
		let ProvisioningOutcome::Completed(second) = second else {
			panic!("expected completed outcome");
		};
		assert!(first.created);
		assert!(!second.created);
		assert_eq!(first.user_id, second.user_id);
		assert_eq!(second.enrollment, EnrollmentStatus::SkippedExistingUser);
		assert_eq!(
			second.notification,
			NotificationStatus::Skipped(NotifySkipReason::ExistingUser)
		);
	}

	#[tokio::test]
	async fn missing_org_is_reported_but_user_survives() {
		let (handler, _, _pool) = make_handler(ProvisioningConfig::default()).await;

		let outcome = handler.identify(&sso_identity(), &bob_attributes()).await;

		let ProvisioningOutcome::Completed(report) = outcome else {
			panic!("expected completed outcome");
		};
		assert!(report.created);
		assert_eq!(
			report.enrollment,
			EnrollmentStatus::OrgMissing("scion".to_string())
		);

		// The account still exists and a second login resolves it.
		let again = handler.identify(&sso_identity(), &bob_attributes()).await;
		let ProvisioningOutcome::Completed(again) = again else {
			panic!("expected completed outcome");
		};
		assert!(!again.created);
	}

	#[tokio::test]
	async fn fullname_falls_back_to_email_without_name_claims() {
		let (handler, org_repo, pool) = make_handler(ProvisioningConfig::default()).await;
		seed_org(&org_repo, "scion").await;

		let mut map = HashMap::new();
		map.insert("emailAddress".to_string(), vec!["carol@x.org".to_string()]);
		let attributes = AssertionAttributes::new(map);

		let outcome = handler.identify(&sso_identity(), &attributes).await;
		let ProvisioningOutcome::Completed(report) = outcome else {
			panic!("expected completed outcome");
		};
		assert_eq!(report.username, "carol");

		let stored = UserRepository::new(pool)
			.get_user_by_email("carol@x.org")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(stored.fullname, "carol@x.org");
	}

	#[tokio::test]
	async fn wires_handler_from_config_and_pool() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = StileConfig::default();
		config.database.url = format!("sqlite:{}/stile.db", dir.path().display());

		let pool = stile_db::create_pool(&config.database.url).await.unwrap();
		create_all_tables(&pool).await;
		let handler = SsoProvisioningHandler::from_config(&config, pool).unwrap();

		let outcome = handler.identify(&sso_identity(), &bob_attributes()).await;
		let ProvisioningOutcome::Completed(report) = outcome else {
			panic!("expected completed outcome");
		};
		assert!(report.created);
		assert_eq!(report.username, "bob");
	}
}
