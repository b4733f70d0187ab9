// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Email service for stile.
//!
//! This crate provides a unified [`EmailService`] that renders notification
//! messages and dispatches them through [`stile_smtp::SmtpClient`].

use std::sync::Arc;
use stile_smtp::SmtpClient;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
	#[error("SMTP error: {0}")]
	Smtp(#[from] stile_smtp::SmtpError),
}

pub type Result<T> = std::result::Result<T, EmailError>;

/// Email request variants for different email types.
#[derive(Debug, Clone)]
pub enum EmailRequest {
	/// Notification sent to administrators when an account is auto-created
	/// during single sign-on.
	NewUserNotification {
		/// Username assigned to the new account.
		username: String,
		/// Full name recorded on the account.
		fullname: String,
		/// Email address of the new account.
		email: String,
		/// Organization the account was enrolled in.
		org_name: String,
		/// Role granted on enrollment.
		role: String,
	},
}

/// Email service that renders requests and sends them over SMTP.
pub struct EmailService {
	smtp_client: Arc<SmtpClient>,
}

impl EmailService {
	/// Create a new EmailService.
	pub fn new(smtp_client: Arc<SmtpClient>) -> Self {
		Self { smtp_client }
	}

	/// Send an email to the specified recipient.
	#[tracing::instrument(
		name = "email_service_send",
		skip(self, request),
		fields(to = %to, request_type = ?std::mem::discriminant(&request))
	)]
	pub async fn send(&self, to: &str, request: EmailRequest) -> Result<()> {
		let (subject, body) = render_email(&request);

		self.smtp_client.send_email(to, &subject, &body).await?;

		tracing::info!("Email sent successfully");
		Ok(())
	}

	/// Send an email to every recipient in turn.
	///
	/// Stops at the first delivery failure so a misconfigured transport
	/// surfaces once instead of once per recipient.
	#[tracing::instrument(
		name = "email_service_send_all",
		skip(self, request),
		fields(recipients = recipients.len())
	)]
	pub async fn send_to_all(&self, recipients: &[String], request: &EmailRequest) -> Result<()> {
		for recipient in recipients {
			self.send(recipient, request.clone()).await?;
		}
		Ok(())
	}
}

/// Render a request into `(subject, plain-text body)`.
pub fn render_email(request: &EmailRequest) -> (String, String) {
	match request {
		EmailRequest::NewUserNotification {
			username,
			fullname,
			email,
			org_name,
			role,
		} => {
			let subject = "New CKAN User Created via SSO".to_string();
			let body = format!(
				"A new user has been automatically created in CKAN via SSO:\n\
				\n\
				Username: {username}\n\
				Full Name: {fullname}\n\
				Email: {email}\n\
				Organization: {org_name}\n\
				Role: {role}\n\
				\n\
				This user was created automatically by the SSO new user handler.\n"
			);
			(subject, body)
		}
	}
}
