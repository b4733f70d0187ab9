// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP email client for stile.
//!
//! This crate provides a simple async SMTP client for sending plain-text
//! notification emails. It integrates with [`stile_common_secret`] to ensure
//! passwords are never logged.
//!
//! # Features
//!
//! - Async email sending using [`lettre`]
//! - Optional STARTTLS (plain connections are the default, matching the
//!   typical internal relay on port 25)
//! - Optional authentication
//! - Secure password handling via [`SecretString`]
//!
//! # Example
//!
//! ```no_run
//! use stile_smtp::{SmtpClient, SmtpConfig};
//!
//! # async fn example() -> Result<(), stile_smtp::SmtpError> {
//! let config = SmtpConfig {
//!     host: "mail.example.com".to_string(),
//!     port: 25,
//!     username: None,
//!     password: None,
//!     from_address: "noreply@example.com".to_string(),
//!     from_name: "Stile".to_string(),
//!     starttls: false,
//! };
//!
//! let client = SmtpClient::new(config)?;
//! client.send_email("admin@example.com", "Hello", "Hello World").await?;
//! # Ok(())
//! # }
//! ```

use lettre::{
	message::{header::ContentType, Mailbox},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use std::env;
use stile_common_secret::SecretString;

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to connect to the SMTP server.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Authentication with the SMTP server failed.
	#[error("authentication failed: {0}")]
	Auth(String),

	/// Failed to send an email message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid configuration (missing required fields, invalid values).
	#[error("invalid configuration: {0}")]
	Config(String),

	/// Invalid email address format.
	#[error("invalid email address: {0}")]
	Address(String),
}

/// Configuration for the SMTP client.
///
/// Can be loaded from environment variables using [`SmtpConfig::from_env`] or
/// constructed directly (the config crate builds it from its layered sources).
///
/// # Security
///
/// The `password` field uses [`SecretString`] to ensure passwords are:
/// - Never logged (Debug/Display are redacted)
/// - Zeroized from memory on drop
/// - Never serialized to plain text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
	/// SMTP server hostname (e.g., "mail.example.com").
	pub host: String,

	/// SMTP server port. Common values: 25 (unencrypted), 587 (STARTTLS).
	#[serde(default = "default_port")]
	pub port: u16,

	/// Optional username for SMTP authentication.
	pub username: Option<String>,

	/// Optional password for SMTP authentication.
	/// Wrapped in [`SecretString`] to prevent accidental logging.
	pub password: Option<SecretString>,

	/// Email address to send from (e.g., "noreply@example.com").
	pub from_address: String,

	/// Display name for the sender.
	#[serde(default = "default_from_name")]
	pub from_name: String,

	/// Whether to use STARTTLS for the connection. Defaults to `false`.
	#[serde(default)]
	pub starttls: bool,
}

fn default_port() -> u16 {
	25
}

fn default_from_name() -> String {
	"Stile".to_string()
}

impl SmtpConfig {
	/// Load SMTP configuration from environment variables.
	///
	/// # Environment Variables
	///
	/// - `STILE_SMTP_HOST` (required): SMTP server hostname
	/// - `STILE_SMTP_PORT` (optional, default: 25): SMTP server port
	/// - `STILE_SMTP_USERNAME` (optional): Authentication username
	/// - `STILE_SMTP_PASSWORD` (optional): Authentication password
	/// - `STILE_SMTP_FROM_ADDRESS` (required): Sender email address
	/// - `STILE_SMTP_FROM_NAME` (optional, default: "Stile"): Sender display name
	/// - `STILE_SMTP_STARTTLS` (optional, default: false): Enable STARTTLS
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Config`] if required variables are missing or invalid.
	pub fn from_env() -> Result<Self, SmtpError> {
		let host = env::var("STILE_SMTP_HOST")
			.map_err(|_| SmtpError::Config("STILE_SMTP_HOST is required".into()))?;

		let port = env::var("STILE_SMTP_PORT")
			.unwrap_or_else(|_| "25".into())
			.parse()
			.map_err(|_| SmtpError::Config("STILE_SMTP_PORT must be a valid port number".into()))?;

		let username = env::var("STILE_SMTP_USERNAME").ok();
		let password = env::var("STILE_SMTP_PASSWORD").ok().map(SecretString::new);

		let from_address = env::var("STILE_SMTP_FROM_ADDRESS")
			.map_err(|_| SmtpError::Config("STILE_SMTP_FROM_ADDRESS is required".into()))?;

		let from_name = env::var("STILE_SMTP_FROM_NAME").unwrap_or_else(|_| "Stile".into());

		let starttls = env::var("STILE_SMTP_STARTTLS")
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
			.unwrap_or(false);

		Ok(Self {
			host,
			port,
			username,
			password,
			from_address,
			from_name,
			starttls,
		})
	}
}

/// Async SMTP client for sending emails.
///
/// The client is created with a configuration and can then be used to send
/// multiple emails. It maintains a connection pool internally via [`lettre`].
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from_mailbox: Mailbox,
}

impl SmtpClient {
	/// Create a new SMTP client from the given configuration.
	///
	/// This validates the configuration and builds the SMTP transport.
	/// The actual connection is made lazily when sending emails.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the from address is invalid.
	/// Returns [`SmtpError::Connection`] if the transport cannot be built.
	#[tracing::instrument(
        name = "smtp_client_new",
        skip(config),
        fields(host = %config.host, port = %config.port, starttls = %config.starttls)
    )]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
			.parse()
			.map_err(|e| SmtpError::Address(format!("{e}")))?;

		let builder = if config.starttls {
			AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?
		} else {
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
		};

		let mut builder = builder.port(config.port);

		if let (Some(username), Some(password)) = (config.username, config.password) {
			let credentials = Credentials::new(username, password.into_inner());
			builder = builder.credentials(credentials);
		}

		let transport = builder.build();

		tracing::debug!("SMTP client initialized");

		Ok(Self {
			transport,
			from_mailbox,
		})
	}

	/// Check if the SMTP server is reachable and responding.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Connection`] if the server is unreachable.
	#[tracing::instrument(name = "smtp_check_health", skip(self))]
	pub async fn check_health(&self) -> Result<(), SmtpError> {
		tracing::debug!("checking SMTP server health");
		self
			.transport
			.test_connection()
			.await
			.map_err(|e| SmtpError::Connection(format!("{e}")))?;
		tracing::debug!("SMTP server is healthy");
		Ok(())
	}

	/// Send a plain-text email to a recipient.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the recipient address is invalid.
	/// Returns [`SmtpError::Send`] if the email fails to send.
	#[tracing::instrument(
        name = "smtp_send_email",
        skip(self, body_text),
        fields(to = %to, subject = %subject)
    )]
	pub async fn send_email(&self, to: &str, subject: &str, body_text: &str) -> Result<(), SmtpError> {
		let to_mailbox: Mailbox = to.parse().map_err(|e| SmtpError::Address(format!("{e}")))?;

		let message = Message::builder()
			.from(self.from_mailbox.clone())
			.to(to_mailbox)
			.subject(subject)
			.header(ContentType::TEXT_PLAIN)
			.body(body_text.to_string())
			.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))?;

		tracing::debug!("sending email");

		self
			.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent successfully");

		Ok(())
	}
}

/// Validate an email address format.
///
/// Uses [`lettre`]'s [`Mailbox`] parser to check if an email address is valid.
/// This validates the format, not whether the address actually exists.
///
/// # Example
///
/// ```
/// use stile_smtp::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("User Name <user@example.com>"));
/// assert!(!is_valid_email("not-an-email"));
/// assert!(!is_valid_email(""));
/// ```
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Mailbox>().is_ok()
}
