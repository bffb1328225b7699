use color_eyre::{Result, eyre};
use lettre::{
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
	message::header::ContentType,
	transport::smtp::authentication::Credentials,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use drip_domain::templates::RenderedEmail;

/// A sent message's provider-side identifier, threaded into follow-ups.
#[derive(Clone, Debug, PartialEq)]
pub struct SentEmail {
	pub message_id: String,
}

/// Outbound email transport, resolved once at construction. SMTP wins when both
/// transports are configured; with neither, sends fail with a configuration error
/// instead of silently dropping mail.
pub enum EmailSender {
	Smtp(SmtpSender),
	Api(ApiSender),
	Unconfigured,
}
impl EmailSender {
	pub fn from_config(cfg: &drip_config::Email, from_name: &str) -> Result<Self> {
		if let Some(smtp) = &cfg.smtp {
			return Ok(Self::Smtp(SmtpSender::new(smtp.clone(), from_name)?));
		}
		if let Some(api) = &cfg.api {
			return Ok(Self::Api(ApiSender::new(api.clone(), from_name)?));
		}

		Ok(Self::Unconfigured)
	}

	pub fn transport_name(&self) -> &'static str {
		match self {
			Self::Smtp(_) => "smtp",
			Self::Api(_) => "api",
			Self::Unconfigured => "unconfigured",
		}
	}

	pub async fn send(&self, to: &str, email: &RenderedEmail) -> Result<SentEmail> {
		match self {
			Self::Smtp(sender) => sender.send(to, email).await,
			Self::Api(sender) => sender.send(to, email).await,
			Self::Unconfigured => Err(eyre::eyre!(
				"No email transport is configured; set [providers.email.smtp] or \
				[providers.email.api]."
			)),
		}
	}
}

pub struct SmtpSender {
	from: String,
	transport: AsyncSmtpTransport<Tokio1Executor>,
}
impl SmtpSender {
	pub fn new(cfg: drip_config::Smtp, from_name: &str) -> Result<Self> {
		let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?
			.port(cfg.port)
			.credentials(Credentials::new(cfg.user.clone(), cfg.password.clone()))
			.build();

		Ok(Self { from: format_mailbox(from_name, &cfg.from), transport })
	}

	async fn send(&self, to: &str, email: &RenderedEmail) -> Result<SentEmail> {
		// SMTP servers assign their own ids on relay, so mint one here and stamp it on
		// the message for thread tracking.
		let message_id = format!("<{}@drip.local>", Uuid::new_v4());
		let message = Message::builder()
			.from(self.from.parse()?)
			.to(to.parse()?)
			.subject(&email.subject)
			.message_id(Some(message_id.clone()))
			.header(ContentType::TEXT_HTML)
			.body(email.html.clone())?;

		self.transport.send(message).await?;

		Ok(SentEmail { message_id })
	}
}

#[derive(Debug, Deserialize)]
struct ApiSendResponse {
	id: String,
}

pub struct ApiSender {
	cfg: drip_config::EmailApi,
	from: String,
	client: Client,
}
impl ApiSender {
	pub fn new(cfg: drip_config::EmailApi, from_name: &str) -> Result<Self> {
		let client = crate::http_client(cfg.timeout_ms)?;
		let from = format_mailbox(from_name, &cfg.from);

		Ok(Self { cfg, from, client })
	}

	async fn send(&self, to: &str, email: &RenderedEmail) -> Result<SentEmail> {
		let endpoint = format!("{}/emails", self.cfg.api_base.trim_end_matches('/'));
		let response: ApiSendResponse = self
			.client
			.post(endpoint)
			.bearer_auth(&self.cfg.api_key)
			.json(&json!({
				"from": self.from,
				"to": to,
				"subject": email.subject,
				"html": email.html,
			}))
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		Ok(SentEmail { message_id: response.id })
	}
}

/// "Name <addr>" From header. Addresses that already carry a display name are
/// used as-is.
fn format_mailbox(name: &str, address: &str) -> String {
	let name = name.trim();

	if name.is_empty() || address.contains('<') {
		return address.to_string();
	}

	format!("{name} <{address}>")
}
