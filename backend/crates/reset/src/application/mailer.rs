//! Mail Delivery
//!
//! Delivery abstraction plus hot-reloadable SMTP settings. The actual
//! transport is behind the [`MailSender`] trait so the flow does not care
//! whether mail goes out over SMTP, an HTTP API, or a log line.
//!
//! SMTP settings can be replaced at runtime (demo mode only, see the
//! presentation layer). The built sender is cached and keyed on the
//! settings it was built from; replacing the settings invalidates the
//! cache and the next send builds a fresh transport lazily.

use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

/// A single outgoing message.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("SMTP settings incomplete: {0}")]
    Misconfigured(String),
}

/// Mail delivery abstraction.
pub trait MailSender: Send + Sync {
    /// Deliver a message or return an error to mark delivery as failed.
    fn send(&self, message: &MailMessage) -> Result<(), MailError>;

    /// Probe the transport without sending anything.
    fn verify(&self) -> Result<(), MailError> {
        Ok(())
    }
}

/// Local dev sender that logs the envelope instead of sending real email.
///
/// Logs recipient and subject only; the body carries the reset link and
/// must stay out of the logs.
#[derive(Clone, Debug, Default)]
pub struct LogMailSender;

impl MailSender for LogMailSender {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "mail send stub"
        );
        Ok(())
    }
}

/// Runtime SMTP transport settings.
#[derive(Debug, Clone, Default)]
pub struct SmtpSettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub from_address: String,
}

impl SmtpSettings {
    /// Read settings from SMTP_* environment variables.
    pub fn from_env() -> Self {
        let truthy = |name: &str| {
            std::env::var(name).is_ok_and(|v| v.eq_ignore_ascii_case("true"))
        };
        Self {
            enabled: truthy("SMTP_ENABLED"),
            host: std::env::var("SMTP_HOST").unwrap_or_default(),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            secure: truthy("SMTP_SECURE"),
            user: std::env::var("SMTP_USER").ok().filter(|s| !s.is_empty()),
            pass: std::env::var("SMTP_PASS").ok().filter(|s| !s.is_empty()),
            from_address: std::env::var("FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@localhost".to_string()),
        }
    }

    /// Settings are usable when enabled and pointing at a host.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.host.is_empty()
    }

    /// Cache key for the built transport. Two settings values with equal
    /// keys build equivalent transports.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.host,
            self.port,
            self.secure,
            self.user.as_deref().unwrap_or(""),
            self.pass.as_deref().unwrap_or(""),
        )
    }
}

type SenderFactory = Box<dyn Fn(&SmtpSettings) -> Arc<dyn MailSender> + Send + Sync>;

/// Delivery facade with hot-reloadable settings and a cached transport.
pub struct Mailer {
    settings: RwLock<SmtpSettings>,
    cached: Mutex<Option<(String, Arc<dyn MailSender>)>>,
    factory: SenderFactory,
}

impl Mailer {
    pub fn new(settings: SmtpSettings, factory: SenderFactory) -> Self {
        Self {
            settings: RwLock::new(settings),
            cached: Mutex::new(None),
            factory,
        }
    }

    /// Mailer whose transport only logs. Used in development and tests.
    pub fn log_only(settings: SmtpSettings) -> Self {
        Self::new(settings, Box::new(|_| Arc::new(LogMailSender)))
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> SmtpSettings {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the settings and drop the cached transport.
    pub fn replace(&self, settings: SmtpSettings) {
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = settings;
        *self.cached.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn sender(&self, settings: &SmtpSettings) -> Arc<dyn MailSender> {
        let key = settings.cache_key();
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((cached_key, sender)) = cached.as_ref() {
            if *cached_key == key {
                return Arc::clone(sender);
            }
        }
        let sender = (self.factory)(settings);
        *cached = Some((key, Arc::clone(&sender)));
        sender
    }

    /// Attempt delivery. Returns `Ok(false)` when SMTP is not configured,
    /// `Ok(true)` on successful handoff to the transport.
    pub fn send(&self, to: &str, subject: &str, body: &str) -> Result<bool, MailError> {
        let settings = self.settings();
        if !settings.is_configured() {
            return Ok(false);
        }
        let message = MailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };
        self.sender(&settings).send(&message)?;
        Ok(true)
    }

    /// Probe the currently configured transport.
    pub fn verify_transport(&self) -> Result<(), MailError> {
        let settings = self.settings();
        if !settings.is_configured() {
            return Err(MailError::Misconfigured("SMTP is not enabled".to_string()));
        }
        self.sender(&settings).verify()
    }
}
