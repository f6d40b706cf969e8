//! # Alert Mail
//!
//! Renders hazard alerts into HTML mail and hands them to a transport.
//! Delivery is somebody else's job: the bundled [`OutboxTransport`] only
//! queues `.eml` files for a relay to pick up.

use std::fs;
use std::path::PathBuf;

use base64::Engine;
use chrono::{DateTime, Datelike, Utc};
use log::info;
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::{LabError, Result};
use crate::model::Alert;

const ALERT_TEMPLATE: &str = include_str!("../../templates/alert_email.html.mustache");

/// A rendered alert mail, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMail {
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub html: String,
    pub sent_at: DateTime<Utc>,
}

impl AlertMail {
    /// The mail as RFC 822 text with an HTML body.
    ///
    /// Header values are folded onto one line, and a non-ASCII subject is
    /// sent as RFC 2047 encoded words.
    pub fn to_rfc822(&self) -> String {
        let recipients: Vec<String> = self.recipients.iter().map(|r| single_line(r)).collect();
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{}",
            single_line(&self.sender),
            recipients.join(", "),
            encode_header(&self.subject),
            self.sent_at.to_rfc2822(),
            self.html
        )
    }
}

/// Collapse a header value onto one line. A CR or LF inside a value would
/// start a new header.
pub fn single_line(value: &str) -> String {
    value
        .split(|c: char| c == '\r' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Longest UTF-8 run per encoded word; 45 bytes encode to 60 characters,
/// which keeps each word under the 75 character limit.
const ENCODED_WORD_BYTES: usize = 45;

/// Encode a header value as RFC 2047 `B` words when it is not plain ASCII.
pub fn encode_header(value: &str) -> String {
    let value = single_line(value);
    if value.is_ascii() {
        return value;
    }
    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in value.chars() {
        if chunk.len() + ch.len_utf8() > ENCODED_WORD_BYTES {
            words.push(std::mem::take(&mut chunk));
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(chunk);
    }
    words
        .iter()
        .map(|w| format!("=?UTF-8?B?{}?=", base64::engine::general_purpose::STANDARD.encode(w)))
        .collect::<Vec<_>>()
        .join("\r\n ")
}

#[derive(Serialize)]
struct AlertTemplateContext<'a> {
    lab_name: &'a str,
    time: String,
    message: String,
    year: i32,
}

/// Render the HTML body for one alert.
pub fn render_alert_html(lab_name: &str, alert: &Alert, timestamp: DateTime<Utc>) -> Result<String> {
    let template = mustache::compile_str(ALERT_TEMPLATE)?;
    let context = AlertTemplateContext {
        lab_name,
        time: timestamp.format("%d %b %Y, %H:%M UTC").to_string(),
        message: alert.message(),
        year: timestamp.year(),
    };
    Ok(template.render_to_string(&context)?)
}

/// Hands a rendered mail to whatever delivers it.
pub trait MailTransport {
    fn send(&self, mail: &AlertMail) -> Result<()>;
}

/// Queues each mail as an `.eml` file in a directory.
pub struct OutboxTransport {
    dir: PathBuf,
}

impl OutboxTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn next_path(&self, mail: &AlertMail) -> PathBuf {
        let stamp = mail.sent_at.format("%Y%m%dT%H%M%S");
        let mut n = 0;
        loop {
            let candidate = self.dir.join(format!("alert-{}-{}.eml", stamp, n));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

impl MailTransport for OutboxTransport {
    fn send(&self, mail: &AlertMail) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| LabError::Mail(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.next_path(mail);
        fs::write(&path, mail.to_rfc822()).map_err(|e| LabError::Mail(format!("{}: {}", path.display(), e)))?;
        info!("queued alert mail {}", path.display());
        Ok(())
    }
}

/// Builds alert mails from configuration and sends them.
pub struct AlertMailer<T: MailTransport> {
    sender: String,
    recipients: Vec<String>,
    transport: T,
}

impl<T: MailTransport> AlertMailer<T> {
    pub fn new(config: &MailConfig, transport: T) -> Self {
        Self {
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
            transport,
        }
    }

    pub fn compose(&self, lab_name: &str, alert: &Alert, timestamp: DateTime<Utc>) -> Result<AlertMail> {
        if self.recipients.is_empty() {
            return Err(LabError::NoRecipients);
        }
        Ok(AlertMail {
            sender: self.sender.clone(),
            recipients: self.recipients.clone(),
            subject: single_line(&format!("Hazard Alert {}", lab_name)),
            html: render_alert_html(lab_name, alert, timestamp)?,
            sent_at: timestamp,
        })
    }

    pub fn send_alert(&self, lab_name: &str, alert: &Alert, timestamp: DateTime<Utc>) -> Result<AlertMail> {
        let mail = self.compose(lab_name, alert, timestamp)?;
        self.transport.send(&mail)?;
        Ok(mail)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
