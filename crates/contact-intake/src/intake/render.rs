use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;

use super::domain::{LeadClassification, ValidatedSubmission};
use super::scoring::{LeadPriority, LeadScore};

const SOURCE_LABEL: &str = "Website Contact Form";

/// Fully rendered notification, ready for any provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMessage {
    pub to: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub digest: LeadDigest,
}

/// Machine-readable copy of the lead, embedded in the text body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDigest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    #[serde(flatten)]
    pub classification: LeadClassification,
    pub lead_score: u16,
    pub priority: LeadPriority,
    pub received_at: String,
    pub source: &'static str,
}

/// Builds notification messages addressed to the configured inbox. Timestamps
/// are printed in one fixed offset so every notification reads the same way.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    recipient: String,
    sender: String,
    timezone: FixedOffset,
}

impl MessageRenderer {
    pub fn new(recipient: impl Into<String>, sender: impl Into<String>, timezone: FixedOffset) -> Self {
        Self {
            recipient: recipient.into(),
            sender: sender.into(),
            timezone,
        }
    }

    /// Human-readable instant in the renderer's timezone.
    pub fn local_timestamp(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.timezone)
            .format("%B %-d, %Y %-I:%M %p (UTC%:z)")
            .to_string()
    }

    pub fn local_time_of_day(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.timezone)
            .format("%-I:%M:%S %p (UTC%:z)")
            .to_string()
    }

    pub fn render(
        &self,
        submission: &ValidatedSubmission,
        score: &LeadScore,
        received_at: DateTime<Utc>,
    ) -> NotificationMessage {
        let timestamp = self.local_timestamp(received_at);
        let digest = LeadDigest {
            name: submission.name().to_string(),
            email: submission.email().to_string(),
            phone: submission.phone().to_string(),
            subject: submission.subject().to_string(),
            message: submission.message().to_string(),
            classification: submission.classification().clone(),
            lead_score: score.total,
            priority: score.priority,
            received_at: received_at
                .with_timezone(&self.timezone)
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            source: SOURCE_LABEL,
        };

        NotificationMessage {
            to: self.recipient.clone(),
            from: self.sender.clone(),
            reply_to: Some(submission.email().to_string()),
            subject: format!("Contact Form: {}", submission.subject()),
            html: render_html(submission, score, &timestamp),
            text: render_text(submission, score, &timestamp, &digest),
            digest,
        }
    }
}

fn detail_rows(lead: &LeadClassification) -> Vec<(&'static str, &str)> {
    [
        ("Project Type", lead.project_type()),
        ("Timeline", lead.timeline()),
        ("Budget Range", lead.budget()),
        ("Property Type", lead.property_type()),
        ("Address", lead.address()),
        ("Urgency", lead.urgency()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|value| (label, value)))
    .collect()
}

fn render_html(submission: &ValidatedSubmission, score: &LeadScore, timestamp: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">");
    html.push_str("<title>New Contact Form Submission</title></head><body>");
    html.push_str("<h1>New Contact Form Submission</h1>");

    html.push_str("<h2>Contact Information</h2><ul>");
    writeln!(html, "<li><strong>Name:</strong> {}</li>", escape_html(submission.name()))
        .expect("name row");
    writeln!(
        html,
        "<li><strong>Email:</strong> <a href=\"mailto:{0}\">{0}</a></li>",
        escape_html(submission.email())
    )
    .expect("email row");
    let dialable: String = submission
        .phone()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    writeln!(
        html,
        "<li><strong>Phone:</strong> <a href=\"tel:{}\">{}</a></li>",
        dialable,
        escape_html(submission.phone())
    )
    .expect("phone row");
    writeln!(
        html,
        "<li><strong>Subject:</strong> {}</li>",
        escape_html(submission.subject())
    )
    .expect("subject row");
    html.push_str("</ul>");

    let rows = detail_rows(submission.classification());
    if !rows.is_empty() {
        html.push_str("<h2>Project Details</h2><ul>");
        for (label, value) in rows {
            writeln!(html, "<li><strong>{label}:</strong> {}</li>", escape_html(value))
                .expect("detail row");
        }
        html.push_str("</ul>");
    }

    writeln!(
        html,
        "<p><strong>Lead score:</strong> {} / 500 ({})</p>",
        score.total,
        score.priority.label()
    )
    .expect("score row");

    html.push_str("<h2>Message</h2>");
    writeln!(
        html,
        "<p style=\"white-space: pre-wrap;\">{}</p>",
        escape_html(submission.message())
    )
    .expect("message body");

    writeln!(
        html,
        "<p>Received: {}<br>Source: {SOURCE_LABEL}</p>",
        escape_html(timestamp)
    )
    .expect("footer");
    html.push_str("</body></html>");
    html
}

fn render_text(
    submission: &ValidatedSubmission,
    score: &LeadScore,
    timestamp: &str,
    digest: &LeadDigest,
) -> String {
    let mut text = String::new();
    text.push_str("NEW CONTACT FORM SUBMISSION\n\n");
    text.push_str("CONTACT INFORMATION\n");
    writeln!(text, "Name: {}", submission.name()).expect("name line");
    writeln!(text, "Email: {}", submission.email()).expect("email line");
    writeln!(text, "Phone: {}", submission.phone()).expect("phone line");
    writeln!(text, "Subject: {}", submission.subject()).expect("subject line");

    let rows = detail_rows(submission.classification());
    if !rows.is_empty() {
        text.push_str("\nPROJECT DETAILS\n");
        for (label, value) in rows {
            writeln!(text, "{label}: {value}").expect("detail line");
        }
    }

    writeln!(
        text,
        "\nLEAD SCORE: {} / 500 ({})",
        score.total,
        score.priority.label()
    )
    .expect("score line");

    text.push_str("\nMESSAGE\n");
    writeln!(text, "{}", submission.message()).expect("message line");

    text.push_str("\n---\n");
    writeln!(text, "Received: {timestamp}").expect("timestamp line");
    writeln!(text, "Source: {SOURCE_LABEL}").expect("source line");

    let json = serde_json::to_string(digest).unwrap_or_default();
    text.push_str("\nLEAD DATA (JSON)\n");
    text.push_str(&json);
    text
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
