use std::sync::OnceLock;

use regex::Regex;

use super::domain::{ContactSubmission, FieldError, ValidatedSubmission};

pub const NAME_MAX_CHARS: usize = 100;
pub const PHONE_MIN_CHARS: usize = 10;
pub const PHONE_MAX_CHARS: usize = 20;
pub const SUBJECT_MAX_CHARS: usize = 200;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// Raised when one or more fields break the submission rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("submission rejected: {} invalid field(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

pub fn is_valid_email(candidate: &str) -> bool {
    email_pattern().is_match(candidate)
}

/// Checks every field and reports all failures at once.
pub fn validate(submission: ContactSubmission) -> Result<ValidatedSubmission, ValidationError> {
    let mut errors = Vec::new();

    let name_len = submission.name.chars().count();
    if submission.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name_len > NAME_MAX_CHARS {
        errors.push(FieldError::new("name", "Name is too long"));
    }

    if !is_valid_email(&submission.email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }

    let phone_len = submission.phone.chars().count();
    if phone_len < PHONE_MIN_CHARS {
        errors.push(FieldError::new("phone", "Phone number is required"));
    } else if phone_len > PHONE_MAX_CHARS {
        errors.push(FieldError::new("phone", "Phone number is too long"));
    }

    if submission.subject.trim().is_empty() {
        errors.push(FieldError::new("subject", "Subject is required"));
    } else if submission.subject.chars().count() > SUBJECT_MAX_CHARS {
        errors.push(FieldError::new("subject", "Subject is too long"));
    }

    let message_len = submission.message.chars().count();
    if message_len < MESSAGE_MIN_CHARS {
        errors.push(FieldError::new(
            "message",
            format!("Message must be at least {MESSAGE_MIN_CHARS} characters"),
        ));
    } else if message_len > MESSAGE_MAX_CHARS {
        errors.push(FieldError::new("message", "Message is too long"));
    }

    if errors.is_empty() {
        Ok(ValidatedSubmission::new(submission))
    } else {
        Err(ValidationError { errors })
    }
}
