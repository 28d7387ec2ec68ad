use serde::{Deserialize, Serialize};

/// Raw contact form payload as posted by the website. Missing text fields
/// default to empty so validation can report them alongside other problems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub classification: LeadClassification,
}

/// Optional project details used for triage. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadClassification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LeadClassification {
    pub fn project_type(&self) -> Option<&str> {
        present(&self.project_type)
    }

    pub fn timeline(&self) -> Option<&str> {
        present(&self.timeline)
    }

    pub fn budget(&self) -> Option<&str> {
        present(&self.budget)
    }

    pub fn property_type(&self) -> Option<&str> {
        present(&self.property_type)
    }

    pub fn urgency(&self) -> Option<&str> {
        present(&self.urgency)
    }

    pub fn address(&self) -> Option<&str> {
        present(&self.address)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

/// Submission that satisfied every field rule. Only `validation::validate`
/// constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    inner: ContactSubmission,
}

impl ValidatedSubmission {
    pub(crate) fn new(inner: ContactSubmission) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn email(&self) -> &str {
        &self.inner.email
    }

    pub fn phone(&self) -> &str {
        &self.inner.phone
    }

    pub fn subject(&self) -> &str {
        &self.inner.subject
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn classification(&self) -> &LeadClassification {
        &self.inner.classification
    }
}

/// One failing field, reported back to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
