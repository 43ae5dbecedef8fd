use serde::{Deserialize, Serialize};

use crate::{config::SmtpConfig, dto::ContactRequest};

pub const SENDER_NAME: &str = "Landing per PMI";
pub const SUBJECT_PREFIX: &str = "Nuova richiesta - ";
pub const UNNAMED_SUBJECT: &str = "Senza nome";
pub const PLACEHOLDER: &str = "-";

/// How a submission with missing fields is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Reject when `fullName`, `email` or `request` is missing; send text and HTML.
    #[default]
    Strict,
    /// Never reject; missing values are rendered as `-`, text body only.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fullName, email and request are required")]
pub struct MissingFields;

/// A submission after the validation policy has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub request: Option<String>,
    policy: ValidationPolicy,
}

/// Empty strings are treated the same as absent fields.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ContactSubmission {
    pub fn from_request(
        request: ContactRequest,
        policy: ValidationPolicy,
    ) -> Result<Self, MissingFields> {
        let submission = Self {
            full_name: present(request.full_name),
            company: present(request.company),
            email: present(request.email),
            phone: present(request.phone),
            request: present(request.request),
            policy,
        };

        if policy == ValidationPolicy::Strict
            && (submission.full_name.is_none()
                || submission.email.is_none()
                || submission.request.is_none())
        {
            return Err(MissingFields);
        }

        Ok(submission)
    }

    pub fn subject(&self) -> String {
        format!(
            "{SUBJECT_PREFIX}{}",
            self.full_name.as_deref().unwrap_or(UNNAMED_SUBJECT)
        )
    }

    pub fn text_body(&self) -> String {
        format!(
            "Nome: {}\nAzienda: {}\nEmail: {}\nTelefono: {}\n\nRichiesta:\n{}\n",
            or_placeholder(self.full_name.as_ref()),
            or_placeholder(self.company.as_ref()),
            or_placeholder(self.email.as_ref()),
            or_placeholder(self.phone.as_ref()),
            or_placeholder(self.request.as_ref()),
        )
    }

    /// HTML alternative, only produced under the strict policy.
    ///
    /// User input is entity-escaped before it is placed in the template. The
    /// landing page's first handler interpolated raw input here, so markup in a
    /// submission now shows up as text instead of being rendered.
    pub fn html_body(&self) -> Option<String> {
        if self.policy != ValidationPolicy::Strict {
            return None;
        }

        let field = |value: Option<&String>| escape_html(or_placeholder(value));
        let request = field(self.request.as_ref())
            .replace("\r\n", "\n")
            .replace('\n', "<br>");

        Some(format!(
            "<h2>Nuova richiesta dal sito</h2>\n\
             <p><strong>Nome:</strong> {}</p>\n\
             <p><strong>Azienda:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Telefono:</strong> {}</p>\n\
             <p><strong>Richiesta:</strong><br>{request}</p>\n",
            field(self.full_name.as_ref()),
            field(self.company.as_ref()),
            field(self.email.as_ref()),
            field(self.phone.as_ref()),
        ))
    }

    /// Builds the outgoing message addressed to the configured recipient.
    pub fn compose(&self, smtp: &SmtpConfig) -> OutgoingEmail {
        OutgoingEmail {
            from_name: SENDER_NAME.to_string(),
            from_address: smtp.user.clone(),
            to: smtp.recipient.clone(),
            reply_to: self.email.clone(),
            subject: self.subject(),
            text: self.text_body(),
            html: self.html_body(),
        }
    }
}

fn or_placeholder(value: Option<&String>) -> &str {
    value.map_or(PLACEHOLDER, String::as_str)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A fully composed email, independent of the transport that delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}
