use std::sync::Arc;

use crate::{
    config::{EnvLookup, SmtpConfig},
    dto::ContactRequest,
    error::ContactError,
    mailer::Mailer,
    message::{ContactSubmission, ValidationPolicy},
};

pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    env: EnvLookup,
    policy: ValidationPolicy,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, env: EnvLookup, policy: ValidationPolicy) -> Self {
        ContactService {
            mailer,
            env,
            policy,
        }
    }

    /// Validates the submission, resolves relay settings and makes a single
    /// delivery attempt. Nothing is retried or remembered between calls.
    pub async fn submit(&self, request: ContactRequest) -> Result<(), ContactError> {
        let submission = ContactSubmission::from_request(request, self.policy)?;

        let smtp = SmtpConfig::resolve(|key| (self.env)(key))?;
        tracing::debug!("Resolved SMTP settings: {:?}", smtp);

        let email = submission.compose(&smtp);

        self.mailer
            .send(&smtp, email)
            .await
            .map_err(|e| ContactError::delivery(e.to_string()))
    }
}
