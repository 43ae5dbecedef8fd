use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Contact form payload as posted by the landing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    /// Full name of the person asking
    pub full_name: Option<String>,
    /// Company name
    pub company: Option<String>,
    /// Reply address
    pub email: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Free-form request text
    pub request: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    /// Whether the message was relayed
    pub ok: bool,
    /// Human readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContactResponse {
    pub const fn sent() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}
