use serde::{Deserialize, Serialize};

/// Profile returned by the external identity provider on sign-in. Opaque
/// session context; the engine attaches it for traceability and nothing
/// else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub onboarded: bool,
}
