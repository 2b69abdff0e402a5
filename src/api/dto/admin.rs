use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostRequest {
    pub post_id: i64,
    /// Absent counts as a wrong password, not a malformed request.
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePostResponse {
    pub success: bool,
}
