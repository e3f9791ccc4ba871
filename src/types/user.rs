use serde::{Deserialize, Serialize};

/// The authenticated identity a session runs under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
}
