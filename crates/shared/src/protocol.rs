//! Wire shapes of the location directory service and the submission endpoint.

use serde::{Deserialize, Serialize};

/// Every directory response wraps its rows in `{ "data": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionEntry {
    pub division: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictEntry {
    pub district: String,
}

// The directory spells the field "upazillas".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpazilaEntry {
    #[serde(default)]
    pub upazillas: Vec<String>,
}

/// Optional body of a successful submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub message: Option<String>,
}
