//! Project records as the REST API returns them.

use serde::{Deserialize, Serialize};

use scratchbridge_core::ProjectPayload;

/// Stored project document. The saved payload sits under `sb3` unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sb3: Option<ProjectPayload>,
}

impl ProjectJson {
    pub fn new(payload: ProjectPayload) -> Self {
        Self { sb3: Some(payload) }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub project_json: ProjectJson,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_json: ProjectJson,
}

/// Body of `PUT /projects/{id}`; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_json: Option<ProjectJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}
