use serde::{Deserialize, Serialize};

/// One stored form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plate_thickness: String,
    #[serde(default)]
    pub comment: String,
    /// Server-local path of the stored upload, empty when there is none.
    #[serde(default)]
    pub file_path: String,
}

impl Submission {
    pub fn has_file(&self) -> bool {
        !self.file_path.is_empty()
    }

    /// Base name of the stored upload, as addressed under the public upload URL.
    pub fn file_name(&self) -> Option<&str> {
        if !self.has_file() {
            return None;
        }
        crate::form::base_name(&self.file_path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plate_thickness: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub file_path: String,
}
