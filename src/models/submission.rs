use crate::models::report::Category;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub file_name: String,
}

/// Form state of the "Report an issue" screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub location: String,
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
}

/// A draft that passed validation, ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: String,
    pub images: Vec<ImageAttachment>,
}
