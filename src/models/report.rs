use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Acknowledged,
    Resolved,
    Rejected,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Pending,
        ReportStatus::Acknowledged,
        ReportStatus::Resolved,
        ReportStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Acknowledged => "acknowledged",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Rejected => "rejected",
        }
    }

    /// Capitalized form shown on badges and status filters.
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Acknowledged => "Acknowledged",
            ReportStatus::Resolved => "Resolved",
            ReportStatus::Rejected => "Rejected",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == normalized)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Road Issues")]
    RoadIssues,
    #[serde(rename = "Lighting")]
    Lighting,
    #[serde(rename = "Waste Management")]
    WasteManagement,
    #[serde(rename = "Water & Drainage")]
    WaterAndDrainage,
    #[serde(rename = "Public Safety")]
    PublicSafety,
    #[serde(rename = "Traffic")]
    Traffic,
    #[serde(rename = "Parks & Recreation")]
    ParksAndRecreation,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::RoadIssues,
        Category::Lighting,
        Category::WasteManagement,
        Category::WaterAndDrainage,
        Category::PublicSafety,
        Category::Traffic,
        Category::ParksAndRecreation,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::RoadIssues => "Road Issues",
            Category::Lighting => "Lighting",
            Category::WasteManagement => "Waste Management",
            Category::WaterAndDrainage => "Water & Drainage",
            Category::PublicSafety => "Public Safety",
            Category::Traffic => "Traffic",
            Category::ParksAndRecreation => "Parks & Recreation",
            Category::Other => "Other",
        }
    }

    /// Labels match exactly; only statuses are case-normalized.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn as_str(self) -> &'static str {
        match self {
            Vote::Up => "up",
            Vote::Down => "down",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "up" => Some(Vote::Up),
            "down" => Some(Vote::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ReportStatus,
    pub location: String,
    pub date: String,
    pub upvotes: u32,
    pub downvotes: u32,
    pub category: Category,
    pub image_url: Option<String>,
    pub user_vote: Option<Vote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub date: String,
    pub status: ReportStatus,
    pub message: String,
    pub authority: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDetail {
    pub report: Report,
    pub reported_by: String,
    pub priority: Priority,
    pub estimated_resolution: Option<String>,
    pub images: Vec<String>,
    pub updates: Vec<StatusUpdate>, // newest first
}
