use crate::models::report::{
    Category, Priority, Report, ReportDetail, ReportStatus, StatusUpdate, Vote,
};

pub const SUBMITTED_MESSAGE: &str = "Report submitted successfully.";
pub const SYSTEM_AUTHORITY: &str = "System";
pub const ANONYMOUS_REPORTER: &str = "Anonymous Citizen";

#[allow(clippy::too_many_arguments)]
fn report(
    id: &str,
    title: &str,
    description: &str,
    status: ReportStatus,
    location: &str,
    date: &str,
    upvotes: u32,
    downvotes: u32,
    category: Category,
    user_vote: Option<Vote>,
) -> Report {
    Report {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        status,
        location: location.to_string(),
        date: date.to_string(),
        upvotes,
        downvotes,
        category,
        image_url: None,
        user_vote,
    }
}

pub fn community_reports() -> Vec<Report> {
    vec![
        report(
            "1",
            "Pothole on Main Street",
            "Large pothole causing traffic issues and potential vehicle damage. Located near the traffic signal.",
            ReportStatus::Acknowledged,
            "Main Street, Downtown",
            "2 days ago",
            23,
            2,
            Category::RoadIssues,
            None,
        ),
        report(
            "2",
            "Broken Street Light",
            "Street light has been out for over a week, making the area unsafe during night hours.",
            ReportStatus::Pending,
            "Park Avenue",
            "1 week ago",
            15,
            1,
            Category::Lighting,
            Some(Vote::Up),
        ),
        report(
            "3",
            "Illegal Garbage Dumping",
            "Construction waste dumped illegally in the vacant lot. Creating health hazards for residents.",
            ReportStatus::Resolved,
            "Elm Street",
            "3 days ago",
            31,
            0,
            Category::WasteManagement,
            None,
        ),
        report(
            "4",
            "Water Leakage",
            "Continuous water leakage from the main pipe causing road flooding and water wastage.",
            ReportStatus::Pending,
            "Oak Avenue",
            "5 hours ago",
            8,
            0,
            Category::WaterAndDrainage,
            None,
        ),
    ]
}

pub fn viewer_reports() -> Vec<Report> {
    vec![
        report(
            "user-1",
            "Broken Traffic Signal",
            "Traffic signal at intersection not working properly, causing confusion during peak hours.",
            ReportStatus::Acknowledged,
            "Main & Oak Street",
            "1 day ago",
            18,
            1,
            Category::Traffic,
            None,
        ),
        report(
            "user-2",
            "Overflowing Garbage Bin",
            "Public garbage bin overflowing for days, attracting pests and creating unsanitary conditions.",
            ReportStatus::Resolved,
            "Central Park",
            "5 days ago",
            12,
            0,
            Category::WasteManagement,
            None,
        ),
        report(
            "user-3",
            "Damaged Sidewalk",
            "Sidewalk has multiple cracks and uneven surfaces, posing safety risks for pedestrians.",
            ReportStatus::Pending,
            "Elm Street",
            "2 weeks ago",
            7,
            2,
            Category::RoadIssues,
            None,
        ),
    ]
}

pub fn submitted_update(date: &str) -> StatusUpdate {
    StatusUpdate {
        date: date.to_string(),
        status: ReportStatus::Pending,
        message: SUBMITTED_MESSAGE.to_string(),
        authority: SYSTEM_AUTHORITY.to_string(),
    }
}

// Only the pothole carries a full history.
pub fn fixture_details() -> Vec<ReportDetail> {
    community_reports()
        .into_iter()
        .chain(viewer_reports())
        .map(|report| {
            if report.id == "1" {
                return ReportDetail {
                    reported_by: ANONYMOUS_REPORTER.to_string(),
                    priority: Priority::High,
                    estimated_resolution: Some("5-7 business days".to_string()),
                    images: vec!["/placeholder.svg".to_string(), "/placeholder.svg".to_string()],
                    updates: vec![
                        StatusUpdate {
                            date: report.date.clone(),
                            status: ReportStatus::Acknowledged,
                            message: "Report has been acknowledged by the Municipal Corporation. Inspection scheduled.".to_string(),
                            authority: "City Municipal Corporation".to_string(),
                        },
                        submitted_update(&report.date),
                    ],
                    report,
                };
            }

            let mut updates = Vec::new();
            match report.status {
                ReportStatus::Pending => {}
                ReportStatus::Acknowledged => updates.push(StatusUpdate {
                    date: report.date.clone(),
                    status: ReportStatus::Acknowledged,
                    message: "Report has been acknowledged. Inspection scheduled.".to_string(),
                    authority: "City Municipal Corporation".to_string(),
                }),
                ReportStatus::Resolved => updates.push(StatusUpdate {
                    date: report.date.clone(),
                    status: ReportStatus::Resolved,
                    message: "The issue has been resolved by the field team.".to_string(),
                    authority: "City Municipal Corporation".to_string(),
                }),
                ReportStatus::Rejected => updates.push(StatusUpdate {
                    date: report.date.clone(),
                    status: ReportStatus::Rejected,
                    message: "The report could not be verified.".to_string(),
                    authority: "City Municipal Corporation".to_string(),
                }),
            }
            updates.push(submitted_update(&report.date));

            ReportDetail {
                reported_by: ANONYMOUS_REPORTER.to_string(),
                priority: Priority::Medium,
                estimated_resolution: None,
                images: report.image_url.iter().cloned().collect(),
                updates,
                report,
            }
        })
        .collect()
}
