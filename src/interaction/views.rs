use crate::interaction::filter::{filter, Selector};
use crate::models::report::{Report, ReportDetail, ReportStatus};
use crate::models::tally::VoteTally;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListScope {
    Community,
    Mine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyState {
    pub title: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCollectionView {
    pub scope: ListScope,
    pub query: String,
    pub selector: Selector,
    pub heading: String,
    pub total: usize,
    pub reports: Vec<Report>,
    pub empty_state: Option<EmptyState>,
}

fn empty_state(scope: ListScope, selector: &Selector) -> EmptyState {
    match (scope, selector) {
        (ListScope::Community, _) => EmptyState {
            title: "No reports found".to_string(),
            hint: Some("Try adjusting your search or filters".to_string()),
        },
        (ListScope::Mine, Selector::All) => EmptyState {
            title: "You haven't submitted any reports yet".to_string(),
            hint: None,
        },
        (ListScope::Mine, other) => EmptyState {
            title: format!("No {} reports", other.label().to_lowercase()),
            hint: None,
        },
    }
}

fn heading(scope: ListScope, selector: &Selector) -> String {
    match (scope, selector) {
        (ListScope::Community, _) => "Civic Reports".to_string(),
        (ListScope::Mine, Selector::All) => "All Reports".to_string(),
        (ListScope::Mine, other) => format!("{} Reports", other.label()),
    }
}

pub fn collection_view(
    scope: ListScope,
    reports: &[Report],
    query: &str,
    selector: Selector,
) -> ReportCollectionView {
    let filtered = filter(reports, query, &selector);
    let empty = filtered
        .is_empty()
        .then(|| empty_state(scope, &selector));

    ReportCollectionView {
        scope,
        query: query.to_string(),
        selector,
        heading: heading(scope, &selector),
        total: reports.len(),
        reports: filtered,
        empty_state: empty,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: String,
    pub status: ReportStatus,
    pub status_label: String,
    pub message: String,
    pub authority: String,
    pub authority_initials: String,
    pub is_latest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDetailView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ReportStatus,
    pub status_label: String,
    pub category: String,
    pub location: String,
    pub date: String,
    pub tally: VoteTally,
    pub score: i64,
    pub reported_by: String,
    pub priority_label: String,
    pub estimated_resolution: Option<String>,
    pub images: Vec<String>,
    pub image_count: usize,
    pub timeline: Vec<TimelineEntry>,
}

/// "City Municipal Corporation" -> "CM".
pub fn authority_initials(authority: &str) -> String {
    authority
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// The tally comes from the board, not from `detail.report`, so the detail
/// screen shows the same optimistic vote as the list.
pub fn detail_view(detail: &ReportDetail, tally: VoteTally) -> ReportDetailView {
    let report = &detail.report;
    let timeline = detail
        .updates
        .iter()
        .enumerate()
        .map(|(index, update)| TimelineEntry {
            date: update.date.clone(),
            status: update.status,
            status_label: update.status.label().to_string(),
            message: update.message.clone(),
            authority: update.authority.clone(),
            authority_initials: authority_initials(&update.authority),
            is_latest: index == 0,
        })
        .collect();

    ReportDetailView {
        id: report.id.clone(),
        title: report.title.clone(),
        description: report.description.clone(),
        status: report.status,
        status_label: report.status.label().to_string(),
        category: report.category.label().to_string(),
        location: report.location.clone(),
        date: report.date.clone(),
        tally,
        score: tally.score(),
        reported_by: detail.reported_by.clone(),
        priority_label: detail.priority.label().to_string(),
        estimated_resolution: detail.estimated_resolution.clone(),
        images: detail.images.clone(),
        image_count: detail.images.len(),
        timeline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{community_reports, fixture_details, viewer_reports};
    use crate::models::report::{Category, Vote};

    #[test]
    fn community_view_reports_empty_state() {
        let view = collection_view(
            ListScope::Community,
            &community_reports(),
            "nothing like this",
            Selector::All,
        );
        assert!(view.reports.is_empty());
        assert_eq!(view.total, 4);
        let empty = view.empty_state.expect("empty state");
        assert_eq!(empty.title, "No reports found");
        assert_eq!(empty.hint.as_deref(), Some("Try adjusting your search or filters"));
    }

    #[test]
    fn mine_view_names_the_status() {
        let view = collection_view(
            ListScope::Mine,
            &viewer_reports(),
            "",
            Selector::Status(ReportStatus::Rejected),
        );
        assert_eq!(view.empty_state.unwrap().title, "No rejected reports");

        let view = collection_view(ListScope::Mine, &[], "", Selector::All);
        assert_eq!(
            view.empty_state.unwrap().title,
            "You haven't submitted any reports yet"
        );

        let view = collection_view(
            ListScope::Mine,
            &viewer_reports(),
            "",
            Selector::Status(ReportStatus::Pending),
        );
        assert_eq!(view.heading, "Pending Reports");
        assert!(view.empty_state.is_none());
    }

    #[test]
    fn category_view_keeps_only_matching_reports() {
        let view = collection_view(
            ListScope::Community,
            &community_reports(),
            "",
            Selector::Category(Category::Lighting),
        );
        assert_eq!(view.reports.len(), 1);
        assert_eq!(view.reports[0].title, "Broken Street Light");
    }

    #[test]
    fn initials_take_first_two_words() {
        assert_eq!(authority_initials("City Municipal Corporation"), "CM");
        assert_eq!(authority_initials("System"), "S");
        assert_eq!(authority_initials("  "), "");
    }

    #[test]
    fn detail_view_uses_board_tally_and_marks_latest_update() {
        let detail = fixture_details().remove(0);
        let tally = VoteTally::of(&detail.report).cast(Vote::Up);
        let view = detail_view(&detail, tally);

        assert_eq!(view.tally.upvotes, detail.report.upvotes + 1);
        assert_eq!(view.score, 22);
        assert_eq!(view.status_label, "Acknowledged");
        assert_eq!(view.priority_label, "High");
        assert_eq!(view.image_count, 2);
        assert!(view.timeline[0].is_latest);
        assert!(!view.timeline[1].is_latest);
        assert_eq!(view.timeline[0].authority_initials, "CM");
    }
}
