use crate::models::report::{Report, ReportStatus, Vote};
use crate::models::tally::VoteTally;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub acknowledged: usize,
    pub resolved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn slot_mut(&mut self, status: ReportStatus) -> &mut usize {
        match status {
            ReportStatus::Pending => &mut self.pending,
            ReportStatus::Acknowledged => &mut self.acknowledged,
            ReportStatus::Resolved => &mut self.resolved,
            ReportStatus::Rejected => &mut self.rejected,
        }
    }
}

pub fn status_counts(reports: &[Report]) -> StatusCounts {
    reports.iter().fold(
        StatusCounts {
            total: reports.len(),
            ..StatusCounts::default()
        },
        |mut counts, report| {
            *counts.slot_mut(report.status) += 1;
            counts
        },
    )
}

/// Reports loaded for this session, with the viewer's optimistic votes
/// applied in place. Nothing here is written back to the store.
#[derive(Debug, Default)]
pub struct ReportBoard {
    pub community: Vec<Report>,
    pub mine: Vec<Report>,
    pub loaded: bool,
}

impl ReportBoard {
    /// Replace the loaded reports, keeping local tallies for reports that
    /// are still present.
    pub fn replace(&mut self, community: Vec<Report>, mine: Vec<Report>) {
        let local: HashMap<String, VoteTally> = self
            .community
            .iter()
            .chain(self.mine.iter())
            .map(|r| (r.id.clone(), VoteTally::of(r)))
            .collect();

        self.community = community;
        self.mine = mine;
        for report in self.community.iter_mut().chain(self.mine.iter_mut()) {
            if let Some(tally) = local.get(&report.id) {
                tally.apply_to(report);
            }
        }
        self.loaded = true;
    }

    pub fn find(&self, id: &str) -> Option<&Report> {
        self.community
            .iter()
            .chain(self.mine.iter())
            .find(|r| r.id == id)
    }

    /// Cast the viewer's vote on a report. A report listed in both
    /// collections is updated in both.
    pub fn cast_vote(&mut self, id: &str, direction: Vote) -> Option<VoteTally> {
        let current = VoteTally::of(self.find(id)?);
        let next = current.cast(direction);
        for report in self
            .community
            .iter_mut()
            .chain(self.mine.iter_mut())
            .filter(|r| r.id == id)
        {
            next.apply_to(report);
        }
        Some(next)
    }

    pub fn push_mine(&mut self, report: Report) {
        self.mine.push(report);
    }
}
