use crate::models::report::{Report, Vote};
use serde::{Deserialize, Serialize};

/// Up/down counters of one report plus the viewer's own vote.
///
/// The tally is a value: `cast` returns the next state and leaves the
/// receiver untouched. Counters saturate at zero, so a tally built from an
/// inconsistent baseline still never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: u32,
    pub downvotes: u32,
    pub user_vote: Option<Vote>,
}

impl VoteTally {
    pub fn new(upvotes: u32, downvotes: u32, user_vote: Option<Vote>) -> Self {
        Self {
            upvotes,
            downvotes,
            user_vote,
        }
    }

    pub fn of(report: &Report) -> Self {
        Self::new(report.upvotes, report.downvotes, report.user_vote)
    }

    /// Casting the current direction again clears it; casting the other
    /// direction moves the vote.
    pub fn cast(self, direction: Vote) -> Self {
        let mut next = self;

        // Remove old vote
        match self.user_vote {
            Some(Vote::Up) => next.upvotes = next.upvotes.saturating_sub(1),
            Some(Vote::Down) => next.downvotes = next.downvotes.saturating_sub(1),
            None => {}
        }

        let new_vote = if self.user_vote == Some(direction) {
            None
        } else {
            Some(direction)
        };

        // Add new vote
        match new_vote {
            Some(Vote::Up) => next.upvotes = next.upvotes.saturating_add(1),
            Some(Vote::Down) => next.downvotes = next.downvotes.saturating_add(1),
            None => {}
        }

        next.user_vote = new_vote;
        next
    }

    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    pub fn apply_to(&self, report: &mut Report) {
        report.upvotes = self.upvotes;
        report.downvotes = self.downvotes;
        report.user_vote = self.user_vote;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASELINES: [VoteTally; 5] = [
        VoteTally { upvotes: 0, downvotes: 0, user_vote: None },
        VoteTally { upvotes: 23, downvotes: 2, user_vote: None },
        VoteTally { upvotes: 15, downvotes: 1, user_vote: Some(Vote::Up) },
        VoteTally { upvotes: 4, downvotes: 9, user_vote: Some(Vote::Down) },
        VoteTally { upvotes: 1, downvotes: 0, user_vote: Some(Vote::Up) },
    ];

    #[test]
    fn casting_same_direction_twice_restores_the_tally() {
        for baseline in BASELINES {
            for direction in [Vote::Up, Vote::Down] {
                assert_eq!(baseline.cast(direction).cast(direction), baseline);
            }
        }
    }

    #[test]
    fn casting_on_empty_vote_increments_the_direction() {
        let tally = VoteTally::new(23, 2, None).cast(Vote::Up);
        assert_eq!(tally, VoteTally::new(24, 2, Some(Vote::Up)));

        let tally = VoteTally::new(23, 2, None).cast(Vote::Down);
        assert_eq!(tally, VoteTally::new(23, 3, Some(Vote::Down)));
    }

    #[test]
    fn switching_direction_moves_the_single_vote() {
        let baseline = VoteTally::new(23, 2, None);
        let up = baseline.cast(Vote::Up);
        let down = up.cast(Vote::Down);

        assert_eq!(down.user_vote, Some(Vote::Down));
        assert_eq!(down.upvotes, up.upvotes - 1);
        assert_eq!(down.downvotes, up.downvotes + 1);
        assert_eq!(down.upvotes, baseline.upvotes);
        assert_eq!(down.downvotes, baseline.downvotes + 1);
    }

    #[test]
    fn clearing_an_existing_vote_from_the_server_baseline() {
        let tally = VoteTally::new(15, 1, Some(Vote::Up)).cast(Vote::Up);
        assert_eq!(tally, VoteTally::new(14, 1, None));
    }

    #[test]
    fn counters_never_go_negative() {
        // Inconsistent baseline: viewer "voted up" but the counter is zero.
        let mut tally = VoteTally::new(0, 0, Some(Vote::Up));
        let sequence = [Vote::Up, Vote::Down, Vote::Down, Vote::Up, Vote::Down, Vote::Up, Vote::Up];
        for direction in sequence {
            tally = tally.cast(direction);
            assert!(tally.score() >= -1 && tally.score() <= 1);
        }

        let mut tally = VoteTally::new(0, 0, None);
        for (i, direction) in sequence.iter().cycle().take(50).enumerate() {
            tally = tally.cast(*direction);
            assert!(tally.upvotes + tally.downvotes <= 1, "step {i}: {tally:?}");
        }
    }

    #[test]
    fn apply_to_copies_vote_fields_into_report() {
        let mut report = crate::commands::fixtures::community_reports().remove(0);
        let tally = VoteTally::of(&report).cast(Vote::Down);
        tally.apply_to(&mut report);
        assert_eq!(report.downvotes, tally.downvotes);
        assert_eq!(report.user_vote, Some(Vote::Down));
    }
}
