//! Candidate assembly for the tiered inbox listing.
//!
//! The gateway runs the IMAP queries (unseen, then recent, then all) and
//! decodes one candidate per fetched header block; everything after that
//! point — primary filtering, the fail-open fallback, truncation, and
//! display reindexing — is pure and lives here so it can be tested
//! without a server.

use crate::domain::{Listing, MessageSummary, Uid};

/// Extra headroom fetched beyond `limit` so the primary filter has
/// something to discard. Floors follow the stage: 40 for unseen
/// candidates, 80 for the recent/all fallback.
pub const UNSEEN_CAP_FLOOR: usize = 40;
pub const RECENT_CAP_FLOOR: usize = 80;

pub fn stage_cap(limit: usize, floor: usize) -> usize {
    (limit * 3).max(floor)
}

/// One header-fetched message, decoded and pre-classified, newest first.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub uid: Uid,
    pub from: String,
    pub subject: String,
    pub date: String,
    pub primary: bool,
}

/// Turn an ordered candidate set into the final listing.
///
/// With `primary_only`, bulk-looking candidates are dropped — unless that
/// would drop everything, in which case the unfiltered set is used. An
/// inbox full of newsletters still reads back as an inbox, never as a
/// blank screen.
pub fn assemble_listing(candidates: Vec<Candidate>, limit: usize, primary_only: bool) -> Listing {
    let kept: Vec<Candidate> = if primary_only {
        let filtered: Vec<Candidate> = candidates
            .iter()
            .filter(|c| c.primary)
            .cloned()
            .collect();
        if filtered.is_empty() { candidates } else { filtered }
    } else {
        candidates
    };

    let summaries = kept
        .into_iter()
        .take(limit)
        .map(|c| MessageSummary {
            index: 0, // renumbered by Listing::from_summaries
            uid: c.uid,
            from: c.from,
            subject: c.subject,
            date: c.date,
        })
        .collect();
    Listing::from_summaries(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(uid: Uid, primary: bool) -> Candidate {
        Candidate {
            uid,
            from: format!("sender{uid}@example.com"),
            subject: format!("message {uid}"),
            date: String::new(),
            primary,
        }
    }

    #[test]
    fn stage_caps() {
        assert_eq!(stage_cap(10, UNSEEN_CAP_FLOOR), 40);
        assert_eq!(stage_cap(20, UNSEEN_CAP_FLOOR), 60);
        assert_eq!(stage_cap(10, RECENT_CAP_FLOOR), 80);
        assert_eq!(stage_cap(50, RECENT_CAP_FLOOR), 150);
    }

    #[test]
    fn unfiltered_listing_keeps_order_and_reindexes() {
        let cands = vec![candidate(90, true), candidate(85, false), candidate(12, true)];
        let listing = assemble_listing(cands, 10, false);
        assert_eq!(listing.len(), 3);
        assert_eq!(listing.uid_at(1), Some(90));
        assert_eq!(listing.uid_at(2), Some(85));
        assert_eq!(listing.uid_at(3), Some(12));
    }

    #[test]
    fn primary_filter_drops_bulk() {
        let cands = vec![candidate(9, false), candidate(8, true), candidate(7, false)];
        let listing = assemble_listing(cands, 10, true);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.uid_at(1), Some(8));
    }

    #[test]
    fn fails_open_when_everything_is_bulk() {
        let cands: Vec<Candidate> = (1..=5).rev().map(|u| candidate(u, false)).collect();
        let listing = assemble_listing(cands, 10, true);
        assert_eq!(listing.len(), 5);
        assert_eq!(listing.uid_at(1), Some(5));
        assert_eq!(listing.uid_at(5), Some(1));
    }

    #[test]
    fn truncates_to_limit_after_filtering() {
        let cands: Vec<Candidate> = (1..=30).rev().map(|u| candidate(u, true)).collect();
        let listing = assemble_listing(cands, 10, true);
        assert_eq!(listing.len(), 10);
        assert_eq!(listing.uid_at(1), Some(30));
        assert_eq!(listing.uid_at(10), Some(21));
    }

    #[test]
    fn empty_candidates_give_empty_listing() {
        assert!(assemble_listing(Vec::new(), 10, true).is_empty());
    }
}
