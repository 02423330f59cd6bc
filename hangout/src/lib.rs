//! Hangout detection — promoting GPS proximity into confirmed sessions.
//!
//! Per friend-pair state machine: **None → Candidate → Active →
//! (Merged | Ended)**. Two radii absorb GPS noise: a loose candidate
//! buffer keeps a pair's candidacy alive through jitter, while the tight
//! confirm radius proves the pair actually met before a session is
//! created. Brief signal loss after a session ends is healed by reopening
//! the session when the pair reappears within the merge gap.
//!
//! The tracker is push-driven by location samples and receives time
//! explicitly; missing samples passively decay state toward Ended rather
//! than raising errors.

pub mod state;
pub mod tracker;

pub use state::{HangoutCandidate, HangoutEvent, HangoutSession, PairKey};
pub use tracker::HangoutTracker;
