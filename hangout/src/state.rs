//! Hangout state types: pair keys, candidates, sessions, events.

use circle_types::{GeoPoint, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// An unordered pair of users, stored in normalized order so that
/// `(a, b)` and `(b, a)` key the same state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey(UserId, UserId);

impl PairKey {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn users(&self) -> (&UserId, &UserId) {
        (&self.0, &self.1)
    }

    pub fn contains(&self, user: &UserId) -> bool {
        &self.0 == user || &self.1 == user
    }
}

/// A tentative hangout awaiting sustained proximity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HangoutCandidate {
    pub pair: PairKey,
    /// When the pair first entered the candidate buffer.
    pub started_at: Timestamp,
    /// Last time a sample kept the pair within the buffer.
    pub last_proximity: Timestamp,
    /// Closest pairwise distance observed so far, in meters.
    pub min_distance_m: f64,
}

/// A confirmed hangout between two users.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HangoutSession {
    pub id: u64,
    pub participants: [UserId; 2],
    pub started_at: Timestamp,
    /// `None` while the session is active.
    pub end_time: Option<Timestamp>,
    /// Where the pair was when the session was confirmed.
    pub location: GeoPoint,
    pub is_active: bool,
}

/// State transitions surfaced to the caller (points/UI layers).
#[derive(Clone, Debug)]
pub enum HangoutEvent {
    /// A candidate survived the promotion threshold — session confirmed.
    SessionStarted { session: HangoutSession },
    /// A just-ended session was reopened within the merge gap.
    SessionResumed { session: HangoutSession },
    /// No proximity refresh within the staleness window.
    SessionEnded { session: HangoutSession },
}
