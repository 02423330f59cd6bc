//! The hangout tracker — drives the per-pair state machine from raw
//! location samples.

use crate::state::{HangoutCandidate, HangoutEvent, HangoutSession, PairKey};
use circle_types::{EngineParams, LocationSample, Timestamp, UserId};
use std::collections::HashMap;

/// An active session plus the tracker-internal refresh bookkeeping.
#[derive(Clone, Debug)]
struct ActiveEntry {
    session: HangoutSession,
    /// Last time any sample kept the pair within the candidate buffer.
    last_proximity: Timestamp,
}

/// Promotes sustained pairwise proximity into hangout sessions.
///
/// Driven by the location provider's callback (`update_location`), not by
/// a fixed period; a separate `expire_stale` pass lets provider outages
/// decay candidates and sessions toward Ended.
pub struct HangoutTracker {
    params: EngineParams,
    /// Most recent sample per user.
    latest: HashMap<UserId, LocationSample>,
    candidates: HashMap<PairKey, HangoutCandidate>,
    active: HashMap<PairKey, ActiveEntry>,
    /// Ended sessions still within the merge gap, reopenable.
    recently_ended: HashMap<PairKey, HangoutSession>,
    /// Completed sessions past the merge gap, newest last. Capped at
    /// `hangout_history_len` with oldest-first eviction.
    finished: Vec<HangoutSession>,
    next_session_id: u64,
    pending_events: Vec<HangoutEvent>,
}

impl HangoutTracker {
    pub fn new(params: EngineParams) -> Self {
        Self {
            params,
            latest: HashMap::new(),
            candidates: HashMap::new(),
            active: HashMap::new(),
            recently_ended: HashMap::new(),
            finished: Vec::new(),
            next_session_id: 1,
            pending_events: Vec::new(),
        }
    }

    /// Feed a new location sample for a user.
    ///
    /// Expires stale state first, then evaluates proximity against every
    /// other user's latest fresh sample, advancing the pair state machine.
    pub fn update_location(&mut self, user: &UserId, sample: LocationSample, now: Timestamp) {
        self.expire_stale(now);
        self.latest.insert(user.clone(), sample);

        // Collect pair evaluations up front to avoid borrowing `latest`
        // across the mutations below.
        let neighbors: Vec<(UserId, f64)> = self
            .latest
            .iter()
            .filter(|(other, _)| *other != user)
            .filter(|(_, other_sample)| {
                // A stale neighbor sample cannot refresh proximity.
                !other_sample
                    .timestamp
                    .has_expired(self.params.hangout_stale_secs, now)
            })
            .map(|(other, other_sample)| (other.clone(), sample.distance_to(other_sample)))
            .collect();

        for (other, distance_m) in neighbors {
            if distance_m <= self.params.hangout_candidate_radius_m {
                self.refresh_pair(user, &other, distance_m, now);
            }
        }
    }

    /// Advance one pair that is currently within the candidate buffer.
    fn refresh_pair(&mut self, user: &UserId, other: &UserId, distance_m: f64, now: Timestamp) {
        let key = PairKey::new(user.clone(), other.clone());

        if let Some(entry) = self.active.get_mut(&key) {
            entry.last_proximity = now;
            return;
        }

        if let Some(candidate) = self.candidates.get_mut(&key) {
            candidate.last_proximity = now;
            if distance_m < candidate.min_distance_m {
                candidate.min_distance_m = distance_m;
            }

            let sustained = now.as_secs() - candidate.started_at.as_secs()
                >= self.params.hangout_promote_secs;
            let confirmed = candidate.min_distance_m <= self.params.hangout_confirm_radius_m;
            if sustained && confirmed {
                let candidate = self.candidates.remove(&key).expect("candidate present");
                self.promote(key, candidate, now);
            }
            return;
        }

        // No candidate and no active session. A pair reappearing shortly
        // after its session ended continues that session instead of
        // starting the promotion clock over.
        if let Some(prev) = self.recently_ended.get(&key) {
            let ended_at = prev.end_time.expect("ended session has end_time");
            if !ended_at.has_expired(self.params.hangout_merge_gap_secs, now) {
                let mut session = self.recently_ended.remove(&key).expect("session present");
                session.end_time = None;
                session.is_active = true;
                tracing::debug!(session_id = session.id, "hangout session resumed");
                self.pending_events.push(HangoutEvent::SessionResumed {
                    session: session.clone(),
                });
                self.active.insert(
                    key,
                    ActiveEntry {
                        session,
                        last_proximity: now,
                    },
                );
                return;
            }
        }

        self.candidates.insert(
            key.clone(),
            HangoutCandidate {
                pair: key,
                started_at: now,
                last_proximity: now,
                min_distance_m: distance_m,
            },
        );
    }

    /// Candidate → Active.
    fn promote(&mut self, key: PairKey, candidate: HangoutCandidate, now: Timestamp) {
        let (a, b) = key.users();
        let location = match (self.latest.get(a), self.latest.get(b)) {
            (Some(sa), Some(sb)) => sa.point.midpoint(&sb.point),
            (Some(s), None) | (None, Some(s)) => s.point,
            (None, None) => return, // unreachable in practice
        };

        let session = HangoutSession {
            id: self.next_session_id,
            participants: [a.clone(), b.clone()],
            started_at: candidate.started_at,
            end_time: None,
            location,
            is_active: true,
        };
        self.next_session_id += 1;

        tracing::info!(
            session_id = session.id,
            started_at = %session.started_at,
            "hangout session confirmed"
        );
        self.pending_events.push(HangoutEvent::SessionStarted {
            session: session.clone(),
        });
        self.active.insert(
            key,
            ActiveEntry {
                session,
                last_proximity: now,
            },
        );
    }

    /// Decay state that has not seen a proximity refresh recently.
    ///
    /// Safe to call on every update and on a timer; a location-provider
    /// outage therefore ends sessions without any explicit error path.
    pub fn expire_stale(&mut self, now: Timestamp) {
        let stale = self.params.hangout_stale_secs;

        // A stale latest sample can never refresh proximity again; drop it
        // rather than filtering it on every read.
        self.latest
            .retain(|_, s| !s.timestamp.has_expired(stale, now));

        self.candidates
            .retain(|_, c| !c.last_proximity.has_expired(stale, now));

        let expired: Vec<PairKey> = self
            .active
            .iter()
            .filter(|(_, e)| e.last_proximity.has_expired(stale, now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            let entry = self.active.remove(&key).expect("entry present");
            let mut session = entry.session;
            session.end_time = Some(entry.last_proximity);
            session.is_active = false;
            tracing::info!(session_id = session.id, "hangout session ended");
            self.pending_events.push(HangoutEvent::SessionEnded {
                session: session.clone(),
            });
            self.recently_ended.insert(key, session);
        }

        // Sessions past the merge gap can no longer be reopened.
        let gap = self.params.hangout_merge_gap_secs;
        let closed: Vec<PairKey> = self
            .recently_ended
            .iter()
            .filter(|(_, s)| {
                s.end_time
                    .map(|t| t.has_expired(gap, now))
                    .unwrap_or(false)
            })
            .map(|(k, _)| k.clone())
            .collect();
        for key in closed {
            if let Some(session) = self.recently_ended.remove(&key) {
                if self.finished.len() >= self.params.hangout_history_len {
                    self.finished.remove(0);
                }
                self.finished.push(session);
            }
        }
    }

    /// The active session for a pair, if any.
    pub fn active_session(&self, a: &UserId, b: &UserId) -> Option<&HangoutSession> {
        self.active
            .get(&PairKey::new(a.clone(), b.clone()))
            .map(|e| &e.session)
    }

    /// All currently active sessions.
    pub fn active_sessions(&self) -> Vec<&HangoutSession> {
        self.active.values().map(|e| &e.session).collect()
    }

    /// Sessions that have finished and aged past the merge gap.
    pub fn finished_sessions(&self) -> &[HangoutSession] {
        &self.finished
    }

    /// Take the accumulated state-transition events.
    pub fn drain_events(&mut self) -> Vec<HangoutEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
