#![forbid(unsafe_code)]

//! Cooperative timer scheduler.
//!
//! Timers run on a virtual clock that only moves when the kernel calls
//! [`Scheduler::advance`]. Each call is one frame. Nothing here spawns a
//! thread or sleeps; the event loop decides how real time maps onto frames.
//!
//! # How it works
//!
//! 1. A timer is armed under an `(Owner, TimerId)` key; arming the same key
//!    again replaces the previous timer
//! 2. `advance(dt)` moves the clock, collects every due timer and returns
//!    them in due order (ties broken by arming order)
//! 3. One-shot timers are removed when they fire, periodic timers are
//!    re-armed by the scheduler and fire at most once per frame
//! 4. `cancel_owner` and `clear` give the kernel deterministic teardown
//! 5. A fired timer is delivered only if [`Scheduler::claim`] accepts it;
//!    cancelling or re-arming a key revokes its fired-but-undelivered
//!    entry, so a handler can stop a timer later in the same frame

use std::time::Duration;

use tracing::{debug, trace};

use crate::process::Pid;

/// Timer identifier, chosen by the owner.
pub type TimerId = u64;

/// Who a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Kernel,
    Process(Pid),
}

/// When a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Once, after this much virtual time.
    After(Duration),
    /// Once, after this many frames. Zero means the next frame.
    AfterFrames(u32),
    /// Repeatedly with this period. A zero period fires every frame.
    Every(Duration),
}

/// A timer that came due during [`Scheduler::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub owner: Owner,
    pub id: TimerId,
    /// Unique per firing.
    shot: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Due {
    Time(Duration),
    Frame(u64),
}

#[derive(Debug, Clone)]
struct Entry {
    owner: Owner,
    id: TimerId,
    trigger: Trigger,
    due: Due,
    seq: u64,
}

impl Entry {
    fn is(&self, owner: Owner, id: TimerId) -> bool {
        self.owner == owner && self.id == id
    }
}

/// Virtual-clock timer table.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    frame: u64,
    next_seq: u64,
    entries: Vec<Entry>,
    /// Fired this frame and not yet claimed or revoked.
    pending: Vec<Fired>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of `advance` calls so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Arm a timer, replacing any timer with the same owner and id.
    pub fn schedule(&mut self, owner: Owner, id: TimerId, trigger: Trigger) {
        self.entries.retain(|e| !e.is(owner, id));
        self.pending.retain(|f| !(f.owner == owner && f.id == id));
        let due = match trigger {
            Trigger::After(delay) | Trigger::Every(delay) => Due::Time(self.now + delay),
            Trigger::AfterFrames(frames) => Due::Frame(self.frame + u64::from(frames.max(1))),
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(?owner, id, ?trigger, "timer armed");
        self.entries.push(Entry {
            owner,
            id,
            trigger,
            due,
            seq,
        });
    }

    /// Cancel one timer. Returns whether it was armed or awaiting delivery.
    pub fn cancel(&mut self, owner: Owner, id: TimerId) -> bool {
        let before = self.entries.len() + self.pending.len();
        self.entries.retain(|e| !e.is(owner, id));
        self.pending.retain(|f| !(f.owner == owner && f.id == id));
        before != self.entries.len() + self.pending.len()
    }

    /// Cancel every timer belonging to `owner`. Returns how many were armed.
    pub fn cancel_owner(&mut self, owner: Owner) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.owner != owner);
        self.pending.retain(|f| f.owner != owner);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(?owner, removed, "timers cancelled");
        }
        removed
    }

    /// Drop every timer.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!(count = self.entries.len(), "all timers cleared");
        }
        self.entries.clear();
        self.pending.clear();
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_scheduled(&self, owner: Owner, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.is(owner, id))
    }

    /// Accept `fired` for delivery. Returns `false` when it was revoked by
    /// a cancel or re-arm after [`advance`](Self::advance) returned it, or
    /// was already claimed.
    pub fn claim(&mut self, fired: Fired) -> bool {
        match self.pending.iter().position(|f| f.shot == fired.shot) {
            Some(index) => {
                self.pending.swap_remove(index);
                true
            }
            None => {
                trace!(owner = ?fired.owner, id = fired.id, "revoked timer not delivered");
                false
            }
        }
    }

    /// Advance one frame by `dt` and return the timers that came due.
    ///
    /// Anything left unclaimed from the previous frame is dropped.
    pub fn advance(&mut self, dt: Duration) -> Vec<Fired> {
        self.pending.clear();
        self.now += dt;
        self.frame += 1;
        let now = self.now;
        let frame = self.frame;

        let mut due: Vec<(Duration, u64, Fired)> = Vec::new();
        for entry in &mut self.entries {
            let at = match entry.due {
                Due::Time(at) if at <= now => at,
                Due::Frame(f) if f <= frame => now,
                _ => continue,
            };
            self.next_seq += 1;
            due.push((
                at,
                entry.seq,
                Fired {
                    owner: entry.owner,
                    id: entry.id,
                    shot: self.next_seq,
                },
            ));
            if let Trigger::Every(period) = entry.trigger
                && let Due::Time(at) = entry.due
            {
                entry.due = Due::Time(next_due(at, period, now));
            }
        }
        self.entries.retain(|e| {
            matches!(e.trigger, Trigger::Every(_)) || !is_due(e.due, now, frame)
        });

        due.sort_by_key(|&(at, seq, _)| (at, seq));
        self.pending = due.into_iter().map(|(_, _, fired)| fired).collect();
        self.pending.clone()
    }
}

fn is_due(due: Due, now: Duration, frame: u64) -> bool {
    match due {
        Due::Time(at) => at <= now,
        Due::Frame(f) => f <= frame,
    }
}

/// First periodic deadline strictly after `now`, skipping missed periods.
fn next_due(at: Duration, period: Duration, now: Duration) -> Duration {
    if period.is_zero() {
        return now;
    }
    let mut next = at + period;
    if next <= now {
        let behind = (now - next).as_nanos() / period.as_nanos() + 1;
        let skip = behind.saturating_mul(period.as_nanos());
        next += Duration::from_nanos(u64::try_from(skip).unwrap_or(u64::MAX));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn ids(fired: &[Fired]) -> Vec<TimerId> {
        fired.iter().map(|f| f.id).collect()
    }

    #[test]
    fn after_fires_once() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::After(MS * 100));
        assert!(s.advance(MS * 50).is_empty());
        assert_eq!(ids(&s.advance(MS * 50)), vec![1]);
        assert!(s.advance(MS * 500).is_empty());
        assert_eq!(s.active_count(), 0);
    }

    #[test]
    fn after_frames_counts_advances() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::AfterFrames(3));
        assert!(s.advance(Duration::ZERO).is_empty());
        assert!(s.advance(Duration::ZERO).is_empty());
        assert_eq!(ids(&s.advance(Duration::ZERO)), vec![1]);
        assert!(!s.is_scheduled(Owner::Kernel, 1));
    }

    #[test]
    fn zero_frames_means_next_frame() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 4, Trigger::AfterFrames(0));
        assert_eq!(ids(&s.advance(Duration::ZERO)), vec![4]);
    }

    #[test]
    fn every_fires_at_most_once_per_frame() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 9, Trigger::Every(MS * 10));
        assert_eq!(ids(&s.advance(MS * 35)), vec![9]);
        // Missed periods are skipped: next deadline is 40ms.
        assert!(s.advance(MS * 4).is_empty());
        assert_eq!(ids(&s.advance(MS)), vec![9]);
        assert!(s.is_scheduled(Owner::Kernel, 9));
    }

    #[test]
    fn every_zero_period_fires_each_frame() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::Every(Duration::ZERO));
        for _ in 0..3 {
            assert_eq!(s.advance(Duration::ZERO).len(), 1);
        }
    }

    #[test]
    fn due_order_then_arming_order() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::After(MS * 30));
        s.schedule(Owner::Kernel, 2, Trigger::After(MS * 10));
        s.schedule(Owner::Kernel, 3, Trigger::After(MS * 10));
        assert_eq!(ids(&s.advance(MS * 50)), vec![2, 3, 1]);
    }

    #[test]
    fn rescheduling_replaces() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::After(MS * 10));
        s.schedule(Owner::Kernel, 1, Trigger::After(MS * 100));
        assert_eq!(s.active_count(), 1);
        assert!(s.advance(MS * 20).is_empty());
    }

    #[test]
    fn same_id_different_owner_is_distinct() {
        let mut s = Scheduler::new();
        let p = Owner::Process(Pid::new(0));
        s.schedule(Owner::Kernel, 1, Trigger::After(MS));
        s.schedule(p, 1, Trigger::After(MS));
        assert_eq!(s.active_count(), 2);
        let fired = s.advance(MS);
        assert_eq!(fired[0].owner, Owner::Kernel);
        assert_eq!(fired[1].owner, p);
    }

    #[test]
    fn cancel_owner_only_touches_owner() {
        let mut s = Scheduler::new();
        let a = Owner::Process(Pid::new(0));
        let b = Owner::Process(Pid::new(1));
        s.schedule(a, 1, Trigger::Every(MS));
        s.schedule(a, 2, Trigger::After(MS));
        s.schedule(b, 1, Trigger::Every(MS));
        assert_eq!(s.cancel_owner(a), 2);
        assert_eq!(s.active_count(), 1);
        assert!(s.is_scheduled(b, 1));
    }

    #[test]
    fn cancel_and_clear() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::Every(MS));
        assert!(s.cancel(Owner::Kernel, 1));
        assert!(!s.cancel(Owner::Kernel, 1));
        s.schedule(Owner::Kernel, 2, Trigger::Every(MS));
        s.clear();
        assert_eq!(s.active_count(), 0);
        assert!(s.advance(MS * 10).is_empty());
    }

    #[test]
    fn cancel_revokes_fired_but_undelivered() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::After(MS * 10));
        s.schedule(Owner::Kernel, 2, Trigger::After(MS * 20));
        let fired = s.advance(MS * 50);
        assert_eq!(ids(&fired), vec![1, 2]);
        assert!(s.claim(fired[0]));
        assert!(s.cancel(Owner::Kernel, 2));
        assert!(!s.claim(fired[1]));
    }

    #[test]
    fn rearm_revokes_pending_periodic() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 5, Trigger::Every(MS * 10));
        let fired = s.advance(MS * 10);
        s.schedule(Owner::Kernel, 5, Trigger::Every(MS * 100));
        assert!(!s.claim(fired[0]));
        assert!(s.is_scheduled(Owner::Kernel, 5));
    }

    #[test]
    fn claim_is_single_use_and_expires() {
        let mut s = Scheduler::new();
        s.schedule(Owner::Kernel, 1, Trigger::Every(MS));
        let fired = s.advance(MS);
        assert!(s.claim(fired[0]));
        assert!(!s.claim(fired[0]));
        let stale = s.advance(MS)[0];
        s.advance(MS);
        assert!(!s.claim(stale));
    }

    #[test]
    fn clock_and_frame_advance() {
        let mut s = Scheduler::new();
        s.advance(MS * 16);
        s.advance(MS * 16);
        assert_eq!(s.now(), MS * 32);
        assert_eq!(s.frame(), 2);
    }
}
