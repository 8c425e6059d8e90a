use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Telegram user id. In a private chat it is also the chat id,
/// so it is all we need to send something back.
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingOutcome {
    Paired { partner: UserId },
    Queued,
    AlreadyPaired,
    AlreadyWaiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    WasPaired { partner: UserId },
    WasWaiting,
    Idle,
}

/// Who is waiting and who is chatting with whom.
///
/// The queue and the pairing map are updated together, so they live behind
/// one mutex; no lock is ever held across a network call.
pub struct PairingRegistry {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    waiting: VecDeque<UserId>,
    // symmetric: active[a] == b implies active[b] == a
    active: HashMap<UserId, UserId>,
}

impl PairingRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Match `user` with the oldest waiter, or queue them if nobody is waiting.
    pub fn request_pairing(&self, user: UserId) -> PairingOutcome {
        let mut inner = self.inner.lock().unwrap();

        if inner.active.contains_key(&user) {
            return PairingOutcome::AlreadyPaired;
        }
        if inner.waiting.contains(&user) {
            return PairingOutcome::AlreadyWaiting;
        }

        match inner.waiting.pop_front() {
            Some(partner) => {
                inner.active.insert(user, partner);
                inner.active.insert(partner, user);
                PairingOutcome::Paired { partner }
            }
            None => {
                inner.waiting.push_back(user);
                PairingOutcome::Queued
            }
        }
    }

    /// Dissolve `user`'s pairing, or drop them from the queue.
    /// Unknown users are a no-op.
    pub fn leave(&self, user: UserId) -> LeaveOutcome {
        let mut inner = self.inner.lock().unwrap();

        if let Some(partner) = inner.active.remove(&user) {
            inner.active.remove(&partner);
            return LeaveOutcome::WasPaired { partner };
        }

        if let Some(pos) = inner.waiting.iter().position(|&w| w == user) {
            inner.waiting.remove(pos);
            return LeaveOutcome::WasWaiting;
        }

        LeaveOutcome::Idle
    }

    pub fn partner_of(&self, user: UserId) -> Option<UserId> {
        self.inner.lock().unwrap().active.get(&user).copied()
    }
}

impl Default for PairingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
