//! Delayed one-shot actions
//!
//! Regeneration, station recharge and slow-field recovery fire after a delay
//! measured on the engine clock. Actions carry the generation of the
//! collection they target so a callback that outlives its collection is
//! dropped instead of touching the replacement.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Replace the energy batch `batch` if it is still current
    RegenerateEnergy { batch: u32 },
    /// Replace the power-up set `set` if it is still current
    RegeneratePowerUps { set: u32 },
    /// Refill station `index` of station set `set`
    RechargeStation { set: u32, index: usize },
    /// End a slow-field window
    RestoreSpeed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduled {
    pub due_ms: u64,
    pub action: ScheduledAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    queue: Vec<Scheduled>,
}

impl Scheduler {
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: ScheduledAction) {
        self.queue.push(Scheduled {
            due_ms: now_ms.saturating_add(delay_ms),
            action,
        });
    }

    /// Remove and return every action due at `now_ms`, earliest first
    /// (ties keep scheduling order)
    pub fn take_due(&mut self, now_ms: u64) -> Vec<ScheduledAction> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.queue.retain(|s| {
            if s.due_ms <= now_ms {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| s.due_ms);
        due.into_iter().map(|s| s.action).collect()
    }

    pub fn contains(&self, action: ScheduledAction) -> bool {
        self.queue.iter().any(|s| s.action == action)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
