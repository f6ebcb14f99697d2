//! When a registry change turns into a recompute.

/// Decides whether the manager flushes right away or waits for the commit
/// boundary.
pub trait Scheduler {
    /// A registry mutation changed something. Return `true` to flush now.
    fn on_change(&mut self) -> bool;
    /// The host finished a batch of mutations. Return `true` to flush now.
    fn on_commit(&mut self) -> bool;
}

/// Flush on every change. Deterministic; used for server capture.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn on_change(&mut self) -> bool {
        true
    }

    fn on_commit(&mut self) -> bool {
        false
    }
}

/// Coalesce changes and flush once per commit.
#[derive(Clone, Copy, Debug, Default)]
pub struct Batched {
    dirty: bool,
}

impl Batched {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for Batched {
    fn on_change(&mut self) -> bool {
        self.dirty = true;
        false
    }

    fn on_commit(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batched_flushes_once_per_dirty_commit() {
        let mut scheduler = Batched::new();
        assert!(!scheduler.on_commit());
        assert!(!scheduler.on_change());
        assert!(!scheduler.on_change());
        assert!(scheduler.on_commit());
        assert!(!scheduler.on_commit());
    }

    #[test]
    fn immediate_flushes_every_change() {
        let mut scheduler = Immediate;
        assert!(scheduler.on_change());
        assert!(!scheduler.on_commit());
    }
}
