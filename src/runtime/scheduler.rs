use crate::runtime::event::ControlEvent;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub enum SchedulerCommand {
    /// Replace any pending task under `key`; only the newest survives.
    Debounce {
        key: String,
        delay: Duration,
        event: ControlEvent,
    },
    /// Invalidate every pending task under `key`.
    Cancel { key: String },
}

#[derive(Debug, Clone)]
struct Guard {
    key: String,
    version: u64,
}

#[derive(Debug, Clone)]
struct DelayedTask {
    due_at: Instant,
    guard: Guard,
    event: ControlEvent,
}

/// Instance-owned delay queue. Each controller carries its own scheduler,
/// so two sessions can never interfere through a shared timer, and dropping
/// the owner drops every pending task with it.
#[derive(Debug, Default)]
pub struct Scheduler {
    delayed: Vec<DelayedTask>,
    key_versions: HashMap<String, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, command: SchedulerCommand, now: Instant) {
        match command {
            SchedulerCommand::Debounce { key, delay, event } => {
                let version = self.bump_version(&key);
                self.delayed.push(DelayedTask {
                    due_at: now + delay,
                    guard: Guard { key, version },
                    event,
                });
            }
            SchedulerCommand::Cancel { key } => {
                self.bump_version(&key);
            }
        }
    }

    pub fn drain_ready(&mut self, now: Instant) -> Vec<ControlEvent> {
        let mut ready = Vec::new();
        let mut idx = 0usize;
        while idx < self.delayed.len() {
            if self.delayed[idx].due_at <= now {
                let task = self.delayed.swap_remove(idx);
                if self.task_is_valid(&task) {
                    ready.push(task.event);
                }
            } else {
                idx += 1;
            }
        }
        ready
    }

    /// How long the host may sleep before the next task comes due.
    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        let mut next = default_timeout;

        for task in &self.delayed {
            let due_in = task.due_at.saturating_duration_since(now);
            if due_in < next {
                next = due_in;
            }
        }

        next
    }

    fn task_is_valid(&self, task: &DelayedTask) -> bool {
        let current = *self.key_versions.get(&task.guard.key).unwrap_or(&0);
        current == task.guard.version
    }

    fn bump_version(&mut self, key: &str) -> u64 {
        let entry = self.key_versions.entry(key.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }
}

#[cfg(test)]
mod tests {
    use super::{Scheduler, SchedulerCommand};
    use crate::runtime::event::ControlEvent;
    use std::time::{Duration, Instant};

    fn refresh(keyword: &str) -> ControlEvent {
        ControlEvent::RefreshSuggestions {
            keyword: keyword.to_string(),
        }
    }

    fn debounce(keyword: &str, millis: u64) -> SchedulerCommand {
        SchedulerCommand::Debounce {
            key: "refresh".to_string(),
            delay: Duration::from_millis(millis),
            event: refresh(keyword),
        }
    }

    #[test]
    fn debounce_keeps_only_the_newest_task() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(debounce("m", 200), t0);
        scheduler.schedule(debounce("my", 200), t0 + Duration::from_millis(50));
        scheduler.schedule(debounce("mya", 200), t0 + Duration::from_millis(100));

        let ready = scheduler.drain_ready(t0 + Duration::from_secs(1));
        assert_eq!(ready.len(), 1);
        let ControlEvent::RefreshSuggestions { keyword } = &ready[0];
        assert_eq!(keyword.as_str(), "mya");
    }

    #[test]
    fn nothing_is_ready_before_the_delay_elapses() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(debounce("m", 200), t0);

        assert!(scheduler.drain_ready(t0 + Duration::from_millis(199)).is_empty());
        assert_eq!(scheduler.drain_ready(t0 + Duration::from_millis(200)).len(), 1);
    }

    #[test]
    fn cancel_invalidates_pending_tasks() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(debounce("m", 200), t0);
        scheduler.schedule(
            SchedulerCommand::Cancel {
                key: "refresh".to_string(),
            },
            t0 + Duration::from_millis(10),
        );

        assert!(scheduler.drain_ready(t0 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn poll_timeout_reports_the_earliest_due_task() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        assert_eq!(
            scheduler.poll_timeout(t0, Duration::from_millis(120)),
            Duration::from_millis(120)
        );

        scheduler.schedule(debounce("m", 40), t0);
        assert_eq!(
            scheduler.poll_timeout(t0, Duration::from_millis(120)),
            Duration::from_millis(40)
        );
        assert_eq!(
            scheduler.poll_timeout(t0 + Duration::from_millis(60), Duration::from_millis(120)),
            Duration::ZERO
        );
    }
}
