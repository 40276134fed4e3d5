//! Cancellable delayed tasks on a virtual clock.
//!
//! The plugin owns one `Scheduler`. Time only moves when the owner calls
//! [`Scheduler::pop_due`] / [`Scheduler::advance_to`], which keeps debounce
//! and batch behaviour reproducible in tests.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// 防抖後的重新整理
    Refresh,
    /// 分批載入的下一批
    InstallBatch,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TaskId,
    due: Duration,
    kind: TaskKind,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, kind: TaskKind) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            due: self.now + delay,
            kind,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn cancel_kind(&mut self, kind: TaskKind) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.kind != kind);
        before - self.tasks.len()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// 距離最早一個任務到期還有多久；沒有任務時為 `None`。
    pub fn time_until_next(&self) -> Option<Duration> {
        self.tasks
            .iter()
            .map(|task| task.due.saturating_sub(self.now))
            .min()
    }

    /// Removes and returns the earliest task due at or before `deadline`,
    /// moving the clock to that task's due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<TaskKind> {
        let (index, _) = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= deadline)
            .min_by_key(|(_, task)| (task.due, task.id.0))?;

        let task = self.tasks.remove(index);
        if task.due > self.now {
            self.now = task.due;
        }
        Some(task.kind)
    }

    pub fn advance_to(&mut self, deadline: Duration) {
        if deadline > self.now {
            self.now = deadline;
        }
    }
}
