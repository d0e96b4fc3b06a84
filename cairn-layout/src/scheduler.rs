//! Deferred read/write batching.
//!
//! Measurement must happen after new targets are attached, and position
//! writes should not interleave with reads. The engine queues that work
//! here and the host drains it once per paint: all reads, then all writes.
//! Every queued task has a `TaskHandle`; clearing a handle cancels the
//! task if it has not run yet.

/// Handle to a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Which batch a task runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Read,
    Write,
}

/// Read and write queues for one engine.
#[derive(Debug)]
pub struct FrameScheduler<T> {
    reads: Vec<(TaskHandle, T)>,
    writes: Vec<(TaskHandle, T)>,
    next_handle: u64,
}

/// Tasks taken out of the scheduler for one frame, in run order.
#[derive(Debug)]
pub struct Frame<T> {
    pub reads: Vec<(TaskHandle, T)>,
    pub writes: Vec<(TaskHandle, T)>,
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self {
            reads: Vec::new(),
            writes: Vec::new(),
            next_handle: 1,
        }
    }

    /// Queue a task for the given phase.
    pub fn schedule(&mut self, phase: Phase, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        match phase {
            Phase::Read => self.reads.push((handle, task)),
            Phase::Write => self.writes.push((handle, task)),
        }
        handle
    }

    /// Cancel a queued task. Returns false if it already ran or was cleared.
    pub fn clear(&mut self, handle: TaskHandle) -> bool {
        for queue in [&mut self.reads, &mut self.writes] {
            if let Some(pos) = queue.iter().position(|(h, _)| *h == handle) {
                queue.remove(pos);
                return true;
            }
        }
        false
    }

    /// Take everything queued so far. Tasks scheduled while the returned
    /// frame runs land in the next frame.
    pub fn take_frame(&mut self) -> Frame<T> {
        Frame {
            reads: std::mem::take(&mut self.reads),
            writes: std::mem::take(&mut self.writes),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reads.len() + self.writes.len()
    }

}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// At most one pending task for one purpose.
///
/// Scheduling through the slot cancels whatever the slot still holds, so
/// only the latest request ever runs.
#[derive(Debug, Default)]
pub struct PendingSlot(Option<TaskHandle>);

impl PendingSlot {
    /// Schedule `task`, cancelling the previous one. Returns true if a
    /// pending task was replaced.
    pub fn replace<T>(&mut self, scheduler: &mut FrameScheduler<T>, phase: Phase, task: T) -> bool {
        let replaced = self.0.take().is_some_and(|old| scheduler.clear(old));
        self.0 = Some(scheduler.schedule(phase, task));
        replaced
    }

    /// Forget `handle` once it has run.
    pub fn settle(&mut self, handle: TaskHandle) {
        if self.0 == Some(handle) {
            self.0 = None;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    pub fn cancel<T>(&mut self, scheduler: &mut FrameScheduler<T>) {
        if let Some(handle) = self.0.take() {
            scheduler.clear(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_writes_split() {
        let mut scheduler = FrameScheduler::new();
        scheduler.schedule(Phase::Write, "w1");
        scheduler.schedule(Phase::Read, "r1");
        scheduler.schedule(Phase::Read, "r2");

        let frame = scheduler.take_frame();
        let reads: Vec<_> = frame.reads.iter().map(|(_, t)| *t).collect();
        let writes: Vec<_> = frame.writes.iter().map(|(_, t)| *t).collect();
        assert_eq!(reads, vec!["r1", "r2"]);
        assert_eq!(writes, vec!["w1"]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_clear_cancels_pending() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.schedule(Phase::Read, 1);
        let b = scheduler.schedule(Phase::Write, 2);

        assert!(scheduler.clear(a));
        assert!(!scheduler.clear(a));
        assert_eq!(scheduler.len(), 1);

        scheduler.take_frame();
        assert!(!scheduler.clear(b));
    }

    #[test]
    fn test_slot_keeps_only_latest() {
        let mut scheduler = FrameScheduler::new();
        let mut slot = PendingSlot::default();

        assert!(!slot.replace(&mut scheduler, Phase::Write, "first"));
        assert!(slot.replace(&mut scheduler, Phase::Write, "second"));
        assert!(slot.replace(&mut scheduler, Phase::Write, "third"));

        let frame = scheduler.take_frame();
        assert_eq!(frame.writes.len(), 1);
        let (handle, task) = frame.writes[0];
        assert_eq!(task, "third");

        slot.settle(handle);
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_slot_after_run_does_not_report_replace() {
        let mut scheduler = FrameScheduler::new();
        let mut slot = PendingSlot::default();
        slot.replace(&mut scheduler, Phase::Read, 1);
        scheduler.take_frame();

        // Stale handle: nothing left to cancel.
        assert!(!slot.replace(&mut scheduler, Phase::Read, 2));
    }
}
