use std::{
  cmp::Reverse,
  collections::{BinaryHeap, HashSet},
};

/// Handle to a scheduled task, usable with [`Scheduler::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Entry<T> {
  due: u64,
  id: TaskId,
  task: T,
}

impl<T> PartialEq for Entry<T> {
  fn eq(&self, other: &Self) -> bool {
    (self.due, self.id) == (other.due, other.id)
  }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl<T> Ord for Entry<T> {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    (self.due, self.id).cmp(&(other.due, other.id))
  }
}

/// A timer queue on a virtual millisecond clock.
///
/// Nothing here sleeps: the owner moves time forward and pulls out whatever
/// became due. Tasks due at the same instant come out in the order they were
/// scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
  now: u64,
  next_id: u64,
  queue: BinaryHeap<Reverse<Entry<T>>>,
  cancelled: HashSet<TaskId>,
}

impl<T> Default for Scheduler<T> {
  fn default() -> Self {
    Scheduler {
      now: 0,
      next_id: 0,
      queue: BinaryHeap::new(),
      cancelled: HashSet::new(),
    }
  }
}

impl<T> Scheduler<T> {
  pub fn new() -> Scheduler<T> {
    Scheduler::default()
  }

  pub fn now(&self) -> u64 {
    self.now
  }

  pub fn schedule_after(&mut self, delay_ms: u64, task: T) -> TaskId {
    let id = TaskId(self.next_id);
    self.next_id += 1;
    self.queue.push(Reverse(Entry {
      due: self.now.saturating_add(delay_ms),
      id,
      task,
    }));
    id
  }

  /// Returns false if the task already fired or was cancelled before.
  pub fn cancel(&mut self, id: TaskId) -> bool {
    if self.queue.iter().any(|Reverse(entry)| entry.id == id) {
      self.cancelled.insert(id)
    } else {
      false
    }
  }

  fn drop_cancelled(&mut self) {
    while let Some(Reverse(entry)) = self.queue.peek() {
      if !self.cancelled.remove(&entry.id) {
        break;
      }
      self.queue.pop();
    }
  }

  pub fn next_due(&mut self) -> Option<u64> {
    self.drop_cancelled();
    self.queue.peek().map(|Reverse(entry)| entry.due)
  }

  /// Pops the earliest task due at or before `until`, moving the clock to
  /// its due time.
  pub fn pop_due(&mut self, until: u64) -> Option<(u64, T)> {
    match self.next_due() {
      Some(due) if due <= until => {
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some((entry.due, entry.task))
      }
      _ => None,
    }
  }

  /// Moves the clock to `time` without firing anything. Never goes back.
  pub fn set_now(&mut self, time: u64) {
    self.now = self.now.max(time);
  }

  pub fn len(&self) -> usize {
    self.queue.len() - self.cancelled.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
