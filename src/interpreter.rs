use derivative::Derivative;
use log::{debug, trace, warn};

use crate::{
  actor::{Actor, ActorState, Glide},
  block::{Block, Command},
  config::Config,
  error::EditError,
  observer::{Observer, RunState},
  scheduler::{Scheduler, TaskId},
  script::{Branch, BranchKind, Loop, Node, Script},
  script_area::ScriptArea,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
  Step,
  GlideFrame,
}

/// A pending re-entry into the interpreter. Only honoured if the run that
/// scheduled it is still the current one.
#[derive(Debug, Clone, Copy)]
pub struct Continuation {
  generation: u64,
  action: Action,
}

/// Runs the script area's blocks against a single actor.
///
/// All waiting goes through a virtual-clock [`Scheduler`]; the owner drives
/// time with [`Interpreter::advance`]. At most one continuation of the
/// current run is pending at any moment, which is what keeps actor effects
/// in strict program order.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Interpreter {
  config: Config,
  actor: Actor,
  area: ScriptArea,
  scheduler: Scheduler<Continuation>,
  state: RunState,
  // Bumped by stop(); continuations from older generations are dropped.
  generation: u64,
  branches: Vec<Branch>,
  glide: Option<Glide>,
  pending: Option<TaskId>,
  #[derivative(Debug = "ignore")]
  observer: Box<dyn Observer>,
}

impl Interpreter {
  pub fn new(config: Config) -> Interpreter {
    Interpreter::with_observer(config, Box::new(()))
  }

  pub fn with_observer(config: Config, observer: Box<dyn Observer>) -> Interpreter {
    Interpreter {
      actor: Actor::new(config.spawn_x, config.spawn_y),
      area: ScriptArea::new(&config),
      scheduler: Scheduler::new(),
      state: RunState::Idle,
      generation: 0,
      branches: Vec::new(),
      glide: None,
      pending: None,
      observer,
      config,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn actor_state(&self) -> ActorState {
    self.actor.state()
  }

  pub fn state(&self) -> RunState {
    self.state
  }

  pub fn is_running(&self) -> bool {
    self.state == RunState::Running
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Virtual time in milliseconds.
  pub fn now(&self) -> u64 {
    self.scheduler.now()
  }

  pub fn blocks(&self) -> &[Block] {
    self.area.blocks()
  }

  pub fn snapshot(&self) -> Vec<Command> {
    self.area.snapshot()
  }

  fn check_editable(&self) -> Result<(), EditError> {
    if self.is_running() {
      warn!("rejected script edit during a run");
      Err(EditError::Running)
    } else {
      Ok(())
    }
  }

  pub fn append(&mut self, command: Command) -> Result<usize, EditError> {
    self.check_editable()?;
    Ok(self.area.append(command))
  }

  pub fn remove(&mut self, index: usize) -> Result<Block, EditError> {
    self.check_editable()?;
    let block = self.area.remove(index)?;
    self.observer.block_removed(&block);
    Ok(block)
  }

  pub fn drag(&mut self, index: usize, y: f64) -> Result<(), EditError> {
    self.check_editable()?;
    self.area.drag(index, y)
  }

  pub fn edit(&mut self, index: usize, command: Command) -> Result<(), EditError> {
    self.check_editable()?;
    let block = self.area.edit(index, command)?;
    self.observer.block_edited(index, block);
    Ok(())
  }

  /// Starts the script from the top. Does nothing if a run is already in
  /// progress.
  pub fn run(&mut self) {
    if self.is_running() {
      debug!("run requested while already running");
      return;
    }
    self.actor.reset();
    self.actor_changed();
    let script = Script::parse(&self.area.snapshot());
    debug!(
      "starting run {} with {} top-level nodes",
      self.generation,
      script.nodes.len()
    );
    self.branches = vec![Branch::top(&script, self.scheduler.now())];
    self.set_state(RunState::Running);
    self.step();
  }

  /// Aborts any run, resets the actor and empties the script area.
  pub fn stop(&mut self) {
    self.generation += 1;
    if let Some(id) = self.pending.take() {
      self.scheduler.cancel(id);
    }
    self.branches.clear();
    self.glide = None;
    self.actor.reset();
    self.actor_changed();
    self.area.clear();
    self.observer.script_cleared();
    self.set_state(RunState::Idle);
    debug!("stopped, now at generation {}", self.generation);
  }

  /// Moves virtual time forward by `ms`, running everything that falls due.
  pub fn advance(&mut self, ms: u64) {
    let until = self.scheduler.now().saturating_add(ms);
    while let Some((_, continuation)) = self.scheduler.pop_due(until) {
      self.resume(continuation);
    }
    self.scheduler.set_now(until);
  }

  /// Advances until the run goes idle or `limit_ms` has passed. Returns
  /// whether the run finished.
  pub fn run_until_idle(&mut self, limit_ms: u64) -> bool {
    let deadline = self.scheduler.now().saturating_add(limit_ms);
    while self.is_running() {
      match self.scheduler.next_due() {
        Some(due) if due <= deadline => self.advance(due - self.scheduler.now()),
        _ => {
          self.scheduler.set_now(deadline);
          return false;
        }
      }
    }
    true
  }

  fn set_state(&mut self, state: RunState) {
    if self.state != state {
      self.state = state;
      self.observer.run_state_changed(state);
    }
  }

  fn actor_changed(&mut self) {
    self.observer.actor_changed(self.actor.state());
  }

  fn schedule(&mut self, delay_ms: u64, action: Action) {
    let continuation = Continuation {
      generation: self.generation,
      action,
    };
    self.pending = Some(self.scheduler.schedule_after(delay_ms, continuation));
  }

  fn resume(&mut self, continuation: Continuation) {
    if continuation.generation != self.generation || !self.is_running() {
      trace!(
        "dropping stale continuation from generation {}",
        continuation.generation
      );
      return;
    }
    self.pending = None;
    // Safeguard only: stop() already retires the generation and edits are
    // refused mid-run, so a live continuation never sees an empty area.
    if self.area.is_empty() {
      self.finish();
      return;
    }
    match continuation.action {
      Action::Step => self.step(),
      Action::GlideFrame => self.glide_frame(),
    }
  }

  fn finish(&mut self) {
    self.branches.clear();
    self.glide = None;
    self.pending = None;
    self.set_state(RunState::Idle);
    debug!("run {} finished", self.generation);
  }

  fn step(&mut self) {
    let Some(branch) = self.branches.last_mut() else {
      self.finish();
      return;
    };
    if let Some(node) = branch.current().cloned() {
      branch.index += 1;
      self.dispatch(node);
      return;
    }
    let now = self.scheduler.now();
    let kind = branch.kind;
    match kind {
      BranchKind::Top => self.finish(),
      BranchKind::Repeat { remaining } if remaining > 1 => {
        branch.kind = BranchKind::Repeat {
          remaining: remaining - 1,
        };
        branch.index = 0;
        let delay = restart_delay(self.config.loop_iteration_gap_ms, branch.started, now);
        branch.started = now + delay;
        self.schedule(delay, Action::Step);
      }
      BranchKind::Repeat { .. } => {
        self.branches.pop();
        debug!("loop done");
        self.schedule(self.config.loop_iteration_gap_ms, Action::Step);
      }
      // The last body command's own delay has already run out.
      BranchKind::Forever => {
        branch.index = 0;
        let delay = restart_delay(0, branch.started, now);
        branch.started = now + delay;
        if delay == 0 {
          self.step();
        } else {
          self.schedule(delay, Action::Step);
        }
      }
    }
  }

  fn dispatch(&mut self, node: Node) {
    match node {
      Node::Simple(command) => self.execute(command),
      Node::Loop(Loop { count, body }) => {
        if body.is_empty() {
          trace!("loop without a body");
          self.schedule(self.config.step_delay_ms, Action::Step);
          return;
        }
        let now = self.scheduler.now();
        match count {
          None => {
            debug!("entering forever loop of {} nodes", body.len());
            self.branches.push(Branch {
              nodes: body,
              index: 0,
              kind: BranchKind::Forever,
              started: now,
            });
            self.step();
          }
          Some(times) if times <= 0 => {
            trace!("repeat {times} skipped");
            self.schedule(self.config.loop_entry_delay_ms, Action::Step);
          }
          Some(times) => {
            debug!("entering repeat {times} loop of {} nodes", body.len());
            let delay = self.config.loop_entry_delay_ms;
            self.branches.push(Branch {
              nodes: body,
              index: 0,
              kind: BranchKind::Repeat {
                remaining: times as u64,
              },
              started: now + delay,
            });
            self.schedule(delay, Action::Step);
          }
        }
      }
    }
  }

  fn execute(&mut self, command: Command) {
    trace!("t={} {command}", self.scheduler.now());
    let delay = match command {
      Command::Move(steps) => {
        self.actor.move_steps(steps);
        self.actor_changed();
        self.config.step_delay_ms
      }
      Command::Turn(degrees) => {
        self.actor.turn(degrees);
        self.actor_changed();
        self.config.step_delay_ms
      }
      Command::GoTo { x, y } => {
        self.actor.go_to(x, y);
        self.actor_changed();
        self.config.step_delay_ms
      }
      Command::GlideTo { seconds, x, y } => {
        self.glide = Some(self.actor.glide_to(seconds, x, y, self.config.frame_rate));
        self.glide_frame();
        return;
      }
      Command::WaitSeconds(seconds) => seconds_to_ms(seconds),
      // Loop openers never get here after parsing; a stray end marker is
      // a no-op.
      Command::RepeatStart { .. } | Command::Forever | Command::EndLoop => {
        self.config.step_delay_ms
      }
    };
    self.schedule(delay, Action::Step);
  }

  fn glide_frame(&mut self) {
    let Some(glide) = self.glide.as_mut() else {
      self.step();
      return;
    };
    let done = glide.advance(&mut self.actor);
    self.actor_changed();
    if done {
      self.glide = None;
      self.schedule(self.config.frame_interval_ms, Action::Step);
    } else {
      self.schedule(self.config.frame_interval_ms, Action::GlideFrame);
    }
  }
}

/// A loop pass that took no virtual time must not restart at the same
/// instant, or `advance` would never get past it.
fn restart_delay(delay_ms: u64, started: u64, now: u64) -> u64 {
  if delay_ms == 0 && started >= now {
    1
  } else {
    delay_ms
  }
}

fn seconds_to_ms(seconds: f64) -> u64 {
  let ms = (seconds * 1000.).round();
  if ms.is_nan() || ms <= 0. {
    0
  } else {
    ms.min(u64::MAX as f64) as u64
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn restart_floor() {
    assert_eq!(restart_delay(0, 40, 40), 1);
    assert_eq!(restart_delay(0, 10, 40), 0);
    assert_eq!(restart_delay(500, 40, 40), 500);
  }

  #[test]
  fn wait_durations() {
    assert_eq!(seconds_to_ms(1.), 1000);
    assert_eq!(seconds_to_ms(0.25), 250);
    assert_eq!(seconds_to_ms(-2.), 0);
    assert_eq!(seconds_to_ms(f64::NAN), 0);
  }

  #[test]
  fn one_continuation_at_a_time() {
    let mut interpreter = Interpreter::new(Config::default());
    interpreter.append(Command::RepeatStart { times: 2 }).unwrap();
    interpreter.append(Command::Move(1.)).unwrap();
    interpreter.append(Command::Move(1.)).unwrap();
    interpreter.append(Command::EndLoop).unwrap();
    interpreter.run();
    while interpreter.is_running() {
      assert_eq!(interpreter.scheduler.len(), 1);
      interpreter.advance(100);
    }
    assert!(interpreter.scheduler.is_empty());
  }

  #[test]
  fn stop_cancels_the_pending_step() {
    let mut interpreter = Interpreter::new(Config::default());
    interpreter.append(Command::Forever).unwrap();
    interpreter.append(Command::Turn(1.)).unwrap();
    interpreter.run();
    interpreter.advance(1000);
    assert!(interpreter.pending.is_some());
    interpreter.stop();
    assert!(interpreter.pending.is_none());
    assert!(interpreter.scheduler.is_empty());
    assert!(interpreter.branches.is_empty());
  }
}
