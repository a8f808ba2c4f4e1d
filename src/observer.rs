use crate::{actor::ActorState, block::Block};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
  Idle,
  Running,
}

/// Hooks for whoever draws the script area and the stage. Every method
/// defaults to doing nothing.
pub trait Observer {
  /// Lets the editor disable edits while a run is in progress.
  fn run_state_changed(&mut self, _state: RunState) {}

  /// Called after the remaining blocks have been reflowed.
  fn block_removed(&mut self, _block: &Block) {}

  /// The block's label needs redrawing.
  fn block_edited(&mut self, _index: usize, _block: &Block) {}

  fn script_cleared(&mut self) {}

  fn actor_changed(&mut self, _state: ActorState) {}
}

impl Observer for () {}
