use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
  Move,
  Turn,
  GoTo,
  GlideTo,
  RepeatStart,
  Forever,
  EndLoop,
  WaitSeconds,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  Move(f64),
  Turn(f64),
  GoTo { x: f64, y: f64 },
  GlideTo { seconds: f64, x: f64, y: f64 },
  RepeatStart { times: i64 },
  Forever,
  EndLoop,
  WaitSeconds(f64),
}

impl Command {
  pub fn kind(&self) -> CommandKind {
    match self {
      Command::Move(_) => CommandKind::Move,
      Command::Turn(_) => CommandKind::Turn,
      Command::GoTo { .. } => CommandKind::GoTo,
      Command::GlideTo { .. } => CommandKind::GlideTo,
      Command::RepeatStart { .. } => CommandKind::RepeatStart,
      Command::Forever => CommandKind::Forever,
      Command::EndLoop => CommandKind::EndLoop,
      Command::WaitSeconds(_) => CommandKind::WaitSeconds,
    }
  }

  /// The payload a freshly dropped block of this kind starts with.
  pub fn palette_default(kind: CommandKind) -> Command {
    match kind {
      CommandKind::Move => Command::Move(10.),
      CommandKind::Turn => Command::Turn(15.),
      CommandKind::GoTo => Command::GoTo { x: 0., y: 0. },
      CommandKind::GlideTo => Command::GlideTo {
        seconds: 1.,
        x: 0.,
        y: 0.,
      },
      CommandKind::RepeatStart => Command::RepeatStart { times: 10 },
      CommandKind::Forever => Command::Forever,
      CommandKind::EndLoop => Command::EndLoop,
      CommandKind::WaitSeconds => Command::WaitSeconds(1.),
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Command::Move(steps) => write!(f, "move {steps} steps"),
      Command::Turn(degrees) if *degrees >= 0. => write!(f, "turn right {degrees} degrees"),
      Command::Turn(degrees) => write!(f, "turn left {} degrees", degrees.abs()),
      Command::GoTo { x, y } => write!(f, "go to x: {x} y: {y}"),
      Command::GlideTo { seconds, x, y } => {
        write!(f, "glide {seconds} secs to x: {x} y: {y}")
      }
      Command::RepeatStart { times } => write!(f, "repeat {times} times"),
      Command::Forever => write!(f, "forever"),
      Command::EndLoop => write!(f, "end loop"),
      Command::WaitSeconds(seconds) if *seconds == 1. => write!(f, "wait 1 second"),
      Command::WaitSeconds(seconds) => write!(f, "wait {seconds} seconds"),
    }
  }
}

/// A command placed in the script area. `y` is its vertical slot, which is
/// also its place in program order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
  pub command: Command,
  pub y: f64,
}

impl Block {
  pub fn label(&self) -> String {
    self.command.to_string()
  }
}
