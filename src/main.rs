use std::{
  process, thread,
  time::{Duration, Instant},
};

use log::{debug, error, info};
use pratch::{ActorState, Command, Config, EditError, Interpreter, Observer, RunState};

/// Stands in for the stage: reports every redraw it would have done.
struct StageLog;

impl Observer for StageLog {
  fn run_state_changed(&mut self, state: RunState) {
    info!("script is now {state:?}");
  }

  fn actor_changed(&mut self, state: ActorState) {
    match serde_json::to_string(&state) {
      Ok(json) => debug!("actor {json}"),
      Err(err) => error!("couldn't encode actor state: {err}"),
    }
  }
}

fn load_demo(interpreter: &mut Interpreter) -> Result<(), EditError> {
  interpreter.append(Command::GoTo { x: 250., y: 150. })?;
  interpreter.append(Command::RepeatStart { times: 4 })?;
  interpreter.append(Command::Move(100.))?;
  interpreter.append(Command::Turn(90.))?;
  interpreter.append(Command::EndLoop)?;
  interpreter.append(Command::WaitSeconds(0.5))?;
  interpreter.append(Command::GlideTo {
    seconds: 1.,
    x: 300.,
    y: 200.,
  })?;
  interpreter.append(Command::Turn(-45.))?;
  for block in interpreter.blocks() {
    info!("{:>5} | {}", block.y, block.label());
  }
  Ok(())
}

fn main() {
  pretty_env_logger::init();
  let config = match Config::load_or_default("pratch.json") {
    Ok(config) => config,
    Err(err) => {
      error!("{err}");
      process::exit(1);
    }
  };
  let mut interpreter = Interpreter::with_observer(config, Box::new(StageLog));
  let config = interpreter.config();
  info!(
    "stage is {}x{}, actor spawns at ({}, {})",
    config.stage_width, config.stage_height, config.spawn_x, config.spawn_y
  );
  let frame = Duration::from_millis(config.frame_interval_ms.max(1));
  let run_limit = config.run_limit_ms;
  if let Err(err) = load_demo(&mut interpreter) {
    error!("{err}");
    process::exit(1);
  }
  interpreter.run();
  let started = Instant::now();
  'main: loop {
    let elapsed = started.elapsed().as_millis() as u64;
    interpreter.advance(elapsed.saturating_sub(interpreter.now()));
    if !interpreter.is_running() {
      break 'main;
    }
    if run_limit.is_some_and(|limit| elapsed >= limit) {
      info!("run limit reached, stopping");
      interpreter.stop();
      break 'main;
    }
    thread::sleep(frame);
  }
  let state = interpreter.actor_state();
  info!(
    "final position ({:.1}, {:.1}) facing {:.1}",
    state.x, state.y, state.angle_degrees
  );
}
