use std::f64::consts::PI;

use serde::Serialize;

/// What a renderer needs to redraw the actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorState {
  pub x: f64,
  pub y: f64,
  pub angle_degrees: f64,
}

#[derive(Debug, Clone)]
pub struct Actor {
  spawn_x: f64,
  spawn_y: f64,
  pub x: f64,
  pub y: f64,
  // Always in [0, 360).
  direction: f64,
}

impl Actor {
  pub fn new(spawn_x: f64, spawn_y: f64) -> Actor {
    Actor {
      spawn_x,
      spawn_y,
      x: spawn_x,
      y: spawn_y,
      direction: 0.,
    }
  }

  pub fn direction(&self) -> f64 {
    self.direction
  }

  pub fn state(&self) -> ActorState {
    ActorState {
      x: self.x,
      y: self.y,
      angle_degrees: self.direction,
    }
  }

  pub fn move_steps(&mut self, steps: f64) {
    let radians = degrees_to_radians(self.direction);
    self.x += steps * radians.cos();
    self.y += steps * radians.sin();
  }

  pub fn turn(&mut self, degrees: f64) {
    self.direction = normalize_degrees(self.direction + degrees);
  }

  pub fn go_to(&mut self, x: f64, y: f64) {
    self.x = x;
    self.y = y;
  }

  pub fn reset(&mut self) {
    self.x = self.spawn_x;
    self.y = self.spawn_y;
    self.direction = 0.;
  }

  /// Starts a glide towards `(x, y)`. Nothing moves until the first
  /// [`Glide::advance`].
  pub fn glide_to(&self, seconds: f64, x: f64, y: f64, frame_rate: u32) -> Glide {
    let steps = glide_steps(seconds, frame_rate);
    Glide {
      target_x: x,
      target_y: y,
      step_dx: (x - self.x) / steps as f64,
      step_dy: (y - self.y) / steps as f64,
      remaining: steps,
    }
  }
}

/// An in-flight glide, one frame per call to [`Glide::advance`].
#[derive(Debug, Clone)]
pub struct Glide {
  target_x: f64,
  target_y: f64,
  step_dx: f64,
  step_dy: f64,
  remaining: u32,
}

impl Glide {
  /// Applies one frame and reports whether the glide is over.
  pub fn advance(&mut self, actor: &mut Actor) -> bool {
    if self.remaining == 0 {
      return true;
    }
    self.remaining -= 1;
    if self.remaining == 0 {
      // Land exactly, whatever the accumulated rounding.
      actor.go_to(self.target_x, self.target_y);
      true
    } else {
      actor.x += self.step_dx;
      actor.y += self.step_dy;
      false
    }
  }
}

/// Number of frames a glide of `seconds` takes, never less than one.
pub fn glide_steps(seconds: f64, frame_rate: u32) -> u32 {
  let steps = (seconds * frame_rate as f64).round();
  if steps.is_nan() || steps < 1. {
    1
  } else {
    steps.min(u32::MAX as f64) as u32
  }
}

fn degrees_to_radians(degrees: f64) -> f64 {
  (PI * degrees) / 180.
}

fn normalize_degrees(degrees: f64) -> f64 {
  let angle = degrees.rem_euclid(360.);
  // rem_euclid rounds tiny negatives up to 360.
  if angle >= 360. || angle.is_nan() {
    0.
  } else {
    angle
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn move_follows_direction() {
    let mut actor = Actor::new(300., 200.);
    actor.move_steps(50.);
    assert!(close(actor.x, 350.) && close(actor.y, 200.));
    actor.turn(90.);
    actor.move_steps(50.);
    assert!(close(actor.x, 350.) && close(actor.y, 250.));
    actor.turn(90.);
    actor.move_steps(-10.);
    assert!(close(actor.x, 360.) && close(actor.y, 250.));
  }

  #[test]
  fn turn_stays_in_range() {
    let mut actor = Actor::new(0., 0.);
    for delta in [-1e-20, -90., 720., 359.999, -3600.5, 1e12, 45.] {
      actor.turn(delta);
      let angle = actor.direction();
      assert!((0. ..360.).contains(&angle), "{delta} gave {angle}");
    }
    actor.reset();
    actor.turn(-90.);
    assert_eq!(actor.direction(), 270.);
    actor.turn(450.);
    assert_eq!(actor.direction(), 0.);
  }

  #[test]
  fn reset_restores_spawn() {
    let mut actor = Actor::new(12., -7.);
    actor.turn(33.);
    actor.move_steps(100.);
    actor.go_to(-500., 900.);
    actor.reset();
    assert_eq!(
      actor.state(),
      ActorState {
        x: 12.,
        y: -7.,
        angle_degrees: 0.
      }
    );
  }

  #[test]
  fn go_to_keeps_direction() {
    let mut actor = Actor::new(0., 0.);
    actor.turn(10.);
    actor.go_to(5., 6.);
    assert_eq!((actor.x, actor.y, actor.direction()), (5., 6., 10.));
  }

  #[test]
  fn glide_step_counts() {
    assert_eq!(glide_steps(1., 30), 30);
    assert_eq!(glide_steps(0.5, 30), 15);
    assert_eq!(glide_steps(0.01, 30), 1);
    assert_eq!(glide_steps(0., 30), 1);
    assert_eq!(glide_steps(-3., 30), 1);
    assert_eq!(glide_steps(f64::NAN, 30), 1);
  }

  #[test]
  fn glide_lands_exactly() {
    let mut actor = Actor::new(0., 0.);
    let mut glide = actor.glide_to(1., 10., 0.1, 30);
    let mut frames = 0;
    let mut last_x = actor.x;
    while !glide.advance(&mut actor) {
      frames += 1;
      assert!(actor.x > last_x);
      last_x = actor.x;
    }
    assert_eq!(frames + 1, 30);
    assert_eq!((actor.x, actor.y), (10., 0.1));
    assert!(glide.advance(&mut actor));
    assert_eq!((actor.x, actor.y), (10., 0.1));
  }

  #[test]
  fn zero_second_glide_moves_once() {
    let mut actor = Actor::new(3., 4.);
    let mut glide = actor.glide_to(0., -1., -2., 30);
    assert!(glide.advance(&mut actor));
    assert_eq!((actor.x, actor.y), (-1., -2.));
  }
}
