use std::{fs::File, io::BufReader, path::Path};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  #[serde(default = "default_stage_width")]
  pub stage_width: u32,
  #[serde(default = "default_stage_height")]
  pub stage_height: u32,
  #[serde(default = "default_spawn_x")]
  pub spawn_x: f64,
  #[serde(default = "default_spawn_y")]
  pub spawn_y: f64,
  /// Pacing between two plain commands.
  #[serde(default = "default_step_delay")]
  pub step_delay_ms: u64,
  /// Glide frames per second of glide duration.
  #[serde(default = "default_frame_rate")]
  pub frame_rate: u32,
  #[serde(default = "default_frame_interval")]
  pub frame_interval_ms: u64,
  #[serde(default = "default_loop_entry_delay")]
  pub loop_entry_delay_ms: u64,
  #[serde(default = "default_loop_iteration_gap")]
  pub loop_iteration_gap_ms: u64,
  #[serde(default = "default_block_base_offset")]
  pub block_base_offset: f64,
  #[serde(default = "default_block_height")]
  pub block_height: f64,
  #[serde(default = "default_block_spacing")]
  pub block_spacing: f64,
  #[serde(default)]
  pub run_limit_ms: Option<u64>,
}

fn default_stage_width() -> u32 {
  600
}

fn default_stage_height() -> u32 {
  400
}

fn default_spawn_x() -> f64 {
  300.
}

fn default_spawn_y() -> f64 {
  200.
}

fn default_step_delay() -> u64 {
  300
}

fn default_frame_rate() -> u32 {
  30
}

fn default_frame_interval() -> u64 {
  33
}

fn default_loop_entry_delay() -> u64 {
  300
}

fn default_loop_iteration_gap() -> u64 {
  500
}

fn default_block_base_offset() -> f64 {
  10.
}

fn default_block_height() -> f64 {
  40.
}

fn default_block_spacing() -> f64 {
  10.
}

impl Default for Config {
  fn default() -> Self {
    Config {
      stage_width: default_stage_width(),
      stage_height: default_stage_height(),
      spawn_x: default_spawn_x(),
      spawn_y: default_spawn_y(),
      step_delay_ms: default_step_delay(),
      frame_rate: default_frame_rate(),
      frame_interval_ms: default_frame_interval(),
      loop_entry_delay_ms: default_loop_entry_delay(),
      loop_iteration_gap_ms: default_loop_iteration_gap(),
      block_base_offset: default_block_base_offset(),
      block_height: default_block_height(),
      block_spacing: default_block_spacing(),
      run_limit_ms: None,
    }
  }
}

impl Config {
  pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
  }

  /// Like [`Config::load`], but a missing file just means defaults.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
      Config::load(path)
    } else {
      Ok(Config::default())
    }
  }

  /// Vertical distance between two stacked blocks in the script area.
  pub fn block_pitch(&self) -> f64 {
    self.block_height + self.block_spacing
  }
}
