use crate::{
  block::{Block, Command},
  config::Config,
  error::EditError,
};

/// The blocks dropped into the script area, kept in vertical order.
///
/// A block's position in the column is its position in the program, so
/// every structural change ends with a reflow that stacks the blocks back
/// onto evenly spaced slots.
#[derive(Debug, Clone)]
pub struct ScriptArea {
  blocks: Vec<Block>,
  base_offset: f64,
  pitch: f64,
}

impl ScriptArea {
  pub fn new(config: &Config) -> ScriptArea {
    ScriptArea {
      blocks: Vec::new(),
      base_offset: config.block_base_offset,
      pitch: config.block_pitch(),
    }
  }

  pub fn blocks(&self) -> &[Block] {
    &self.blocks
  }

  pub fn len(&self) -> usize {
    self.blocks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  fn slot(&self, index: usize) -> f64 {
    self.base_offset + index as f64 * self.pitch
  }

  fn check(&self, index: usize) -> Result<(), EditError> {
    if index < self.blocks.len() {
      Ok(())
    } else {
      Err(EditError::NoSuchBlock {
        index,
        len: self.blocks.len(),
      })
    }
  }

  /// Stacks a new block under the last one and returns its index.
  pub fn append(&mut self, command: Command) -> usize {
    let y = self.slot(self.blocks.len());
    self.blocks.push(Block { command, y });
    self.blocks.len() - 1
  }

  pub fn remove(&mut self, index: usize) -> Result<Block, EditError> {
    self.check(index)?;
    let block = self.blocks.remove(index);
    self.reflow();
    Ok(block)
  }

  /// Drops block `index` at height `y`; it lands between its new neighbours.
  pub fn drag(&mut self, index: usize, y: f64) -> Result<(), EditError> {
    self.check(index)?;
    self.blocks[index].y = y;
    self.reflow();
    Ok(())
  }

  pub fn edit(&mut self, index: usize, command: Command) -> Result<&Block, EditError> {
    self.check(index)?;
    let block = &mut self.blocks[index];
    block.command = command;
    Ok(block)
  }

  pub fn reflow(&mut self) {
    self.blocks.sort_by(|a, b| a.y.total_cmp(&b.y));
    for index in 0..self.blocks.len() {
      self.blocks[index].y = self.slot(index);
    }
  }

  /// Commands in program order, top to bottom.
  pub fn snapshot(&self) -> Vec<Command> {
    let mut blocks: Vec<&Block> = self.blocks.iter().collect();
    blocks.sort_by(|a, b| a.y.total_cmp(&b.y));
    blocks.into_iter().map(|block| block.command.clone()).collect()
  }

  pub fn clear(&mut self) {
    self.blocks.clear();
  }
}
