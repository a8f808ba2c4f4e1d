use std::rc::Rc;

use crate::block::Command;

/// A run's program: the flat block list folded into a tree once, before
/// anything executes.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
  pub nodes: Rc<[Node]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
  Simple(Command),
  Loop(Loop),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
  /// `None` repeats forever.
  pub count: Option<i64>,
  pub body: Rc<[Node]>,
}

impl Script {
  /// An end marker closes the innermost open loop. Loops still open at the
  /// end of the list close there; an end marker with nothing to close is
  /// kept as a plain node.
  pub fn parse(commands: &[Command]) -> Script {
    let mut open: Vec<(Option<i64>, Vec<Node>)> = Vec::new();
    let mut top: Vec<Node> = Vec::new();
    for command in commands {
      match command {
        Command::RepeatStart { times } => open.push((Some(*times), Vec::new())),
        Command::Forever => open.push((None, Vec::new())),
        Command::EndLoop => match open.pop() {
          Some((count, body)) => innermost(&mut open, &mut top).push(Node::Loop(Loop {
            count,
            body: body.into(),
          })),
          None => top.push(Node::Simple(Command::EndLoop)),
        },
        command => innermost(&mut open, &mut top).push(Node::Simple(command.clone())),
      }
    }
    while let Some((count, body)) = open.pop() {
      innermost(&mut open, &mut top).push(Node::Loop(Loop {
        count,
        body: body.into(),
      }));
    }
    Script { nodes: top.into() }
  }
}

fn innermost<'a>(
  open: &'a mut Vec<(Option<i64>, Vec<Node>)>,
  top: &'a mut Vec<Node>,
) -> &'a mut Vec<Node> {
  match open.last_mut() {
    Some((_, body)) => body,
    None => top,
  }
}

/// Where a run currently is inside one level of the tree.
#[derive(Debug, Clone)]
pub struct Branch {
  pub nodes: Rc<[Node]>,
  /// Next node to dispatch.
  pub index: usize,
  pub kind: BranchKind,
  /// Virtual time the current pass over `nodes` began.
  pub started: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
  Top,
  /// Iterations left, counting the one in progress.
  Repeat { remaining: u64 },
  Forever,
}

impl Branch {
  pub fn top(script: &Script, now: u64) -> Branch {
    Branch {
      nodes: script.nodes.clone(),
      index: 0,
      kind: BranchKind::Top,
      started: now,
    }
  }

  pub fn current(&self) -> Option<&Node> {
    self.nodes.get(self.index)
  }
}
