pub mod actor;
pub mod block;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod observer;
pub mod scheduler;
pub mod script;
pub mod script_area;

pub use actor::{Actor, ActorState};
pub use block::{Block, Command, CommandKind};
pub use config::Config;
pub use error::{ConfigError, EditError};
pub use interpreter::Interpreter;
pub use observer::{Observer, RunState};
