//! Goals (tasks) and the games that carry them

pub mod task;
pub mod game;

pub use task::{Task, TaskStatus, Section, GoalKind, ServerProgression};
pub use game::GameDefinition;
