//! Domain model (graph, entities, task ids and states).

pub mod entity;
pub mod graph;
pub mod ids;
pub mod task;
pub mod vocab;

pub use entity::Entity;
pub use graph::{Graph, Literal, Term, Triple};
pub use ids::{MalformedTaskId, TaskId};
pub use task::{PollResult, TaskFailure, TaskOutcome, TaskState};
