//! Storage engine traits.

mod engine;

pub use engine::{Connector, EngineConnection, EngineFailure, FailureKind};
