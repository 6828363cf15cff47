pub mod audit;
pub mod facts;

pub use audit::{Decision, Step};
pub use facts::{FactsEmitter, LogFacts, NullFacts};
