// Core data models for Ripl
// These structs represent the domain entities

pub mod candidate;
pub mod stage;

pub use candidate::*;
pub use stage::*;
