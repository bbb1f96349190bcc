//! Assistant persona.
//!
//! The persona is the fixed system text prepended to every prompt.

mod model;

pub use model::Persona;
