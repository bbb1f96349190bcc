//! Inference capability boundary.
//!
//! The neural network itself lives behind [`InferenceBackend`]. This module
//! only defines what the chat core needs from it: a load step returning an
//! opaque [`ModelHandle`] and a lazy stream of text fragments.

mod backend;
mod markers;
mod params;

pub use backend::{FragmentStream, InferenceBackend, ModelHandle, ModelState};
pub use markers::{
    CONTROL_MARKERS, END_OF_TURN_MARKERS, MarkerScan, filter_control_markers, strip_control_markers,
};
pub use params::GenerationParams;
