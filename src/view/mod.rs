//! Per-viewer projections of session state.

mod projection;

pub use projection::{
    project, DecisionView, ObjectView, ParticipantView, SessionView, Viewer, ZoneView,
};
