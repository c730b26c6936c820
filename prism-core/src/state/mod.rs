//! Panel lifecycle state machine
//!
//! A panel's permitted operations are a function of its lifecycle state.
//! The machine is explicit, finite and deterministic; unknown
//! (state, event) pairs leave the state unchanged.

pub mod events;
pub mod machine;

pub use events::PanelEvent;
pub use machine::PanelState;
