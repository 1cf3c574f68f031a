//! ZenKit Animation
//!
//! Timing primitives for ZenKit widgets:
//!
//! - **Scheduler**: animation-frame queue and one-shot timers over a virtual
//!   clock driven by the host
//! - **Transitions**: the `Hidden -> Showing -> Shown -> Hiding` state machine
//!   with tokens that reject stale completions

pub mod scheduler;
pub mod transition;

pub use scheduler::{Scheduler, TimerId};
pub use transition::{transition_events, TransitionState, TransitionToken, Visibility};
