//! Show/hide transition state machine
//!
//! Every show/hide-capable widget shares one shape:
//!
//! ```text
//! Hidden --SHOW--> Showing --COMPLETE--> Shown --HIDE--> Hiding --COMPLETE--> Hidden
//! ```
//!
//! `show` is only accepted from `Hidden` and `hide` only from `Shown`, so a
//! repeated call, or the opposite call while a transition is pending, is a
//! no-op. Each accepted transition issues a [`TransitionToken`]; completion
//! (transition-finished signal or fallback timer, whichever comes first) is
//! only honored for the token that is currently active, so the slower of the
//! two completion sources is ignored.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Event types for the visibility state machine
pub mod transition_events {
    /// Begin showing (Hidden -> Showing)
    pub const SHOW: u32 = 1;
    /// Begin hiding (Shown -> Hiding)
    pub const HIDE: u32 = 2;
    /// Pending transition finished (Showing -> Shown, Hiding -> Hidden)
    pub const COMPLETE: u32 = 3;
}

/// Visibility of a show/hide widget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Hidden,
    Showing,
    Shown,
    Hiding,
}

impl Visibility {
    /// Next state for `event`, or `None` when the event is not accepted
    pub fn on_event(&self, event: u32) -> Option<Self> {
        use transition_events::*;
        use Visibility::*;

        match (self, event) {
            (Hidden, SHOW) => Some(Showing),
            (Showing, COMPLETE) => Some(Shown),
            (Shown, HIDE) => Some(Hiding),
            (Hiding, COMPLETE) => Some(Hidden),
            _ => None,
        }
    }

    /// Shown or on its way in or out
    pub fn is_visible(&self) -> bool {
        !matches!(self, Visibility::Hidden)
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, Visibility::Shown)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, Visibility::Showing | Visibility::Hiding)
    }
}

/// Marker for one in-flight transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionToken(u64);

impl TransitionToken {
    /// Allocate a process-unique token
    pub fn fresh() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Visibility plus the token of the transition currently in flight
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionState {
    visibility: Visibility,
    active: Option<TransitionToken>,
}

impl TransitionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State that starts settled in `Shown` (markup already carries `.show`)
    pub fn shown() -> Self {
        Self {
            visibility: Visibility::Shown,
            active: None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn active_token(&self) -> Option<TransitionToken> {
        self.active
    }

    pub fn can_show(&self) -> bool {
        self.visibility.on_event(transition_events::SHOW).is_some()
    }

    pub fn can_hide(&self) -> bool {
        self.visibility.on_event(transition_events::HIDE).is_some()
    }

    /// Enter `Showing`; `None` when not `Hidden`
    pub fn begin_show(&mut self) -> Option<TransitionToken> {
        self.begin(transition_events::SHOW)
    }

    /// Enter `Hiding`; `None` when not `Shown`
    pub fn begin_hide(&mut self) -> Option<TransitionToken> {
        self.begin(transition_events::HIDE)
    }

    fn begin(&mut self, event: u32) -> Option<TransitionToken> {
        let next = self.visibility.on_event(event)?;
        let token = TransitionToken::fresh();
        tracing::trace!("{:?} -> {:?} ({:?})", self.visibility, next, token);
        self.visibility = next;
        self.active = Some(token);
        Some(token)
    }

    /// Complete the transition identified by `token`.
    ///
    /// Returns the settled visibility, or `None` when `token` is stale.
    pub fn finish(&mut self, token: TransitionToken) -> Option<Visibility> {
        if self.active != Some(token) {
            return None;
        }
        let next = self.visibility.on_event(transition_events::COMPLETE)?;
        self.visibility = next;
        self.active = None;
        Some(next)
    }

    /// Abandon any pending transition and settle at `visibility`
    pub fn reset(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        self.active = None;
    }
}
