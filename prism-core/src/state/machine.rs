//! Panel state definition
//!
//! Pixel writes are only accepted in `Ready`; everything else the driver
//! does is gated on the current state and an event.

use super::events::PanelEvent;

/// Panel lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelState {
    /// Constructed, or a previous init failed
    #[default]
    Uninitialized,
    /// Reset and init table in progress
    Initializing,
    /// Accepting commands and pixel data
    Ready,
    /// Controller in sleep mode; only wake and release are meaningful
    Sleeping,
    /// Torn down; no further use
    Released,
}

impl PanelState {
    /// Check if pixel and window writes are allowed
    pub fn writes_allowed(&self) -> bool {
        matches!(self, PanelState::Ready)
    }

    /// Check if the controller has been initialized and not released
    pub fn is_initialized(&self) -> bool {
        matches!(self, PanelState::Ready | PanelState::Sleeping)
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PanelState::Released)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: PanelEvent) -> Self {
        use PanelEvent::*;
        use PanelState::*;

        match (self, event) {
            // Init may be retried after a failure
            (Uninitialized, BeginInit) => Initializing,
            (Ready, BeginInit) => Initializing,

            (Initializing, InitComplete) => Ready,
            (Initializing, InitFailed) => Uninitialized,

            (Ready, Sleep) => Sleeping,
            (Sleeping, Wake) => Ready,

            (Ready, Release) => Released,
            (Sleeping, Release) => Released,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_flow() {
        let state = PanelState::default();
        assert_eq!(state, PanelState::Uninitialized);

        let initializing = state.transition(PanelEvent::BeginInit);
        assert_eq!(initializing, PanelState::Initializing);

        let ready = initializing.transition(PanelEvent::InitComplete);
        assert_eq!(ready, PanelState::Ready);
        assert!(ready.writes_allowed());
    }

    #[test]
    fn test_failed_init_returns_to_uninitialized() {
        let state = PanelState::Initializing.transition(PanelEvent::InitFailed);
        assert_eq!(state, PanelState::Uninitialized);
        assert!(!state.writes_allowed());
    }

    #[test]
    fn test_sleep_wake() {
        let sleeping = PanelState::Ready.transition(PanelEvent::Sleep);
        assert_eq!(sleeping, PanelState::Sleeping);
        assert!(!sleeping.writes_allowed());
        assert!(sleeping.is_initialized());

        let ready = sleeping.transition(PanelEvent::Wake);
        assert_eq!(ready, PanelState::Ready);
    }

    #[test]
    fn test_release_from_initialized_states() {
        for state in [PanelState::Ready, PanelState::Sleeping] {
            let next = state.transition(PanelEvent::Release);
            assert_eq!(next, PanelState::Released);
            assert!(next.is_terminal());
        }
    }

    #[test]
    fn test_released_is_terminal() {
        let events = [
            PanelEvent::BeginInit,
            PanelEvent::InitComplete,
            PanelEvent::Wake,
            PanelEvent::Sleep,
        ];
        for event in events {
            assert_eq!(PanelState::Released.transition(event), PanelState::Released);
        }
    }

    #[test]
    fn test_ignored_events_keep_state() {
        assert_eq!(
            PanelState::Uninitialized.transition(PanelEvent::Sleep),
            PanelState::Uninitialized
        );
        assert_eq!(
            PanelState::Ready.transition(PanelEvent::InitComplete),
            PanelState::Ready
        );
    }
}
