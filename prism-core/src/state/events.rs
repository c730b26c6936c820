//! Events that drive panel lifecycle transitions

/// Lifecycle events raised by the panel driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelEvent {
    /// Reset pulse and init table replay started
    BeginInit,
    /// Init table replayed and settings applied
    InitComplete,
    /// Any step of initialization failed
    InitFailed,
    /// Sleep-in command sent
    Sleep,
    /// Sleep-out command sent
    Wake,
    /// Panel handed back; the bus may be reused
    Release,
}

impl PanelEvent {
    /// Check if this event ends an initialization attempt
    pub fn ends_init(&self) -> bool {
        matches!(self, PanelEvent::InitComplete | PanelEvent::InitFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_terminators() {
        assert!(PanelEvent::InitComplete.ends_init());
        assert!(PanelEvent::InitFailed.ends_init());
        assert!(!PanelEvent::BeginInit.ends_init());
        assert!(!PanelEvent::Sleep.ends_init());
    }
}
