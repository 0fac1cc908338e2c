/// Lifecycle of one ceremony, published over a watch channel so embedders
/// can drive UI from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CeremonyState {
    #[default]
    Idle,
    AwaitingConsent,
    KeyGenerating,
    Signing,
    Done,
    Denied,
    TimedOut,
    Failed,
}

impl CeremonyState {
    /// Terminal states end a ceremony; nothing transitions out of them
    /// until the next ceremony starts.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done | Self::Denied | Self::TimedOut | Self::Failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(CeremonyState::Done.is_terminal());
        assert!(CeremonyState::Denied.is_terminal());
        assert!(CeremonyState::TimedOut.is_terminal());
        assert!(CeremonyState::Failed.is_terminal());
        assert!(!CeremonyState::Idle.is_terminal());
        assert!(!CeremonyState::AwaitingConsent.is_terminal());
        assert!(!CeremonyState::KeyGenerating.is_terminal());
        assert!(!CeremonyState::Signing.is_terminal());
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(CeremonyState::default(), CeremonyState::Idle);
    }
}
