use serde::{Deserialize, Serialize};

/// Host-side bookkeeping for one channel.
///
/// All values are quarter-microseconds. Zero carries meaning: a zero target
/// was never commanded, and a zero bound leaves that side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Last target actually sent (after clamping).
    pub target: u16,
    /// Lower soft limit.
    pub min: u16,
    /// Upper soft limit.
    pub max: u16,
}

impl ChannelState {
    /// Whether a target has ever been sent on this channel.
    pub fn has_target(&self) -> bool {
        self.target > 0
    }

    /// Whether both bounds are set and `min > max`.
    pub fn is_inverted(&self) -> bool {
        self.min > 0 && self.max > 0 && self.min > self.max
    }

    /// Clamp `target` into the configured bounds.
    ///
    /// Zero bounds are ignored. An inverted range clamps nothing.
    pub fn clamp(&self, target: u16) -> u16 {
        if self.is_inverted() {
            return target;
        }

        let mut clamped = target;
        if self.min > 0 && clamped < self.min {
            clamped = self.min;
        }
        if self.max > 0 && clamped > self.max {
            clamped = self.max;
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limited(min: u16, max: u16) -> ChannelState {
        ChannelState {
            target: 0,
            min,
            max,
        }
    }

    #[test]
    fn clamps_into_range() {
        let state = limited(3000, 9000);
        assert_eq!(state.clamp(1000), 3000);
        assert_eq!(state.clamp(12000), 9000);
        assert_eq!(state.clamp(6000), 6000);
        assert_eq!(state.clamp(3000), 3000);
        assert_eq!(state.clamp(9000), 9000);
    }

    #[test]
    fn zero_bounds_are_unbounded() {
        let state = ChannelState::default();
        assert_eq!(state.clamp(0), 0);
        assert_eq!(state.clamp(16383), 16383);

        let min_only = limited(4000, 0);
        assert_eq!(min_only.clamp(1000), 4000);
        assert_eq!(min_only.clamp(16000), 16000);

        let max_only = limited(0, 8000);
        assert_eq!(max_only.clamp(0), 0);
        assert_eq!(max_only.clamp(9000), 8000);
    }

    #[test]
    fn inverted_range_passes_through() {
        let state = limited(9000, 3000);
        assert!(state.is_inverted());
        assert_eq!(state.clamp(1000), 1000);
        assert_eq!(state.clamp(12000), 12000);
    }

    #[test]
    fn has_target_tracks_zero() {
        assert!(!ChannelState::default().has_target());
        assert!(ChannelState {
            target: 6000,
            ..ChannelState::default()
        }
        .has_target());
    }
}
