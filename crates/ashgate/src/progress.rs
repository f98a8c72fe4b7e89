//! Kill-progress and level tracking for the presentation bar.

/// Tracks kills against the wave total and the session level.
///
/// Wave start sets the total, each enemy death awards one kill, and a
/// cleared wave levels up and resets the bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevelTrack {
    level: u32,
    kills: u32,
    total: u32,
}

impl LevelTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// New wave: reset the bar against its enemy total.
    pub fn set_total(&mut self, total: u32) {
        self.total = total;
        self.kills = 0;
    }

    /// One enemy died. Clamped at the total.
    pub fn award_kill(&mut self) {
        if self.kills < self.total {
            self.kills += 1;
        }
    }

    /// Wave cleared: bump the level and reset the bar.
    pub fn level_up(&mut self) -> u32 {
        self.level += 1;
        self.kills = 0;
        self.level
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kills_clamp_at_total() {
        let mut track = LevelTrack::new();
        track.set_total(2);
        track.award_kill();
        track.award_kill();
        track.award_kill();
        assert_eq!(track.kills(), 2);
    }

    #[test]
    fn test_level_up_resets_bar() {
        let mut track = LevelTrack::new();
        track.set_total(3);
        track.award_kill();
        assert_eq!(track.level_up(), 1);
        assert_eq!(track.kills(), 0);
        assert_eq!(track.level(), 1);
    }

    #[test]
    fn test_new_total_resets_kills() {
        let mut track = LevelTrack::new();
        track.set_total(3);
        track.award_kill();
        track.set_total(5);
        assert_eq!(track.kills(), 0);
        assert_eq!(track.total(), 5);
    }
}
