#![forbid(unsafe_code)]

/// Experience required to gain a level. Flat per level: the subtraction on
/// level-up is always this constant, so experience stays below it after any
/// reward application.
pub const LEVEL_THRESHOLD: u32 = 5;

/// Gold granted per level gained.
pub const GOLD_PER_LEVEL: u32 = 20;

/// A profile's progression counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub experience: u32,
    pub level: u32,
    pub gold: u32,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            experience: 0,
            level: 1,
            gold: 0,
        }
    }

    /// Adds `points` and resolves every pending level-up.
    ///
    /// Terminates for any input: each loop iteration removes
    /// `LEVEL_THRESHOLD` experience, so the remainder is strictly
    /// decreasing. Afterwards `experience < LEVEL_THRESHOLD` holds.
    pub fn apply_experience(&mut self, points: u32) -> LevelUps {
        self.experience += points;
        let mut levels_gained = 0u32;
        while self.experience >= LEVEL_THRESHOLD {
            self.level += 1;
            self.experience -= LEVEL_THRESHOLD;
            levels_gained += 1;
        }
        let gold_earned = levels_gained * GOLD_PER_LEVEL;
        self.gold += gold_earned;
        LevelUps {
            levels_gained,
            gold_earned,
            level: self.level,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single reward application produced, for the shell's toasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUps {
    pub levels_gained: u32,
    pub gold_earned: u32,
    /// Level after the application.
    pub level: u32,
}
