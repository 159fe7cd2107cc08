use arrayvec::ArrayVec;

/// Milliseconds a movement key must stay held before it starts repeating.
pub const MOVE_REPEAT_DELAY_MS: u64 = 150;
/// Milliseconds between repeats once a held movement key is repeating.
pub const MOVE_REPEAT_INTERVAL_MS: u64 = 50;

/// The closed set of player inputs a session accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCw,
    RotateCcw,
    HardDrop,
    TogglePause,
    Restart,
}

/// The movement keys that auto-repeat while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKey {
    Left,
    Right,
    Down,
}

impl RepeatKey {
    pub const ALL: [Self; 3] = [RepeatKey::Left, RepeatKey::Right, RepeatKey::Down];

    /// The command a repeat of this key issues.
    #[must_use]
    pub fn command(self) -> Command {
        match self {
            RepeatKey::Left => Command::MoveLeft,
            RepeatKey::Right => Command::MoveRight,
            RepeatKey::Down => Command::SoftDrop,
        }
    }

    fn index(self) -> usize {
        match self {
            RepeatKey::Left => 0,
            RepeatKey::Right => 1,
            RepeatKey::Down => 2,
        }
    }
}

/// Two-phase auto-repeat timers for held movement keys.
///
/// Pressing a key issues its command immediately and arms a timer; while the
/// key stays held, [`due`](Self::due) fires the command again after an
/// initial [`MOVE_REPEAT_DELAY_MS`], then every [`MOVE_REPEAT_INTERVAL_MS`].
/// Each key carries its own deadline, so holding several keys repeats them
/// independently.
#[derive(Debug, Clone, Default)]
pub struct KeyRepeat {
    deadlines: [Option<u64>; 3],
}

impl KeyRepeat {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the key's repeat timer at `now + delay`. A key that is already
    /// held keeps its existing deadline, so duplicate press events from
    /// terminal auto-repeat do not push the first repeat further out.
    pub fn key_down(&mut self, key: RepeatKey, now_ms: u64) {
        let slot = &mut self.deadlines[key.index()];
        if slot.is_none() {
            *slot = Some(now_ms + MOVE_REPEAT_DELAY_MS);
        }
    }

    /// Disarms the key's repeat timer.
    pub fn key_up(&mut self, key: RepeatKey) {
        self.deadlines[key.index()] = None;
    }

    #[must_use]
    pub fn is_held(&self, key: RepeatKey) -> bool {
        self.deadlines[key.index()].is_some()
    }

    /// Returns every key whose deadline has passed, re-arming each at
    /// `now + interval`.
    pub fn due(&mut self, now_ms: u64) -> ArrayVec<RepeatKey, 3> {
        let mut fired = ArrayVec::new();
        for key in RepeatKey::ALL {
            let slot = &mut self.deadlines[key.index()];
            if slot.is_some_and(|deadline| now_ms >= deadline) {
                *slot = Some(now_ms + MOVE_REPEAT_INTERVAL_MS);
                fired.push(key);
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_after_delay_then_at_interval() {
        let mut repeat = KeyRepeat::new();
        repeat.key_down(RepeatKey::Left, 1000);

        assert!(repeat.due(1000 + MOVE_REPEAT_DELAY_MS - 1).is_empty());
        assert_eq!(
            repeat.due(1000 + MOVE_REPEAT_DELAY_MS).as_slice(),
            &[RepeatKey::Left]
        );

        let after_first = 1000 + MOVE_REPEAT_DELAY_MS;
        assert!(repeat.due(after_first + MOVE_REPEAT_INTERVAL_MS - 1).is_empty());
        assert_eq!(
            repeat.due(after_first + MOVE_REPEAT_INTERVAL_MS).as_slice(),
            &[RepeatKey::Left]
        );
    }

    #[test]
    fn key_up_stops_repeats() {
        let mut repeat = KeyRepeat::new();
        repeat.key_down(RepeatKey::Down, 0);
        repeat.key_up(RepeatKey::Down);
        assert!(!repeat.is_held(RepeatKey::Down));
        assert!(repeat.due(10_000).is_empty());
    }

    #[test]
    fn duplicate_press_keeps_the_original_deadline() {
        let mut repeat = KeyRepeat::new();
        repeat.key_down(RepeatKey::Right, 0);
        // Terminal auto-repeat delivers another press before the delay ends.
        repeat.key_down(RepeatKey::Right, 100);
        assert_eq!(
            repeat.due(MOVE_REPEAT_DELAY_MS).as_slice(),
            &[RepeatKey::Right]
        );
    }

    #[test]
    fn held_keys_repeat_independently() {
        let mut repeat = KeyRepeat::new();
        repeat.key_down(RepeatKey::Left, 0);
        repeat.key_down(RepeatKey::Down, 100);

        assert_eq!(repeat.due(MOVE_REPEAT_DELAY_MS).as_slice(), &[RepeatKey::Left]);

        // Releasing one key leaves the other's timer running.
        repeat.key_up(RepeatKey::Left);
        assert_eq!(
            repeat.due(100 + MOVE_REPEAT_DELAY_MS).as_slice(),
            &[RepeatKey::Down]
        );
    }
}
