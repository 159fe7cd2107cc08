use arrayvec::ArrayVec;

use crate::{
    CommandError, PieceCollisionError,
    core::{Board, Piece, PieceKind},
    engine::{Command, PieceBag},
};

/// Gravity interval at level 1, in milliseconds.
pub const INITIAL_FALL_INTERVAL_MS: u64 = 500;
/// Gravity interval multiplier applied per level above 1.
pub const SPEED_FACTOR: f64 = 0.9;
/// Cleared lines required per level step.
pub const LINES_PER_LEVEL: u32 = 10;
/// Base score for clearing 0..=4 lines with one piece, multiplied by level.
pub const LINE_CLEAR_SCORES: [u64; 5] = [0, 100, 300, 500, 800];
/// Score per row descended by player-driven soft drop.
pub const SOFT_DROP_SCORE: u64 = 1;
/// Score per row descended by hard drop.
pub const HARD_DROP_SCORE_PER_ROW: u64 = 2;

/// Horizontal nudges tried, in order, when a rotation collides in place.
const WALL_KICK_OFFSETS: [i32; 4] = [-1, 1, -2, 2];

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn fall_interval_ms(level: u32) -> u64 {
    (INITIAL_FALL_INTERVAL_MS as f64 * SPEED_FACTOR.powi(level as i32 - 1)) as u64
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    Active,
    Paused,
    GameOver,
}

/// A complete game in progress.
///
/// Owns the board, the falling piece, the piece supply, and the
/// score/level/timing state. Pure state machine: inputs arrive as
/// [`Command`]s through [`apply`](Self::apply), time arrives as millisecond
/// timestamps through [`tick`](Self::tick), and a renderer observes the
/// result through read-only accessors.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    bag: PieceBag,
    seed: Option<u64>,
    current: Option<Piece>,
    next_kind: PieceKind,
    phase: Phase,
    score: u64,
    level: u32,
    lines: u32,
    clear_histogram: [u64; 5],
    pieces_locked: u64,
    last_fall_ms: u64,
    fall_interval_ms: u64,
}

impl GameSession {
    /// Starts a session on the standard 10x20 board with an OS-seeded bag.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bag(Board::standard(), PieceBag::new(), None)
    }

    /// Starts a session with a fixed seed, so the piece sequence is
    /// reproducible. The seed is kept so restarts replay the same sequence.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_bag(Board::standard(), PieceBag::with_seed(seed), Some(seed))
    }

    fn with_bag(board: Board, mut bag: PieceBag, seed: Option<u64>) -> Self {
        let next_kind = bag.next_piece();
        let mut this = Self {
            board,
            bag,
            seed,
            current: None,
            next_kind,
            phase: Phase::Active,
            score: 0,
            level: 1,
            lines: 0,
            clear_histogram: [0; 5],
            pieces_locked: 0,
            last_fall_ms: 0,
            fall_interval_ms: fall_interval_ms(1),
        };
        // Spawning routes through the collision check, so a session started
        // on a pre-filled board can be over before the first input.
        this.spawn_next();
        this
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn spawn_x(&self) -> i32 {
        (self.board.width() / 2) as i32 - 1
    }

    /// Promotes the queued piece to the falling piece at the spawn position
    /// and draws a new queued piece. A spawn collision ends the game with no
    /// falling piece.
    fn spawn_next(&mut self) {
        let piece = Piece::new(self.next_kind, self.spawn_x(), 0);
        self.next_kind = self.bag.next_piece();
        if self.board.is_valid_position(&piece) {
            self.current = Some(piece);
        } else {
            self.current = None;
            self.phase = Phase::GameOver;
        }
    }

    fn active_piece(&self) -> Result<Piece, CommandError> {
        if !self.phase.is_active() {
            return Err(CommandError::PhaseDisallowed);
        }
        self.current.ok_or(CommandError::PhaseDisallowed)
    }

    /// Dispatches a player input to the matching operation.
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::MoveLeft => self.try_move(-1, 0),
            Command::MoveRight => self.try_move(1, 0),
            Command::SoftDrop => self.soft_drop(),
            Command::RotateCw => self.try_rotate_cw(),
            Command::RotateCcw => self.try_rotate_ccw(),
            Command::HardDrop => self.hard_drop(),
            Command::TogglePause => {
                self.toggle_pause();
                Ok(())
            }
            Command::Restart => self.restart(),
        }
    }

    /// Shifts the falling piece if the target cells are free.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> Result<(), CommandError> {
        let piece = self.active_piece()?;
        let moved = piece.translated(dx, dy);
        if self.board.is_valid_position(&moved) {
            self.current = Some(moved);
            Ok(())
        } else {
            Err(CommandError::PieceCollision(PieceCollisionError))
        }
    }

    pub fn try_rotate_cw(&mut self) -> Result<(), CommandError> {
        self.try_rotate(Piece::rotated_cw)
    }

    pub fn try_rotate_ccw(&mut self) -> Result<(), CommandError> {
        self.try_rotate(Piece::rotated_ccw)
    }

    /// Rotates the falling piece, trying the rotation in place first and
    /// then at each wall-kick offset. The first fit wins; if none fits, the
    /// piece is left untouched.
    fn try_rotate(&mut self, rotate: impl Fn(&Piece) -> Piece) -> Result<(), CommandError> {
        let piece = self.active_piece()?;
        let rotated = rotate(&piece);
        for dx in std::iter::once(0).chain(WALL_KICK_OFFSETS) {
            let candidate = rotated.translated(dx, 0);
            if self.board.is_valid_position(&candidate) {
                self.current = Some(candidate);
                return Ok(());
            }
        }
        Err(CommandError::PieceCollision(PieceCollisionError))
    }

    /// Moves the falling piece down one row for score. A grounded piece
    /// stays in play and keeps its slide window; it locks only through
    /// gravity or hard drop.
    pub fn soft_drop(&mut self) -> Result<(), CommandError> {
        self.try_move(0, 1)?;
        self.score += SOFT_DROP_SCORE;
        Ok(())
    }

    /// Drops the falling piece to its resting row and locks it immediately.
    pub fn hard_drop(&mut self) -> Result<(), CommandError> {
        let piece = self.active_piece()?;
        let dy = self.board.drop_position(&piece) - piece.y();
        self.score += u64::try_from(dy).unwrap_or(0) * HARD_DROP_SCORE_PER_ROW;
        self.current = Some(piece.translated(0, dy));
        self.lock_piece();
        Ok(())
    }

    /// Writes the falling piece into the board, clears completed lines,
    /// applies scoring and leveling, then spawns the next piece (or ends the
    /// game when the stack reaches the top row).
    #[expect(clippy::cast_possible_truncation)]
    fn lock_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        self.board
            .place(&piece)
            .expect("falling piece only ever occupies valid cells");
        self.pieces_locked += 1;

        let cleared = self.board.clear_completed_lines();
        self.clear_histogram[cleared] += 1;
        self.score += LINE_CLEAR_SCORES[cleared] * u64::from(self.level);
        self.lines += cleared as u32;
        self.level = 1 + self.lines / LINES_PER_LEVEL;
        self.fall_interval_ms = fall_interval_ms(self.level);

        if self.board.is_topped_out() {
            self.phase = Phase::GameOver;
        } else {
            self.spawn_next();
        }
    }

    /// Advances gravity. Call with a monotonic millisecond clock; the piece
    /// falls one row each time the fall interval elapses, locking when the
    /// row below is blocked. Gravity drops score nothing. No-op unless the
    /// session is active.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.phase.is_active() {
            return;
        }
        if now_ms.saturating_sub(self.last_fall_ms) >= self.fall_interval_ms {
            self.last_fall_ms = now_ms;
            self.fall_one();
        }
    }

    fn fall_one(&mut self) {
        let Some(piece) = self.current else {
            return;
        };
        let moved = piece.translated(0, 1);
        if self.board.is_valid_position(&moved) {
            self.current = Some(moved);
        } else {
            self.lock_piece();
        }
    }

    /// Pauses or resumes. A finished game stays finished.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Active => Phase::Paused,
            Phase::Paused => Phase::Active,
            Phase::GameOver => Phase::GameOver, // No change from game over
        };
    }

    /// Starts a fresh game on a board of the same dimensions, replaying the
    /// original seed when one was injected. Accepted only after game over.
    pub fn restart(&mut self) -> Result<(), CommandError> {
        if !self.phase.is_game_over() {
            return Err(CommandError::PhaseDisallowed);
        }
        let mut board = self.board.clone();
        board.reset();
        let bag = match self.seed {
            Some(seed) => PieceBag::with_seed(seed),
            None => PieceBag::new(),
        };
        *self = Self::with_bag(board, bag, self.seed);
        Ok(())
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The falling piece, absent after game over.
    #[must_use]
    pub fn current_piece(&self) -> Option<Piece> {
        self.current
    }

    /// Kind of the piece that spawns after the current one locks.
    #[must_use]
    pub fn next_piece_kind(&self) -> PieceKind {
        self.next_kind
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Total lines cleared this game.
    #[must_use]
    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Count of locks that cleared 0, 1, 2, 3, and 4 lines, by index.
    #[must_use]
    pub fn clear_histogram(&self) -> [u64; 5] {
        self.clear_histogram
    }

    #[must_use]
    pub fn pieces_locked(&self) -> u64 {
        self.pieces_locked
    }

    #[must_use]
    pub fn fall_interval_ms(&self) -> u64 {
        self.fall_interval_ms
    }

    /// Where the falling piece would land, for ghost rendering.
    #[must_use]
    pub fn shadow_cells(&self) -> Option<ArrayVec<(i32, i32), 4>> {
        self.current.map(|piece| self.board.shadow_cells(&piece))
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_on(board: Board, piece: Piece) -> GameSession {
        GameSession {
            board,
            bag: PieceBag::with_seed(0),
            seed: None,
            current: Some(piece),
            next_kind: PieceKind::T,
            phase: Phase::Active,
            score: 0,
            level: 1,
            lines: 0,
            clear_histogram: [0; 5],
            pieces_locked: 0,
            last_fall_ms: 0,
            fall_interval_ms: fall_interval_ms(1),
        }
    }

    /// Four rows missing only column 4, so a vertical I-piece completes all
    /// four at once.
    const TETRIS_SETUP: &str = "\
        ..........
        ..........
        ####.#####
        ####.#####
        ####.#####
        ####.#####";

    fn vertical_i() -> Piece {
        // Rotation state 1 of the I-piece occupies column x + 2.
        Piece::new(PieceKind::I, 2, 0).rotated_cw()
    }

    #[test]
    fn fall_interval_shrinks_ten_percent_per_level() {
        assert_eq!(fall_interval_ms(1), 500);
        assert_eq!(fall_interval_ms(2), 450);
        assert_eq!(fall_interval_ms(3), 405);
    }

    #[test]
    fn four_line_clear_scores_eight_hundred_times_level() {
        let mut session = session_on(Board::from_ascii(TETRIS_SETUP), vertical_i());
        session.hard_drop().unwrap();

        // Two rows of hard-drop descent, then the line bonus.
        assert_eq!(session.score(), 2 * HARD_DROP_SCORE_PER_ROW + 800);
        assert_eq!(session.lines(), 4);
        assert_eq!(session.level(), 1);
        assert_eq!(session.clear_histogram(), [0, 0, 0, 0, 1]);
        assert_eq!(session.pieces_locked(), 1);
    }

    #[test]
    fn level_rises_every_ten_lines_and_scales_scoring() {
        let mut session = session_on(Board::from_ascii(TETRIS_SETUP), vertical_i());
        session.hard_drop().unwrap();
        for _ in 0..2 {
            session.board = Board::from_ascii(TETRIS_SETUP);
            session.current = Some(vertical_i());
            session.hard_drop().unwrap();
        }

        assert_eq!(session.lines(), 12);
        assert_eq!(session.level(), 2);
        assert_eq!(session.fall_interval_ms(), 450);
        let score_at_level_1 = session.score();

        // The next clear is awarded at the new level.
        session.board = Board::from_ascii(TETRIS_SETUP);
        session.current = Some(vertical_i());
        session.hard_drop().unwrap();
        assert_eq!(
            session.score(),
            score_at_level_1 + 2 * HARD_DROP_SCORE_PER_ROW + 800 * 2
        );
    }

    #[test]
    fn single_line_clear_scores_one_hundred() {
        let board = Board::from_ascii(
            "\
            ..........
            ..........
            ..........
            ..........
            ####.#####",
        );
        let mut session = session_on(board, Piece::new(PieceKind::I, 2, 0).rotated_cw());
        session.soft_drop().unwrap();
        // Grounded now; gravity performs the lock.
        assert!(session.soft_drop().is_err());
        session.tick(INITIAL_FALL_INTERVAL_MS);
        assert_eq!(session.pieces_locked(), 1);
        assert_eq!(session.lines(), 1);
        // One soft-dropped row plus the single-line bonus.
        assert_eq!(session.score(), SOFT_DROP_SCORE + 100);
        assert_eq!(session.clear_histogram()[1], 1);
    }

    #[test]
    fn blocked_rotation_succeeds_with_a_wall_kick() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::I, -2, 1).rotated_cw());
        session.try_rotate_cw().unwrap();

        let piece = session.current_piece().unwrap();
        // In-place rotation and the -1/+1/-2 kicks all cross the left wall;
        // the +2 kick is the first fit.
        assert_eq!(piece.x(), 0);
        assert_eq!(piece.rotation(), 0);
    }

    #[test]
    fn rotation_fails_and_leaves_the_piece_when_no_kick_fits() {
        let board = Board::from_ascii(
            "\
            ..........
            ..........
            ..#.......
            ..........
            ..........
            ..........",
        );
        let before = Piece::new(PieceKind::I, -2, 1).rotated_cw();
        let mut session = session_on(board, before);
        assert!(matches!(
            session.try_rotate_cw(),
            Err(CommandError::PieceCollision(_))
        ));
        assert_eq!(session.current_piece(), Some(before));
    }

    #[test]
    fn move_stops_at_the_wall() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::O, 4, 0));
        for _ in 0..4 {
            session.try_move(-1, 0).unwrap();
        }
        assert!(matches!(
            session.try_move(-1, 0),
            Err(CommandError::PieceCollision(_))
        ));
        assert_eq!(session.current_piece().unwrap().x(), 0);
    }

    #[test]
    fn gravity_advances_only_when_the_interval_elapses() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::O, 4, 0));
        session.tick(INITIAL_FALL_INTERVAL_MS - 1);
        assert_eq!(session.current_piece().unwrap().y(), 0);

        session.tick(INITIAL_FALL_INTERVAL_MS);
        assert_eq!(session.current_piece().unwrap().y(), 1);

        // The timer restarts from the last fall.
        session.tick(2 * INITIAL_FALL_INTERVAL_MS - 1);
        assert_eq!(session.current_piece().unwrap().y(), 1);
        session.tick(2 * INITIAL_FALL_INTERVAL_MS);
        assert_eq!(session.current_piece().unwrap().y(), 2);

        // Gravity is unscored.
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn gravity_locks_a_grounded_piece() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::O, 4, 18));
        session.tick(INITIAL_FALL_INTERVAL_MS);
        assert_eq!(session.pieces_locked(), 1);
        assert_eq!(session.board().cell_at(4, 19), Some(PieceKind::O));
        // The queued piece spawned.
        assert_eq!(session.current_piece().unwrap().kind(), PieceKind::T);
    }

    #[test]
    fn soft_drop_on_a_grounded_piece_fails_without_locking() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::O, 4, 18));
        assert!(matches!(
            session.soft_drop(),
            Err(CommandError::PieceCollision(_))
        ));
        assert_eq!(session.pieces_locked(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_piece().unwrap().y(), 18);
        // The piece can still slide before gravity locks it.
        session.try_move(1, 0).unwrap();
        assert_eq!(session.current_piece().unwrap().x(), 5);
    }

    #[test]
    fn hard_drop_scores_two_per_row_and_locks() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::O, 4, 0));
        session.hard_drop().unwrap();
        assert_eq!(session.score(), 18 * HARD_DROP_SCORE_PER_ROW);
        assert_eq!(session.pieces_locked(), 1);
        assert_eq!(session.board().cell_at(4, 19), Some(PieceKind::O));
    }

    #[test]
    fn pause_rejects_piece_commands_and_freezes_gravity() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::O, 4, 0));
        session.apply(Command::TogglePause).unwrap();
        assert!(session.phase().is_paused());

        assert!(matches!(
            session.apply(Command::MoveLeft),
            Err(CommandError::PhaseDisallowed)
        ));
        assert!(matches!(
            session.apply(Command::HardDrop),
            Err(CommandError::PhaseDisallowed)
        ));

        // Time passing while paused does not move the piece.
        session.tick(10_000);
        assert_eq!(session.current_piece().unwrap().y(), 0);

        // The fall timer is untouched by the pause, so the first tick
        // after resuming is already due.
        session.apply(Command::TogglePause).unwrap();
        session.tick(10_001);
        assert_eq!(session.current_piece().unwrap().y(), 1);
    }

    #[test]
    fn spawn_collision_ends_the_game_and_blocks_commands_until_restart() {
        let board = Board::from_ascii(
            "\
            ..########
            ..########
            ..########
            ..........
            ..........",
        );
        let mut session = GameSession::with_bag(board, PieceBag::with_seed(0), None);
        assert!(session.phase().is_game_over());
        assert_eq!(session.current_piece(), None);

        for command in [
            Command::MoveLeft,
            Command::MoveRight,
            Command::SoftDrop,
            Command::RotateCw,
            Command::RotateCcw,
            Command::HardDrop,
        ] {
            assert!(matches!(
                session.apply(command),
                Err(CommandError::PhaseDisallowed)
            ));
        }
        session.apply(Command::TogglePause).unwrap();
        assert!(session.phase().is_game_over());

        session.apply(Command::Restart).unwrap();
        assert!(session.phase().is_active());
        assert!(session.current_piece().is_some());
        assert_eq!(session.score(), 0);
        assert_eq!(session.lines(), 0);
        assert!(!session.board().is_topped_out());
    }

    #[test]
    fn restart_of_a_seeded_session_replays_the_piece_sequence() {
        let mut session = GameSession::with_seed(7);
        let first_kind = session.current_piece().unwrap().kind();
        let second_kind = session.next_piece_kind();

        // Force a game over, then restart.
        session.phase = Phase::GameOver;
        session.current = None;
        session.apply(Command::Restart).unwrap();

        assert!(session.phase().is_active());
        assert_eq!(session.current_piece().unwrap().kind(), first_kind);
        assert_eq!(session.next_piece_kind(), second_kind);
    }

    #[test]
    fn restart_is_rejected_while_playing() {
        let mut session = session_on(Board::standard(), Piece::new(PieceKind::O, 4, 0));
        assert!(matches!(
            session.apply(Command::Restart),
            Err(CommandError::PhaseDisallowed)
        ));
    }

    #[test]
    fn locking_into_the_top_row_ends_the_game() {
        // Columns 4 and 5 are filled from row 2 down, so the O-piece locks
        // in rows 0 and 1.
        let board = Board::from_ascii(
            "\
            ..........
            ..........
            ....##....
            ....##....
            ....##....",
        );
        let mut session = session_on(board, Piece::new(PieceKind::O, 4, 0));
        session.tick(INITIAL_FALL_INTERVAL_MS);
        assert!(session.phase().is_game_over());
        assert_eq!(session.current_piece(), None);
    }

    #[test]
    fn shadow_matches_the_board_projection() {
        let session = session_on(Board::standard(), Piece::new(PieceKind::T, 3, 0));
        let shadow = session.shadow_cells().unwrap();
        let expected = session
            .board()
            .shadow_cells(&session.current_piece().unwrap());
        assert_eq!(shadow, expected);
    }

    #[test]
    fn seeded_sessions_play_identically() {
        let mut a = GameSession::with_seed(99);
        let mut b = GameSession::with_seed(99);
        for _ in 0..5 {
            a.hard_drop().unwrap();
            b.hard_drop().unwrap();
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.current_piece(), b.current_piece());
        assert_eq!(a.board(), b.board());
    }
}
