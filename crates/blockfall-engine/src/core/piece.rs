/// One rotation state of a piece: a square grid of rows where any character
/// other than `'.'` marks an occupied cell.
pub(crate) type RotationState = &'static [&'static str];

const I_STATES: &[RotationState] = &[
    &["....", "IIII", "....", "...."],
    &["..I.", "..I.", "..I.", "..I."],
];
const O_STATES: &[RotationState] = &[&["OO", "OO"]];
const T_STATES: &[RotationState] = &[
    &["...", "TTT", ".T."],
    &[".T.", "TT.", ".T."],
    &[".T.", "TTT", "..."],
    &[".T.", ".TT", ".T."],
];
const S_STATES: &[RotationState] = &[
    &["...", ".SS", "SS."],
    &[".S.", ".SS", "..S"],
];
const Z_STATES: &[RotationState] = &[
    &["...", "ZZ.", ".ZZ"],
    &["..Z", ".ZZ", ".Z."],
];
const J_STATES: &[RotationState] = &[
    &["...", "JJJ", "..J"],
    &[".J.", ".J.", "JJ."],
    &["J..", "JJJ", "..."],
    &[".JJ", ".J.", ".J."],
];
const L_STATES: &[RotationState] = &[
    &["...", "LLL", "L.."],
    &["LL.", ".L.", ".L."],
    &["..L", "LLL", "..."],
    &[".L.", ".L.", ".LL"],
];

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// I-piece (long bar).
    I,
    /// O-piece (square).
    O,
    /// T-piece.
    T,
    /// S-piece.
    S,
    /// Z-piece.
    Z,
    /// J-piece.
    J,
    /// L-piece.
    L,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds, in declaration order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Ordered rotation states of this kind. The I-piece uses a 4x4 grid,
    /// the O-piece a 2x2 grid, and the remaining five a 3x3 grid.
    pub(crate) fn rotation_states(self) -> &'static [RotationState] {
        match self {
            PieceKind::I => I_STATES,
            PieceKind::O => O_STATES,
            PieceKind::T => T_STATES,
            PieceKind::S => S_STATES,
            PieceKind::Z => Z_STATES,
            PieceKind::J => J_STATES,
            PieceKind::L => L_STATES,
        }
    }
}

/// A falling piece: a fixed shape at a position on (or above) the board.
///
/// `Piece` is a small `Copy` value. Movement and rotation return new pieces,
/// so a speculative move is tested on a copy and committed by the session
/// only once the board accepts it. Rotation performs no validation; validity
/// is the board's responsibility.
///
/// Coordinates are board-relative with x growing rightward and y growing
/// downward. Negative y is legal and places cells above the visible board,
/// which is where pieces spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    x: i32,
    y: i32,
    rotation: usize,
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            rotation: 0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Current rotation index, always within `0..state count`.
    #[must_use]
    pub fn rotation(&self) -> usize {
        self.rotation
    }

    fn state(&self) -> RotationState {
        self.kind.rotation_states()[self.rotation]
    }

    /// Column count of the current rotation state's grid.
    #[must_use]
    pub fn width(&self) -> usize {
        self.state()[0].len()
    }

    /// Row count of the current rotation state's grid.
    #[must_use]
    pub fn height(&self) -> usize {
        self.state().len()
    }

    /// Absolute board coordinates of every occupied cell.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.relative_cells()
            .map(|(col, row)| (self.x + col as i32, self.y + row as i32))
    }

    /// Occupied cells relative to the piece origin, for preview rendering.
    pub fn relative_cells(&self) -> impl Iterator<Item = (usize, usize)> + 'static {
        self.state().iter().enumerate().flat_map(|(row, line)| {
            line.bytes()
                .enumerate()
                .filter_map(move |(col, cell)| (cell != b'.').then_some((col, row)))
        })
    }

    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_cw(&self) -> Self {
        let count = self.kind.rotation_states().len();
        Self {
            rotation: (self.rotation + 1) % count,
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_ccw(&self) -> Self {
        let count = self.kind.rotation_states().len();
        Self {
            rotation: (self.rotation + count - 1) % count,
            ..*self
        }
    }
}
