use rand::Rng;

// ============================================================================
// Configuration
// ============================================================================

/// Anchor every new piece starts from, in board coordinates.
pub const SPAWN_POSITION: Position = Position { x: 4, y: 1 };

pub const ROTATION_STATES: usize = 4;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub const fn offset_by(self, offset: Offset) -> Self {
        Self {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
        }
    }
}

/// Block offset relative to a piece's anchor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Offset {
    pub dx: i16,
    pub dy: i16,
}

impl Offset {
    pub const fn new(dx: i16, dy: i16) -> Self {
        Self { dx, dy }
    }

    /// Quarter turn: `(x, y) -> (-y, x)`.
    pub const fn rotated(self) -> Self {
        Self {
            dx: -self.dy,
            dy: self.dx,
        }
    }
}

pub type Shape = [Offset; 4];

const fn rotate_shape(shape: Shape) -> Shape {
    [
        shape[0].rotated(),
        shape[1].rotated(),
        shape[2].rotated(),
        shape[3].rotated(),
    ]
}

const fn rotation_cycle(base: Shape) -> [Shape; ROTATION_STATES] {
    let quarter = rotate_shape(base);
    let half = rotate_shape(quarter);
    let three_quarters = rotate_shape(half);
    [base, quarter, half, three_quarters]
}

const fn o(dx: i16, dy: i16) -> Offset {
    Offset::new(dx, dy)
}

const SQUARE: Shape = [o(0, 0), o(1, 0), o(0, 1), o(1, 1)];
const LONG_HORIZONTAL: Shape = [o(0, 0), o(-1, 0), o(1, 0), o(2, 0)];
const LONG_VERTICAL: Shape = [o(0, 0), o(0, -1), o(0, 1), o(0, 2)];

const SQUARE_STATES: [Shape; ROTATION_STATES] = [SQUARE; ROTATION_STATES];
const LONG_STATES: [Shape; ROTATION_STATES] =
    [LONG_HORIZONTAL, LONG_VERTICAL, LONG_HORIZONTAL, LONG_VERTICAL];
const L_STATES: [Shape; ROTATION_STATES] =
    rotation_cycle([o(0, 0), o(0, -1), o(0, 1), o(1, 1)]);
const J_STATES: [Shape; ROTATION_STATES] =
    rotation_cycle([o(0, 0), o(0, -1), o(0, 1), o(-1, 1)]);
const S_STATES: [Shape; ROTATION_STATES] =
    rotation_cycle([o(0, 0), o(-1, 0), o(0, -1), o(1, -1)]);
const Z_STATES: [Shape; ROTATION_STATES] =
    rotation_cycle([o(0, 0), o(1, 0), o(0, -1), o(-1, -1)]);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceKind {
    Square,
    Long,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Square,
        PieceKind::Long,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Precomputed rotation states; index 0 is the canonical shape.
    pub fn rotations(&self) -> &'static [Shape; ROTATION_STATES] {
        match self {
            PieceKind::Square => &SQUARE_STATES,
            PieceKind::Long => &LONG_STATES,
            PieceKind::L => &L_STATES,
            PieceKind::J => &J_STATES,
            PieceKind::S => &S_STATES,
            PieceKind::Z => &Z_STATES,
        }
    }

    /// Number of rotation states that actually differ.
    pub fn distinct_rotations(&self) -> usize {
        match self {
            PieceKind::Square => 1,
            PieceKind::Long => 2,
            _ => ROTATION_STATES,
        }
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Color tag carried by a piece and by the cells it locks into.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    DarkGreen,
    DarkBlue,
    Blue,
    DarkRed,
    Gold,
    Purple,
    OrangeRed,
    LightSkyBlue,
}

impl Color {
    pub const PALETTE: [Color; 8] = [
        Color::DarkGreen,
        Color::DarkBlue,
        Color::Blue,
        Color::DarkRed,
        Color::Gold,
        Color::Purple,
        Color::OrangeRed,
        Color::LightSkyBlue,
    ];

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::PALETTE[rng.gen_range(0..Self::PALETTE.len())]
    }
}

/// Read-only view of whatever the piece collides with.
pub trait Occupancy {
    fn is_empty_at(&self, position: Position) -> bool;
}

// ============================================================================
// Piece
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub position: Position,
    pub rotation: usize,
    pub color: Color,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self::new_at(kind, color, SPAWN_POSITION.x, SPAWN_POSITION.y)
    }

    pub fn new_at(kind: PieceKind, color: Color, x: i16, y: i16) -> Self {
        Self {
            kind,
            position: Position { x, y },
            rotation: 0,
            color,
        }
    }

    pub fn shape(&self) -> &'static Shape {
        &self.kind.rotations()[self.rotation % ROTATION_STATES]
    }

    /// Absolute board cells covered by the piece.
    pub fn cells(&self) -> [Position; 4] {
        let shape = *self.shape();
        shape.map(|offset| self.position.offset_by(offset))
    }

    /// Moves and/or rotates the piece if every resulting cell is empty.
    ///
    /// Either both position and rotation change and `true` is returned, or
    /// the piece is left untouched. Rotation gets no kick: a turn that
    /// collides is simply refused.
    pub fn try_move(
        &mut self,
        board: &impl Occupancy,
        delta: (i16, i16),
        delta_rotation: i32,
    ) -> bool {
        let rotation = (self.rotation as i32 + delta_rotation)
            .rem_euclid(ROTATION_STATES as i32) as usize;
        let position = Position {
            x: self.position.x + delta.0,
            y: self.position.y + delta.1,
        };

        let fits = self.kind.rotations()[rotation]
            .iter()
            .all(|offset| board.is_empty_at(position.offset_by(*offset)));

        if fits {
            self.position = position;
            self.rotation = rotation;
        }
        fits
    }

    pub fn drop_one(&mut self, board: &impl Occupancy) -> bool {
        self.try_move(board, (0, 1), 0)
    }
}
