//! Board parsing: legacy ASCII art and four-sided perimeter layouts.
//!
//! Both layouts produce the same [`Board`]: a padded character grid for
//! renderers plus the ordered, cyclic path of landable tiles the token moves
//! along.
use crate::constants::ASCII_WALK_GUARD_FACTOR;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Landable tile categories, each identified by a single-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// `s` – loop origin; entering it resets stats and gates level-ups.
    Start,
    /// `c` – lectures, labs and seminars; the only source of credits.
    Class,
    /// `r` – surprise event with mixed effects.
    RandomEvent,
    /// `f` – food and drinks.
    Food,
    /// `t` – hangouts and free time.
    Hangout,
    /// `n` – nothing happens.
    Neutral,
    /// `l` – sponsor tile.
    Special,
}

impl TileKind {
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::Class,
        Self::RandomEvent,
        Self::Food,
        Self::Hangout,
        Self::Neutral,
        Self::Special,
    ];

    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            's' => Some(Self::Start),
            'c' => Some(Self::Class),
            'r' => Some(Self::RandomEvent),
            'f' => Some(Self::Food),
            't' => Some(Self::Hangout),
            'n' => Some(Self::Neutral),
            'l' => Some(Self::Special),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Start => 's',
            Self::Class => 'c',
            Self::RandomEvent => 'r',
            Self::Food => 'f',
            Self::Hangout => 't',
            Self::Neutral => 'n',
            Self::Special => 'l',
        }
    }

    #[must_use]
    pub const fn is_start(self) -> bool {
        matches!(self, Self::Start)
    }

    /// Whether landing here may change the credit balance.
    #[must_use]
    pub const fn earns_credits(self) -> bool {
        matches!(self, Self::Class)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Class => "class",
            Self::RandomEvent => "random_event",
            Self::Food => "food",
            Self::Hangout => "hangout",
            Self::Neutral => "neutral",
            Self::Special => "special",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CORRIDOR_MARKERS: [char; 5] = ['.', '>', '<', '^', 'v'];

/// Right, left, down, up: the ASCII walk tries neighbours in this order.
const NEIGHBOURS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[must_use]
pub fn is_corridor(ch: char) -> bool {
    CORRIDOR_MARKERS.contains(&ch)
}

fn is_walkable(ch: char) -> bool {
    is_corridor(ch) || TileKind::from_code(ch).is_some()
}

/// A landable cell on the board cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub kind: TileKind,
}

/// Four strings describing a rectangle's border, read clockwise from the
/// bottom-left corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BoardSides {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

/// Declarative board description as found in level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoardLayout {
    /// Legacy multi-line art with corridor markers.
    Ascii(String),
    /// Perimeter description.
    Sides(BoardSides),
}

impl From<&str> for BoardLayout {
    fn from(value: &str) -> Self {
        Self::Ascii(value.to_string())
    }
}

impl From<BoardSides> for BoardLayout {
    fn from(value: BoardSides) -> Self {
        Self::Sides(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("start tile 's' not found on board")]
    MissingStart,
    #[error("board has {count} start tiles; exactly one is required")]
    MultipleStarts { count: usize },
    #[error("board sides describe an empty rectangle ({width}x{height})")]
    InvalidSides { width: usize, height: usize },
    #[error("board has no landable tiles")]
    EmptyPath,
}

/// Parsed board: immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    /// Character grid, padded with blanks; presentation only.
    pub grid: Vec<Vec<char>>,
    path: Vec<Tile>,
}

impl Board {
    fn assemble(
        width: usize,
        height: usize,
        grid: Vec<Vec<char>>,
        path: Vec<Tile>,
    ) -> Result<Self, BoardError> {
        if path.is_empty() {
            return Err(BoardError::EmptyPath);
        }
        match path.iter().filter(|tile| tile.kind.is_start()).count() {
            0 => Err(BoardError::MissingStart),
            1 => Ok(Self {
                width,
                height,
                grid,
                path,
            }),
            count => Err(BoardError::MultipleStarts { count }),
        }
    }

    /// Ordered landable tiles; index arithmetic wraps.
    #[must_use]
    pub fn path(&self) -> &[Tile] {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Always false for a parsed board.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.path.get(index)
    }

    /// Index of the start tile within the path.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.path
            .iter()
            .position(|tile| tile.kind.is_start())
            .unwrap_or(0)
    }

    /// One step forward, wrapping past the last tile.
    #[must_use]
    pub fn next_position(&self, position: usize) -> usize {
        (position + 1) % self.path.len()
    }

    /// Pull a possibly stale index back into range.
    #[must_use]
    pub fn clamp_position(&self, position: usize) -> usize {
        position.min(self.path.len().saturating_sub(1))
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> char {
        self.grid
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(' ')
    }

    /// Path index of the tile at a grid coordinate, if landable.
    #[must_use]
    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        self.path.iter().position(|tile| tile.x == x && tile.y == y)
    }
}

/// Parse a board description into a grid and cyclic path.
///
/// # Errors
///
/// Returns a [`BoardError`] when the description has no single start tile or
/// the sides describe an empty rectangle.
pub fn parse_board(layout: &BoardLayout) -> Result<Board, BoardError> {
    match layout {
        BoardLayout::Ascii(text) => parse_ascii(text),
        BoardLayout::Sides(sides) => parse_sides(sides),
    }
}

fn parse_ascii(text: &str) -> Result<Board, BoardError> {
    let rows: Vec<Vec<char>> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).chars().collect())
        .collect();
    let height = rows.len();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let grid: Vec<Vec<char>> = rows
        .into_iter()
        .map(|mut row| {
            row.resize(width, ' ');
            row
        })
        .collect();

    let starts: Vec<(usize, usize)> = grid
        .iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, ch)| **ch == 's')
                .map(move |(x, _)| (x, y))
        })
        .collect();
    let start = match starts.as_slice() {
        [] => return Err(BoardError::MissingStart),
        [only] => *only,
        many => return Err(BoardError::MultipleStarts { count: many.len() }),
    };

    let mut path: Vec<Tile> = Vec::new();
    for (x, y) in walk_corridors(&grid, start) {
        let Some(kind) = TileKind::from_code(grid[y][x]) else {
            continue;
        };
        if path.last().is_some_and(|last| last.x == x && last.y == y) {
            continue;
        }
        path.push(Tile { x, y, kind });
    }
    Board::assemble(width, height, grid, path)
}

fn offset(
    (x, y): (usize, usize),
    (dx, dy): (isize, isize),
    width: usize,
    height: usize,
) -> Option<(usize, usize)> {
    let nx = x.checked_add_signed(dx)?;
    let ny = y.checked_add_signed(dy)?;
    (nx < width && ny < height).then_some((nx, ny))
}

/// Greedy walk from the start cell along corridors and letters.
///
/// Unvisited neighbours are taken in priority order; the walk ends when none
/// remain (the loop closed or dead-ended) or the step guard runs out.
fn walk_corridors(grid: &[Vec<char>], start: (usize, usize)) -> Vec<(usize, usize)> {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    let guard = width * height * ASCII_WALK_GUARD_FACTOR;

    let mut visited = HashSet::from([start]);
    let mut walk = vec![start];
    let mut current = start;
    for _ in 0..guard {
        let walkable: Vec<(usize, usize)> = NEIGHBOURS
            .iter()
            .filter_map(|delta| offset(current, *delta, width, height))
            .filter(|(x, y)| is_walkable(grid[*y][*x]))
            .collect();
        if let Some(next) = walkable.iter().copied().find(|cell| !visited.contains(cell)) {
            visited.insert(next);
            walk.push(next);
            current = next;
            continue;
        }
        let closed = walk.len() > 2 && walkable.contains(&start);
        log::debug!(
            "ascii walk ended after {} cells (closed loop: {closed})",
            walk.len()
        );
        break;
    }
    walk
}

fn parse_sides(sides: &BoardSides) -> Result<Board, BoardError> {
    let bottom: Vec<char> = sides.bottom.trim().chars().collect();
    let right: Vec<char> = sides.right.trim().chars().collect();
    let top: Vec<char> = sides.top.trim().chars().collect();
    let left: Vec<char> = sides.left.trim().chars().collect();

    let width = bottom.len().max(top.len());
    let height = left.len().max(right.len()) + 2;
    if width == 0 {
        return Err(BoardError::InvalidSides { width, height });
    }

    let last_row = height - 1;
    let last_col = width - 1;
    let mut grid = vec![vec![' '; width]; height];
    for (x, ch) in bottom.iter().enumerate() {
        grid[last_row][x] = *ch;
    }
    for (i, ch) in right.iter().enumerate() {
        grid[height - 2 - i][last_col] = *ch;
    }
    for x in 0..width {
        grid[0][x] = top.get(last_col - x).copied().unwrap_or(' ');
    }
    for (i, ch) in left.iter().enumerate() {
        grid[1 + i][0] = *ch;
    }

    let mut ring: Vec<(usize, usize)> = Vec::with_capacity(2 * (width + height));
    ring.extend((0..width).map(|x| (x, last_row)));
    ring.extend((1..last_row).rev().map(|y| (last_col, y)));
    ring.extend((0..width).rev().map(|x| (x, 0)));
    if width > 1 {
        ring.extend((1..last_row).map(|y| (0, y)));
    }

    let mut path: Vec<Tile> = ring
        .into_iter()
        .filter_map(|(x, y)| TileKind::from_code(grid[y][x]).map(|kind| Tile { x, y, kind }))
        .collect();
    if let Some(start) = path.iter().position(|tile| tile.kind.is_start()) {
        path.rotate_left(start);
    }
    Board::assemble(width, height, grid, path)
}
