use std::{
    fmt::{self, Write},
    ops::{Index, IndexMut},
};

use thiserror::Error;

/// A `(row, col)` coordinate on a square grid, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("position ({row}, {col}) is outside of a {dimension}x{dimension} grid")]
pub struct OutOfRange {
    pub row: usize,
    pub col: usize,
    pub dimension: usize,
}

/// A fixed size `dimension x dimension` container stored in row-major order.
///
/// The grid knows nothing about the game; see [`Board`] for the tile specific helpers.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SquareGrid<T> {
    dimension: usize,
    cells: Vec<T>,
}

impl<T: Clone> SquareGrid<T> {
    pub fn new(dimension: usize, initial: T) -> Self {
        Self {
            dimension,
            cells: vec![initial; dimension * dimension],
        }
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> SquareGrid<T> {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize, OutOfRange> {
        if row < self.dimension && col < self.dimension {
            Ok(row * self.dimension + col)
        } else {
            Err(OutOfRange {
                row,
                col,
                dimension: self.dimension,
            })
        }
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<&T, OutOfRange> {
        let offset = self.offset(row, col)?;
        Ok(&self.cells[offset])
    }

    pub fn try_set(&mut self, row: usize, col: usize, value: T) -> Result<(), OutOfRange> {
        let offset = self.offset(row, col)?;
        self.cells[offset] = value;
        Ok(())
    }

    /// # Panics
    /// Panics if `row` or `col` is not below the grid dimension.
    pub fn get(&self, row: usize, col: usize) -> &T {
        match self.try_get(row, col) {
            Ok(cell) => cell,
            Err(err) => panic!("{err}"),
        }
    }

    /// # Panics
    /// Panics if `row` or `col` is not below the grid dimension.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        if let Err(err) = self.try_set(row, col, value) {
            panic!("{err}")
        }
    }

    /// Every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<T> {
        let dimension = self.dimension;
        (0..dimension).flat_map(move |row| (0..dimension).map(move |col| Position::new(row, col)))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.dimension.max(1))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        self.positions().zip(self.cells.iter())
    }
}

impl<T> Index<Position> for SquareGrid<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        self.get(pos.row, pos.col)
    }
}

impl<T> IndexMut<Position> for SquareGrid<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        match self.offset(pos.row, pos.col) {
            Ok(offset) => &mut self.cells[offset],
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SquareGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rows = self.rows();

        if let Some(row) = rows.next() {
            row.iter().try_for_each(|c| write!(f, "{c:?} "))?
        }

        for row in rows {
            f.write_char('\n')?;
            row.iter().try_for_each(|c| write!(f, "{c:?} "))?
        }

        Ok(())
    }
}

/// Content of one board position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Tile(u32),
}

impl Cell {
    pub fn value(self) -> Option<u32> {
        match self {
            Cell::Empty => None,
            Cell::Tile(v) => Some(v),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<u32> for Cell {
    /// `0` maps to [`Cell::Empty`].
    fn from(value: u32) -> Self {
        match value {
            0 => Cell::Empty,
            v => Cell::Tile(v),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.pad("."),
            Cell::Tile(v) => f.pad(&v.to_string()),
        }
    }
}

pub type Board = SquareGrid<Cell>;

impl SquareGrid<Cell> {
    pub fn empty(dimension: usize) -> Self {
        Self::new(dimension, Cell::Empty)
    }

    /// Build a board from rows of tile values, `0` meaning empty.
    ///
    /// # Panics
    /// Panics if the rows do not form a square.
    pub fn from_values<R: AsRef<[u32]>>(rows: &[R]) -> Self {
        let dimension = rows.len();
        let cells = rows
            .iter()
            .flat_map(|row| {
                let row = row.as_ref();
                assert_eq!(row.len(), dimension, "board rows must form a square");
                row.iter().copied().map(Cell::from)
            })
            .collect();

        Self { dimension, cells }
    }

    /// Inverse of [`Board::from_values`].
    pub fn to_values(&self) -> Vec<Vec<u32>> {
        self.rows()
            .map(|row| row.iter().map(|c| c.value().unwrap_or(0)).collect())
            .collect()
    }

    /// Positions of all empty cells, in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.iter()
            .filter_map(|(pos, cell)| cell.is_empty().then_some(pos))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }
}

impl fmt::Display for SquareGrid<Cell> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .cells
            .iter()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);

        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }

            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    f.write_char(' ')?;
                }
                write!(f, "{cell:>width$}")?;
            }
        }

        Ok(())
    }
}

pub mod test_utils {
    use rand::Rng;
    use rand::seq::{IndexedRandom as _, SliceRandom};

    use super::{Board, Cell};

    /// A line with `filled` distinct powers of two plus `duplicates` extra copies of them,
    /// shuffled among empty cells. Cells beyond `len` are discarded.
    pub fn generate_random_line(
        rng: &mut impl Rng,
        len: usize,
        filled: u32,
        duplicates: u32,
    ) -> Vec<Cell> {
        let mut values: Vec<u32> = (1..filled + 1).map(|exp| 1 << exp).collect();

        // Add duplicates
        if !values.is_empty() {
            let duplicates: Vec<u32> = (0..duplicates)
                .filter_map(|_| values.choose(rng).copied())
                .collect();

            values.extend(duplicates);
        }

        values.resize(len.max(values.len()), 0);
        values.shuffle(rng);
        values.truncate(len);

        values.into_iter().map(Cell::from).collect()
    }

    pub fn generate_random_board(
        rng: &mut impl Rng,
        dimension: usize,
        filled: u32,
        duplicates: u32,
    ) -> Board {
        let cells = generate_random_line(rng, dimension * dimension, filled, duplicates);
        let rows: Vec<Vec<u32>> = cells
            .chunks(dimension)
            .map(|row| row.iter().map(|c| c.value().unwrap_or(0)).collect())
            .collect();

        Board::from_values(&rows)
    }

    /// Straightforward single-pass slide toward index 0. Returns the new line and the
    /// points gained.
    pub fn reference_slide(line: &[Cell]) -> (Vec<Cell>, u64) {
        let mut out = Vec::with_capacity(line.len());
        let mut score = 0;
        let mut mergeable = false;

        for value in line.iter().filter_map(|c| c.value()) {
            match out.last_mut() {
                Some(Cell::Tile(last)) if mergeable && *last == value => {
                    *last += value;
                    score += u64::from(*last);
                    mergeable = false;
                }
                _ => {
                    out.push(Cell::Tile(value));
                    mergeable = true;
                }
            }
        }

        out.resize(line.len(), Cell::Empty);
        (out, score)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut grid = SquareGrid::new(3, 0u8);
        grid.set(2, 1, 7);

        assert_eq!(*grid.get(2, 1), 7);
        assert_eq!(grid[Position::new(2, 1)], 7);
        assert_eq!(grid.try_get(1, 2), Ok(&0));
    }

    #[test]
    fn test_out_of_range() {
        let mut grid = SquareGrid::new(2, 'x');
        assert_eq!(
            grid.try_get(2, 0),
            Err(OutOfRange {
                row: 2,
                col: 0,
                dimension: 2
            })
        );
        assert!(grid.try_set(0, 5, 'y').is_err());
        assert_eq!(grid.rows().flatten().collect::<String>(), "xxxx");
    }

    #[test]
    #[should_panic(expected = "outside of a 4x4 grid")]
    fn test_get_out_of_range_panics() {
        let board = Board::empty(4);
        board.get(0, 4);
    }

    #[test]
    #[should_panic(expected = "outside of a 2x2 grid")]
    fn test_set_out_of_range_panics() {
        let mut board = Board::empty(2);
        board.set(2, 2, Cell::Tile(2));
    }

    #[test]
    fn test_fill() {
        let mut board = Board::from_values(&[[2, 4], [8, 0]]);
        board.fill(Cell::Empty);
        assert_eq!(board, Board::empty(2));
        assert_eq!(board.empty_positions().len(), 4);
    }

    #[test]
    fn test_empty_positions_row_major() {
        let board = Board::from_values(&[[0, 2, 0], [4, 4, 4], [2, 0, 8]]);
        assert_eq!(board.empty_positions(), vec![
            Position::new(0, 0),
            Position::new(0, 2),
            Position::new(2, 1),
        ]);
        assert!(!board.is_full());
    }

    #[test]
    fn test_full_board() {
        let board = Board::from_values(&[[2, 4], [8, 16]]);
        assert!(board.empty_positions().is_empty());
        assert!(board.is_full());
    }

    #[test]
    fn test_values_roundtrip_and_display() {
        let rows = vec![vec![0, 2, 0], vec![4, 128, 4], vec![2, 0, 8]];
        let board = Board::from_values(&rows);
        assert_eq!(board.to_values(), rows);
        assert_eq!(board.to_string(), "  .   2   .\n  4 128   4\n  2   .   8");
    }

    #[test]
    fn test_reference_slide() {
        let line: Vec<Cell> = [2, 2, 2, 2].map(Cell::from).to_vec();
        let (out, score) = test_utils::reference_slide(&line);
        assert_eq!(out, [4, 4, 0, 0].map(Cell::from).to_vec());
        assert_eq!(score, 8);

        let line: Vec<Cell> = [0, 4, 2, 2].map(Cell::from).to_vec();
        let (out, score) = test_utils::reference_slide(&line);
        assert_eq!(out, [4, 4, 0, 0].map(Cell::from).to_vec());
        assert_eq!(score, 4);
    }
}
