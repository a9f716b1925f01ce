//! Board module - the playfield grid
//!
//! A `width x height` grid of cells stored row-major in one flat vector for
//! cache locality. Coordinates are `(x, y)` with x growing right and y growing
//! down; row 0 is the top of the playfield. The standard board is 10x20.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pieces::Tetromino;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, MAX_BOARD_DIM, MIN_BOARD_DIM};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty board of the given size
    pub fn new(width: u8, height: u8) -> Result<Self, CoreError> {
        let dims = MIN_BOARD_DIM..=MAX_BOARD_DIM;
        if !dims.contains(&width) || !dims.contains(&height) {
            return Err(CoreError::InvalidBoardDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
        })
    }

    /// Empty 10x20 board
    pub fn standard() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            cells: vec![Cell::Empty; BOARD_WIDTH as usize * BOARD_HEIGHT as usize],
        }
    }

    /// Build a board from text rows, top row first
    ///
    /// `.` is an empty cell; any other character is occupied. Letters naming a
    /// piece kind keep that color id, everything else becomes `I`.
    ///
    /// ```
    /// use stackfall_core::Board;
    ///
    /// let board = Board::from_rows(&[
    ///     "....",
    ///     "....",
    ///     "....",
    ///     "TT.T",
    /// ]).unwrap();
    /// assert!(board.cell_at(0, 3).unwrap().is_occupied());
    /// assert!(board.cell_at(2, 3).unwrap().is_empty());
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self, CoreError> {
        let height = u8::try_from(rows.len()).unwrap_or(u8::MAX);
        let width = rows
            .first()
            .map(|r| u8::try_from(r.chars().count()).unwrap_or(u8::MAX))
            .unwrap_or(0);
        if rows.iter().any(|r| r.chars().count() != width as usize) {
            return Err(CoreError::InvalidBoardDimensions { width, height });
        }

        let mut board = Self::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch != '.' {
                    let kind = PieceKind::from_str(&ch.to_string()).unwrap_or(PieceKind::I);
                    board.set(x as i8, y as i8, Cell::Occupied(kind));
                }
            }
        }
        Ok(board)
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || y < 0 || x as u8 >= self.width || y as u8 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Cell at (x, y), `None` when out of bounds
    pub fn cell_at(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// In bounds and empty
    pub fn is_empty_cell(&self, x: i8, y: i8) -> bool {
        matches!(self.cell_at(x, y), Some(Cell::Empty))
    }

    fn row(&self, y: usize) -> &[Cell] {
        let start = y * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Row completely filled; false for rows outside the board
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        self.row(y).iter().all(Cell::is_occupied)
    }

    /// Indices of full rows, scanned top to bottom
    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.height as usize)
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Remove full rows and compact everything above them downward.
    ///
    /// Each surviving row moves down by the number of cleared rows below it.
    /// Returns the cleared row indices (top to bottom, pre-compaction).
    pub fn clear_full_rows(&mut self) -> Vec<usize> {
        let cleared = self.full_rows();
        if cleared.is_empty() {
            return cleared;
        }

        let width = self.width as usize;
        let mut write_y = self.height as usize;

        // Two-pointer sweep from the bottom; copy_within handles overlap.
        for read_y in (0..self.height as usize).rev() {
            if self.is_row_full(read_y) {
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * width;
                self.cells.copy_within(src..src + width, write_y * width);
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = Cell::Empty;
        }

        cleared
    }

    /// Write the piece's blocks into the board.
    ///
    /// Fails without touching the board if any block is out of bounds or
    /// lands on an occupied cell.
    pub fn stamp(&mut self, piece: &Tetromino) -> Result<(), CoreError> {
        let blocks = piece.blocks();
        if !blocks.iter().all(|&(x, y)| self.is_empty_cell(x, y)) {
            return Err(CoreError::LockCollision {
                kind: piece.kind,
                x: piece.x,
                y: piece.y,
            });
        }
        for (x, y) in blocks {
            self.set(x, y, Cell::Occupied(piece.kind));
        }
        Ok(())
    }

    /// Copy of this board with the piece stamped in
    pub fn with_piece_stamped(&self, piece: &Tetromino) -> Result<Board, CoreError> {
        let mut next = self.clone();
        next.stamp(piece)?;
        Ok(next)
    }

    /// Height of the stack in a column (0 when the column is empty)
    pub fn column_height(&self, x: i8) -> u8 {
        (0..self.height as i8)
            .find(|&y| matches!(self.cell_at(x, y), Some(Cell::Occupied(_))))
            .map(|top| self.height - top as u8)
            .unwrap_or(0)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rotation;

    #[test]
    fn index_calculation() {
        let board = Board::standard();
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(9, 0), Some(9));
        assert_eq!(board.index(0, 1), Some(10));
        assert_eq!(board.index(9, 19), Some(199));
        assert_eq!(board.index(-1, 0), None);
        assert_eq!(board.index(10, 0), None);
        assert_eq!(board.index(0, 20), None);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(Board::new(3, 20).is_err());
        assert!(Board::new(10, 65).is_err());
        assert!(Board::new(6, 12).is_ok());
    }

    #[test]
    fn compaction_moves_rows_by_cleared_count_below() {
        let mut board = Board::from_rows(&[
            "....",
            "T...",
            "IIII",
            ".S..",
            "IIII",
        ])
        .unwrap();

        let cleared = board.clear_full_rows();
        assert_eq!(cleared, vec![2, 4]);

        // "T..." had two cleared rows below it, ".S.." had one.
        assert_eq!(board.cell_at(0, 3), Some(Cell::Occupied(PieceKind::T)));
        assert_eq!(board.cell_at(1, 4), Some(Cell::Occupied(PieceKind::S)));
        assert_eq!(board.occupied_count(), 2);
    }

    #[test]
    fn stamp_is_all_or_nothing() {
        let mut board = Board::standard();
        board.set(4, 1, Cell::Occupied(PieceKind::O));

        let piece = Tetromino {
            kind: PieceKind::I,
            rotation: Rotation::North,
            x: 3,
            y: 0,
        };
        assert!(board.stamp(&piece).is_err());
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn with_piece_stamped_leaves_original_untouched() {
        let board = Board::standard();
        let piece = Tetromino::spawn(PieceKind::O, board.width());

        let stamped = board.with_piece_stamped(&piece).unwrap();
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(stamped.occupied_count(), 4);
    }

    #[test]
    fn column_height_counts_from_floor() {
        let board = Board::from_rows(&["....", "..Z.", "....", "I..."]).unwrap();
        assert_eq!(board.column_height(0), 1);
        assert_eq!(board.column_height(2), 3);
        assert_eq!(board.column_height(1), 0);
    }
}
