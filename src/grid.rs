use crate::error::PathfindingError;
use std::fmt;
use std::str::FromStr;

/// A grid coordinate. Equality is coordinate equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Manhattan distance between two cells, saturating at `u32::MAX`.
    pub fn manhattan(self, other: Cell) -> u32 {
        let distance = self
            .row
            .abs_diff(other.row)
            .saturating_add(self.col.abs_diff(other.col));
        u32::try_from(distance).unwrap_or(u32::MAX)
    }

    /// True when the two cells share an edge.
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl FromStr for Cell {
    type Err = String;

    /// Parses `"row,col"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| format!("expected ROW,COL but got '{s}'"))?;
        let row = row
            .trim()
            .parse()
            .map_err(|e| format!("bad row in '{s}': {e}"))?;
        let col = col
            .trim()
            .parse()
            .map_err(|e| format!("bad column in '{s}': {e}"))?;
        Ok(Cell { row, col })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Blocked,
}

/// What `GridModel::query` reports for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Free,
    Blocked,
    Start,
    Goal,
}

/// Cell occupancy plus the start/goal designations. Holds no search state.
///
/// Invariant: a designated start or goal is never blocked. Blocking a
/// designated cell is a no-op; the designation has to be cleared first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridModel {
    width: usize,
    height: usize,
    cells: Vec<Occupancy>,
    start: Option<Cell>,
    goal: Option<Cell>,
}

impl GridModel {
    pub fn new(width: usize, height: usize) -> Result<Self, PathfindingError> {
        if width == 0 || height == 0 {
            return Err(PathfindingError::InvalidDimensions { width, height });
        }
        Ok(GridModel {
            width,
            height,
            cells: vec![Occupancy::Free; width * height],
            start: None,
            goal: None,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    pub fn goal(&self) -> Option<Cell> {
        self.goal
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    fn index(&self, cell: Cell) -> Result<usize, PathfindingError> {
        if self.in_bounds(cell) {
            Ok(cell.row * self.width + cell.col)
        } else {
            Err(PathfindingError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            })
        }
    }

    fn is_designated(&self, cell: Cell) -> bool {
        self.start == Some(cell) || self.goal == Some(cell)
    }

    /// Sets a cell's occupancy. Returns `Ok(false)` without touching the
    /// cell when it is the current start or goal.
    pub fn set_occupancy(
        &mut self,
        cell: Cell,
        state: Occupancy,
    ) -> Result<bool, PathfindingError> {
        let idx = self.index(cell)?;
        if self.is_designated(cell) {
            tracing::debug!(%cell, "ignoring occupancy change on a designated cell");
            return Ok(false);
        }
        self.cells[idx] = state;
        Ok(true)
    }

    pub fn occupancy(&self, cell: Cell) -> Result<Occupancy, PathfindingError> {
        Ok(self.cells[self.index(cell)?])
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        !matches!(self.occupancy(cell), Ok(Occupancy::Free))
    }

    pub fn designate_start(&mut self, cell: Cell) -> Result<(), PathfindingError> {
        self.check_designatable(cell)?;
        self.start = Some(cell);
        Ok(())
    }

    pub fn designate_goal(&mut self, cell: Cell) -> Result<(), PathfindingError> {
        self.check_designatable(cell)?;
        self.goal = Some(cell);
        Ok(())
    }

    fn check_designatable(&self, cell: Cell) -> Result<(), PathfindingError> {
        match self.occupancy(cell)? {
            Occupancy::Free => Ok(()),
            Occupancy::Blocked => Err(PathfindingError::CellBlocked { cell }),
        }
    }

    pub fn clear_start(&mut self) {
        self.start = None;
    }

    pub fn clear_goal(&mut self) {
        self.goal = None;
    }

    /// Start wins over goal when both designate the same cell.
    pub fn query(&self, cell: Cell) -> Result<CellView, PathfindingError> {
        let occupancy = self.occupancy(cell)?;
        Ok(if self.start == Some(cell) {
            CellView::Start
        } else if self.goal == Some(cell) {
            CellView::Goal
        } else {
            match occupancy {
                Occupancy::Free => CellView::Free,
                Occupancy::Blocked => CellView::Blocked,
            }
        })
    }

    /// In-bounds, unblocked neighbors in up, down, left, right order.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut neighbors = Vec::with_capacity(4);
        let (row, col) = (cell.row as isize, cell.col as isize);

        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let nr = row + dr;
            let nc = col + dc;
            if nr < 0 || nc < 0 {
                continue;
            }
            let next = Cell::new(nr as usize, nc as usize);
            if self.in_bounds(next) && !self.is_blocked(next) {
                neighbors.push(next);
            }
        }
        neighbors
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Cell::new(row, col)))
    }

    pub fn blocked_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&c| c == Occupancy::Blocked)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(
            GridModel::new(0, 3),
            Err(PathfindingError::InvalidDimensions { width: 0, height: 3 })
        );
        assert!(GridModel::new(1, 1).is_ok());
    }

    #[test]
    fn manhattan_saturates_on_huge_coordinates() {
        assert_eq!(Cell::new(1, 2).manhattan(Cell::new(4, 0)), 5);
        let far = Cell::new(usize::MAX, usize::MAX);
        assert_eq!(Cell::new(0, 0).manhattan(far), u32::MAX);
        assert!(!Cell::new(0, 0).is_adjacent(far));
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut grid = GridModel::new(3, 2).unwrap();
        let err = grid.set_occupancy(Cell::new(2, 0), Occupancy::Blocked);
        assert_eq!(
            err,
            Err(PathfindingError::OutOfBounds {
                cell: Cell::new(2, 0),
                width: 3,
                height: 2
            })
        );
        assert!(grid.query(Cell::new(0, 3)).is_err());
    }

    #[test]
    fn blocking_a_designated_cell_is_a_no_op() {
        let mut grid = GridModel::new(3, 3).unwrap();
        grid.designate_start(Cell::new(0, 0)).unwrap();
        grid.designate_goal(Cell::new(2, 2)).unwrap();

        assert_eq!(grid.set_occupancy(Cell::new(0, 0), Occupancy::Blocked), Ok(false));
        assert_eq!(grid.set_occupancy(Cell::new(2, 2), Occupancy::Blocked), Ok(false));
        assert_eq!(grid.query(Cell::new(0, 0)), Ok(CellView::Start));
        assert_eq!(grid.query(Cell::new(2, 2)), Ok(CellView::Goal));

        grid.clear_goal();
        assert_eq!(grid.set_occupancy(Cell::new(2, 2), Occupancy::Blocked), Ok(true));
        assert_eq!(grid.query(Cell::new(2, 2)), Ok(CellView::Blocked));
    }

    #[test]
    fn designation_on_blocked_cell_fails() {
        let mut grid = GridModel::new(2, 2).unwrap();
        grid.set_occupancy(Cell::new(1, 1), Occupancy::Blocked).unwrap();
        assert_eq!(
            grid.designate_goal(Cell::new(1, 1)),
            Err(PathfindingError::CellBlocked { cell: Cell::new(1, 1) })
        );
        assert_eq!(grid.goal(), None);
    }

    #[test]
    fn redesignating_moves_the_mark() {
        let mut grid = GridModel::new(3, 1).unwrap();
        grid.designate_start(Cell::new(0, 0)).unwrap();
        grid.designate_start(Cell::new(0, 2)).unwrap();
        assert_eq!(grid.start(), Some(Cell::new(0, 2)));
        assert_eq!(grid.query(Cell::new(0, 0)), Ok(CellView::Free));
        grid.clear_start();
        grid.clear_start();
        assert_eq!(grid.start(), None);
    }

    #[test]
    fn neighbors_skip_walls_and_edges() {
        let mut grid = GridModel::new(3, 3).unwrap();
        grid.set_occupancy(Cell::new(0, 1), Occupancy::Blocked).unwrap();
        assert_eq!(grid.neighbors(Cell::new(0, 0)), vec![Cell::new(1, 0)]);
        assert_eq!(
            grid.neighbors(Cell::new(1, 1)),
            vec![Cell::new(2, 1), Cell::new(1, 0), Cell::new(1, 2)]
        );
    }

    #[test]
    fn parses_row_col_pairs() {
        assert_eq!("3,4".parse::<Cell>(), Ok(Cell::new(3, 4)));
        assert_eq!(" 0 , 7".parse::<Cell>(), Ok(Cell::new(0, 7)));
        assert!("3".parse::<Cell>().is_err());
        assert!("a,1".parse::<Cell>().is_err());
    }
}
