use crate::grid::{Cell, GridModel};
use pathfinding::prelude::astar;

/// Optimal start-to-goal path on `grid`, computed independently of the
/// incremental engine with the `pathfinding` crate. `None` when start or
/// goal is missing or no path exists.
pub fn optimal_path(grid: &GridModel) -> Option<(Vec<Cell>, u32)> {
    let start = grid.start()?;
    let goal = grid.goal()?;
    astar(
        &start,
        |cell| grid.neighbors(*cell).into_iter().map(|next| (next, 1)),
        |cell| cell.manhattan(goal),
        |cell| *cell == goal,
    )
}

/// Cost of the optimal path, if one exists.
pub fn optimal_cost(grid: &GridModel) -> Option<u32> {
    optimal_path(grid).map(|(_, cost)| cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Occupancy;

    #[test]
    fn open_grid_cost_is_manhattan() {
        let mut grid = GridModel::new(4, 4).unwrap();
        grid.designate_start(Cell::new(0, 0)).unwrap();
        grid.designate_goal(Cell::new(3, 3)).unwrap();
        assert_eq!(optimal_cost(&grid), Some(6));
    }

    #[test]
    fn detour_and_dead_end() {
        let mut grid = GridModel::new(3, 3).unwrap();
        grid.designate_start(Cell::new(0, 0)).unwrap();
        grid.designate_goal(Cell::new(0, 2)).unwrap();
        grid.set_occupancy(Cell::new(0, 1), Occupancy::Blocked).unwrap();
        assert_eq!(optimal_cost(&grid), Some(4));

        grid.set_occupancy(Cell::new(1, 1), Occupancy::Blocked).unwrap();
        grid.set_occupancy(Cell::new(2, 1), Occupancy::Blocked).unwrap();
        assert_eq!(optimal_cost(&grid), None);

        grid.clear_goal();
        assert_eq!(optimal_path(&grid), None);
    }
}
