//! Field grid: the spatial index of defenders by cell.

use hecs::Entity;

use greenline_core::error::PlacementError;

/// Fixed-size row/column index holding at most one defender per cell.
///
/// The grid stores hecs handles only. It is a live index, never persisted;
/// restoring a session rebuilds it from the defender list.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    rows: usize,
    columns: usize,
    cells: Vec<Option<Entity>>,
}

impl FieldGrid {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![None; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn in_bounds(&self, row: usize, column: usize) -> bool {
        row < self.rows && column < self.columns
    }

    /// Check that a cell exists and is free.
    pub fn check_free(&self, row: usize, column: usize) -> Result<(), PlacementError> {
        match self.slot(row, column) {
            None => Err(PlacementError::OutOfBounds { row, column }),
            Some(Some(_)) => Err(PlacementError::Occupied { row, column }),
            Some(None) => Ok(()),
        }
    }

    /// Occupy a free cell with the entity built by `make`.
    ///
    /// `make` runs only once the cell is known to be free, so a rejected
    /// placement never creates anything.
    pub fn place(
        &mut self,
        row: usize,
        column: usize,
        make: impl FnOnce() -> Entity,
    ) -> Result<Entity, PlacementError> {
        self.check_free(row, column)?;
        let entity = make();
        self.cells[row * self.columns + column] = Some(entity);
        Ok(entity)
    }

    pub fn defender_at(&self, row: usize, column: usize) -> Option<Entity> {
        self.slot(row, column).flatten()
    }

    /// Leftmost occupied cell of a row, as `(column, entity)`.
    pub fn first_defender_in_row(&self, row: usize) -> Option<(usize, Entity)> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.columns;
        self.cells[start..start + self.columns]
            .iter()
            .enumerate()
            .find_map(|(column, slot)| slot.map(|entity| (column, entity)))
    }

    /// Empty a cell, returning what it held.
    pub fn clear(&mut self, row: usize, column: usize) -> Option<Entity> {
        if !self.in_bounds(row, column) {
            return None;
        }
        self.cells[row * self.columns + column].take()
    }

    /// Empty a cell only if it still holds `entity`.
    pub fn clear_if(&mut self, row: usize, column: usize, entity: Entity) -> bool {
        if self.defender_at(row, column) == Some(entity) {
            self.clear(row, column);
            true
        } else {
            false
        }
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    fn slot(&self, row: usize, column: usize) -> Option<Option<Entity>> {
        if self.in_bounds(row, column) {
            Some(self.cells[row * self.columns + column])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|i| world.spawn((i as u32,))).collect()
    }

    #[test]
    fn test_new_grid_is_empty_with_field_dimensions() {
        let grid = FieldGrid::new(5, 9);
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.columns(), 9);
        assert_eq!(grid.occupied(), 0);
        assert!(grid.in_bounds(4, 8));
        assert!(!grid.in_bounds(5, 8));
        assert!(!grid.in_bounds(4, 9));
    }

    #[test]
    fn test_place_and_lookup() {
        let e = entities(1);
        let mut grid = FieldGrid::new(5, 9);
        let placed = grid.place(2, 3, || e[0]).unwrap();
        assert_eq!(placed, e[0]);
        assert_eq!(grid.defender_at(2, 3), Some(e[0]));
        assert_eq!(grid.defender_at(3, 2), None);
        assert_eq!(grid.occupied(), 1);
    }

    #[test]
    fn test_occupied_cell_rejected_without_building() {
        let e = entities(2);
        let mut grid = FieldGrid::new(5, 9);
        grid.place(0, 0, || e[0]).unwrap();

        let mut built = false;
        let err = grid
            .place(0, 0, || {
                built = true;
                e[1]
            })
            .unwrap_err();
        assert_eq!(err, PlacementError::Occupied { row: 0, column: 0 });
        assert!(!built, "factory must not run for a rejected placement");
        assert_eq!(grid.defender_at(0, 0), Some(e[0]));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let e = entities(1);
        let mut grid = FieldGrid::new(5, 9);
        assert_eq!(
            grid.place(5, 0, || e[0]).unwrap_err(),
            PlacementError::OutOfBounds { row: 5, column: 0 }
        );
        assert_eq!(
            grid.place(0, 9, || e[0]).unwrap_err(),
            PlacementError::OutOfBounds { row: 0, column: 9 }
        );
        assert_eq!(grid.occupied(), 0);
        assert_eq!(grid.defender_at(7, 7), None);
    }

    #[test]
    fn test_first_defender_in_row_is_leftmost() {
        let e = entities(3);
        let mut grid = FieldGrid::new(5, 9);
        grid.place(1, 6, || e[0]).unwrap();
        grid.place(1, 2, || e[1]).unwrap();
        grid.place(2, 0, || e[2]).unwrap();

        assert_eq!(grid.first_defender_in_row(1), Some((2, e[1])));
        assert_eq!(grid.first_defender_in_row(2), Some((0, e[2])));
        assert_eq!(grid.first_defender_in_row(0), None);
        assert_eq!(grid.first_defender_in_row(99), None);
    }

    #[test]
    fn test_clear_frees_cell() {
        let e = entities(2);
        let mut grid = FieldGrid::new(5, 9);
        grid.place(4, 8, || e[0]).unwrap();
        assert_eq!(grid.clear(4, 8), Some(e[0]));
        assert_eq!(grid.defender_at(4, 8), None);
        assert!(grid.place(4, 8, || e[1]).is_ok());
    }

    #[test]
    fn test_clear_if_ignores_replaced_entity() {
        let e = entities(2);
        let mut grid = FieldGrid::new(5, 9);
        grid.place(0, 1, || e[1]).unwrap();
        assert!(!grid.clear_if(0, 1, e[0]));
        assert_eq!(grid.defender_at(0, 1), Some(e[1]));
        assert!(grid.clear_if(0, 1, e[1]));
        assert_eq!(grid.occupied(), 0);
    }
}
