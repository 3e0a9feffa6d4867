//! Cell storage splits the image into a grid of equally sized blocks (the cells along the upper
//! border of a dimension may be smaller). Cells are stored one after another in grid order, and
//! each cell is a small array with dimension 0 fastest. Iterating the flat buffer therefore
//! visits the image cell by cell.

use crate::img::layout::{Layout, strides_for, validate_dimensions};
use crate::{ImgError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLayout {
    dimensions: Vec<usize>,
    cell_dimensions: Vec<usize>,
    grid_dimensions: Vec<usize>,
    grid_strides: Vec<usize>,

    /// Start of each cell in the flat buffer, plus a final entry with the total element count
    cell_offsets: Vec<usize>,
}

impl CellLayout {
    /// Create a cell layout for an image of `dimensions`, split into cells of `cell_size`. A
    /// single entry in `cell_size` is used for every dimension.
    pub fn new(dimensions: &[usize], cell_size: &[usize]) -> Result<Self> {
        validate_dimensions(dimensions)?;

        let cell_dimensions = match cell_size.len() {
            1 => vec![cell_size[0]; dimensions.len()],
            n if n == dimensions.len() => cell_size.to_vec(),
            n => return Err(ImgError::dimension_mismatch("cell size", dimensions.len(), n)),
        };
        if cell_dimensions.contains(&0) {
            return Err(ImgError::InvalidDimension(
                "cell extents must be positive".into(),
            ));
        }

        let grid_dimensions: Vec<usize> = dimensions
            .iter()
            .zip(cell_dimensions.iter())
            .map(|(&s, &c)| s.div_ceil(c))
            .collect();
        let grid_strides = strides_for(&grid_dimensions);

        let mut layout = Self {
            dimensions: dimensions.to_vec(),
            cell_dimensions,
            grid_dimensions,
            grid_strides,
            cell_offsets: Vec::new(),
        };

        let num_cells: usize = layout.grid_dimensions.iter().product();
        let mut offsets = Vec::with_capacity(num_cells + 1);
        let mut grid_pos = vec![0usize; layout.num_dimensions()];
        let mut total = 0;
        for cell in 0..num_cells {
            layout.grid_position(cell, &mut grid_pos);
            offsets.push(total);
            total += grid_pos
                .iter()
                .enumerate()
                .map(|(d, &g)| layout.cell_extent(d, g))
                .product::<usize>();
        }
        offsets.push(total);
        layout.cell_offsets = offsets;

        Ok(layout)
    }

    pub fn cell_dimensions(&self) -> &[usize] {
        &self.cell_dimensions
    }

    pub fn grid_dimensions(&self) -> &[usize] {
        &self.grid_dimensions
    }

    pub fn num_cells(&self) -> usize {
        self.cell_offsets.len() - 1
    }

    /// The range of linear indices occupied by one cell.
    pub fn cell_range(&self, cell: usize) -> std::ops::Range<usize> {
        self.cell_offsets[cell]..self.cell_offsets[cell + 1]
    }

    fn grid_position(&self, cell: usize, out: &mut [usize]) {
        let mut rest = cell;
        for (o, &g) in out.iter_mut().zip(self.grid_dimensions.iter()) {
            *o = rest % g;
            rest /= g;
        }
    }

    /// The extent along `d` of the cells in grid slab `g`, clipped at the image border.
    fn cell_extent(&self, d: usize, g: usize) -> usize {
        let start = g * self.cell_dimensions[d];
        self.cell_dimensions[d].min(self.dimensions[d] - start)
    }

    fn cell_of_index(&self, index: usize) -> usize {
        // The last offset entry is the total, so the owning cell is the last start <= index
        self.cell_offsets.partition_point(|&start| start <= index) - 1
    }
}

impl Layout for CellLayout {
    fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    fn num_elements(&self) -> usize {
        self.cell_offsets[self.cell_offsets.len() - 1]
    }

    fn index_of(&self, position: &[i64]) -> usize {
        let mut cell = 0;
        let mut inner = 0;
        let mut stride = 1;
        for d in 0..self.dimensions.len() {
            let p = position[d] as usize;
            let g = p / self.cell_dimensions[d];
            cell += g * self.grid_strides[d];
            inner += (p - g * self.cell_dimensions[d]) * stride;
            stride *= self.cell_extent(d, g);
        }

        self.cell_offsets[cell] + inner
    }

    fn localize_index(&self, index: usize, out: &mut [i64]) {
        let cell = self.cell_of_index(index);
        let mut rest = index - self.cell_offsets[cell];
        for d in 0..self.dimensions.len() {
            let g = (cell / self.grid_strides[d]) % self.grid_dimensions[d];
            let extent = self.cell_extent(d, g);
            out[d] = (g * self.cell_dimensions[d] + rest % extent) as i64;
            rest /= extent;
        }
    }

    fn position_of(&self, index: usize, d: usize) -> i64 {
        let cell = self.cell_of_index(index);
        let mut rest = index - self.cell_offsets[cell];
        for k in 0..=d {
            let g = (cell / self.grid_strides[k]) % self.grid_dimensions[k];
            let extent = self.cell_extent(k, g);
            if k == d {
                return (g * self.cell_dimensions[k] + rest % extent) as i64;
            }
            rest /= extent;
        }
        0
    }

    fn step_position(&self, _index: usize, position: &mut [i64]) {
        // Carry inside the current cell
        for d in 0..self.dimensions.len() {
            let p = position[d] as usize;
            let g = p / self.cell_dimensions[d];
            let origin = g * self.cell_dimensions[d];
            if p + 1 < origin + self.cell_extent(d, g) {
                position[d] += 1;
                return;
            }
            position[d] = origin as i64;
        }

        // The cell is done, move to the origin of the next cell in grid order
        for d in 0..self.dimensions.len() {
            let g = position[d] as usize / self.cell_dimensions[d] + 1;
            if g < self.grid_dimensions[d] {
                position[d] = (g * self.cell_dimensions[d]) as i64;
                return;
            }
            position[d] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn offsets_cover_all_elements() -> Result<()> {
        let layout = CellLayout::new(&[5, 3], &[2])?;
        assert_eq!(layout.grid_dimensions(), &[3, 2]);
        assert_eq!(layout.num_cells(), 6);
        assert_eq!(layout.num_elements(), 15);

        // Cells along the upper x border are 1 wide, along the upper y border are 1 tall
        assert_eq!(layout.cell_range(0), 0..4);
        assert_eq!(layout.cell_range(2), 8..10);
        assert_eq!(layout.cell_range(5), 14..15);
        Ok(())
    }

    #[test]
    fn iteration_is_cell_by_cell() -> Result<()> {
        let layout = CellLayout::new(&[4, 2], &[2, 2])?;
        let mut pos = vec![0; 2];
        let order = (0..layout.num_elements())
            .map(|i| {
                layout.localize_index(i, &mut pos);
                (pos[0], pos[1])
            })
            .collect::<Vec<_>>();

        assert_eq!(
            order,
            vec![
                (0, 0),
                (1, 0),
                (0, 1),
                (1, 1),
                (2, 0),
                (3, 0),
                (2, 1),
                (3, 1)
            ]
        );
        Ok(())
    }

    #[test]
    fn index_round_trip_with_partial_cells() -> Result<()> {
        let layout = CellLayout::new(&[7, 5, 3], &[3, 2, 2])?;
        let mut seen = vec![false; layout.num_elements()];
        let mut back = vec![0; 3];

        for (x, y, z) in (0..7i64).cartesian_product(0..5i64).cartesian_product(0..3i64).map(
            |((x, y), z)| (x, y, z),
        ) {
            let i = layout.index_of(&[x, y, z]);
            assert!(!seen[i], "index {i} produced twice");
            seen[i] = true;

            layout.localize_index(i, &mut back);
            assert_eq!(back, vec![x, y, z]);
        }
        assert!(seen.iter().all(|&s| s));
        Ok(())
    }

    #[test]
    fn step_matches_localize() -> Result<()> {
        let layout = CellLayout::new(&[7, 5, 3], &[3, 2, 2])?;
        let mut stepped = vec![0; 3];
        let mut expected = vec![0; 3];
        for i in 1..layout.num_elements() {
            layout.step_position(i, &mut stepped);
            layout.localize_index(i, &mut expected);
            assert_eq!(stepped, expected, "index {i}");
            for d in 0..3 {
                assert_eq!(layout.position_of(i, d), expected[d]);
            }
        }
        Ok(())
    }

    #[test]
    fn cell_size_dimension_mismatch() {
        let r = CellLayout::new(&[4, 4, 4], &[2, 2]);
        assert!(matches!(r, Err(ImgError::InvalidDimension(_))));
    }
}
