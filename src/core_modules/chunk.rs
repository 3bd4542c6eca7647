// THEORY:
// The `Chunk` module defines the spatial partition of the frame canvas. The canvas is
// cut into `vertical_divisions x horizontal_divisions` rectangular blocks, all of the
// same size. Block size comes from integer division of the image size by the
// division counts, so when the image does not divide evenly the last few rows and
// columns belong to no block at all. Those pixels are never sampled and never
// tinted. This truncation is intentional and must be preserved.
//
// Key architectural principles:
// 1.  **Pure Geometry**: `BlockGrid` owns no pixel data. It only answers "where is
//     block (row, col)?" so the sampler and the renderer agree on the same extents.
// 2.  **Validated Once**: A grid is only constructed when every block contains at
//     least one pixel. Everything downstream can rely on non-empty extents.

pub mod chunk {
    use crate::error::{HeatmapError, HeatmapResult};

    /// The pixel rectangle covered by one block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BlockExtent {
        /// First pixel row of the block.
        pub top: u32,
        /// First pixel column of the block.
        pub left: u32,
        pub height: u32,
        pub width: u32,
    }

    impl BlockExtent {
        /// Whether `(pixel_row, pixel_col)` lies inside this block.
        pub fn contains(&self, pixel_row: u32, pixel_col: u32) -> bool {
            pixel_row >= self.top
                && pixel_row < self.top + self.height
                && pixel_col >= self.left
                && pixel_col < self.left + self.width
        }
    }

    /// The fixed partition of an image canvas into equally sized blocks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BlockGrid {
        /// Number of block rows.
        pub vertical_divisions: u32,
        /// Number of block columns.
        pub horizontal_divisions: u32,
        /// Height of one block in pixels (image_height / vertical_divisions).
        pub block_height: u32,
        /// Width of one block in pixels (image_width / horizontal_divisions).
        pub block_width: u32,
    }

    impl BlockGrid {
        pub fn new(
            image_height: u32,
            image_width: u32,
            vertical_divisions: u32,
            horizontal_divisions: u32,
        ) -> HeatmapResult<Self> {
            if vertical_divisions == 0 || horizontal_divisions == 0 {
                return Err(HeatmapError::InvalidConfig(format!(
                    "division counts must be positive, got {vertical_divisions}x{horizontal_divisions}"
                )));
            }
            if vertical_divisions > image_height || horizontal_divisions > image_width {
                return Err(HeatmapError::InvalidConfig(format!(
                    "{vertical_divisions}x{horizontal_divisions} divisions do not fit a {image_width}x{image_height} image"
                )));
            }

            Ok(Self {
                vertical_divisions,
                horizontal_divisions,
                block_height: image_height / vertical_divisions,
                block_width: image_width / horizontal_divisions,
            })
        }

        pub fn num_blocks(&self) -> usize {
            (self.vertical_divisions * self.horizontal_divisions) as usize
        }

        pub fn block_extent(&self, row: u32, col: u32) -> BlockExtent {
            BlockExtent {
                top: row * self.block_height,
                left: col * self.block_width,
                height: self.block_height,
                width: self.block_width,
            }
        }

        /// Row-major iterator over every `(row, col)` block index.
        pub fn blocks(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
            let cols = self.horizontal_divisions;
            (0..self.vertical_divisions).flat_map(move |row| (0..cols).map(move |col| (row, col)))
        }

        /// Flat row-major index of a block.
        pub fn index_of(&self, row: u32, col: u32) -> usize {
            debug_assert!(
                row < self.vertical_divisions && col < self.horizontal_divisions,
                "block ({row}, {col}) outside a {}x{} grid",
                self.vertical_divisions,
                self.horizontal_divisions
            );
            (row * self.horizontal_divisions + col) as usize
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn index_of_is_row_major() {
            let grid = BlockGrid::new(6, 6, 2, 3).unwrap();
            assert_eq!(grid.index_of(0, 0), 0);
            assert_eq!(grid.index_of(0, 2), 2);
            assert_eq!(grid.index_of(1, 0), 3);
            assert_eq!(grid.index_of(1, 2), 5);
        }

        #[cfg(debug_assertions)]
        #[test]
        #[should_panic(expected = "outside a 2x3 grid")]
        fn index_of_rejects_a_column_past_the_grid() {
            let grid = BlockGrid::new(6, 6, 2, 3).unwrap();
            // (0, 3) would alias block (1, 0) without the check.
            grid.index_of(0, 3);
        }

        #[test]
        fn even_partition() {
            let grid = BlockGrid::new(4, 4, 2, 2).unwrap();
            assert_eq!(grid.block_height, 2);
            assert_eq!(grid.block_width, 2);
            assert_eq!(
                grid.block_extent(1, 1),
                BlockExtent { top: 2, left: 2, height: 2, width: 2 }
            );
        }

        #[test]
        fn uneven_partition_truncates() {
            let grid = BlockGrid::new(10, 7, 3, 2).unwrap();
            assert_eq!(grid.block_height, 3);
            assert_eq!(grid.block_width, 3);
            // Row 9 and column 6 are outside every block.
            let covered = grid
                .blocks()
                .any(|(r, c)| grid.block_extent(r, c).contains(9, 0) || grid.block_extent(r, c).contains(0, 6));
            assert!(!covered);
        }

        #[test]
        fn blocks_are_row_major() {
            let grid = BlockGrid::new(6, 6, 2, 3).unwrap();
            let blocks: Vec<_> = grid.blocks().collect();
            assert_eq!(blocks, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
            assert_eq!(grid.index_of(1, 2), 5);
            assert_eq!(grid.num_blocks(), 6);
        }

        #[test]
        fn rejects_zero_divisions() {
            assert!(matches!(BlockGrid::new(4, 4, 0, 2), Err(HeatmapError::InvalidConfig(_))));
        }

        #[test]
        fn rejects_divisions_larger_than_image() {
            assert!(matches!(BlockGrid::new(4, 4, 5, 1), Err(HeatmapError::InvalidConfig(_))));
        }
    }
}
