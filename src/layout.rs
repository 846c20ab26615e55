use crate::error::ConfigurationError;

/// Square-cell grid centered on a fixed canvas.
///
/// Leftover space smaller than one cell is split evenly between opposing
/// edges: `margin = canvas % tile_size / 2` on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    canvas_width: u32,
    canvas_height: u32,
    tile_size: u32,
    margin_x: u32,
    margin_y: u32,
}

impl GridLayout {
    pub fn new(
        canvas_width: u32,
        canvas_height: u32,
        tile_size: u32,
    ) -> Result<Self, ConfigurationError> {
        if canvas_width == 0 || canvas_height == 0 {
            return Err(ConfigurationError::ZeroCanvas {
                width: canvas_width,
                height: canvas_height,
            });
        }
        if tile_size == 0 {
            return Err(ConfigurationError::ZeroTileSize);
        }

        Ok(Self {
            canvas_width,
            canvas_height,
            tile_size,
            margin_x: canvas_width % tile_size / 2,
            margin_y: canvas_height % tile_size / 2,
        })
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn margins(&self) -> (u32, u32) {
        (self.margin_x, self.margin_y)
    }

    /// Cell origins that start inside the usable width. With an odd leftover
    /// the last column starts one pixel short of the edge and is clipped.
    pub fn columns(&self) -> u32 {
        (self.canvas_width - 2 * self.margin_x).div_ceil(self.tile_size)
    }

    pub fn rows(&self) -> u32 {
        (self.canvas_height - 2 * self.margin_y).div_ceil(self.tile_size)
    }

    /// Number of tiles the grid holds; anything beyond is dropped.
    pub fn capacity(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn cursor(&self) -> LayoutCursor {
        LayoutCursor {
            x: self.margin_x,
            y: self.margin_y,
            margin_x: self.margin_x,
            right: self.canvas_width - self.margin_x,
            bottom: self.canvas_height - self.margin_y,
            cell: self.tile_size,
        }
    }
}

/// Placement cursor walking the grid left-to-right, top-to-bottom.
///
/// Yields the top-left corner of each successive cell. Wraps once the cursor
/// reaches the right edge of the usable region and ends once it reaches the
/// bottom edge. A cell starting just inside an edge may extend past the
/// canvas; painting clips it.
#[derive(Clone, Debug)]
pub struct LayoutCursor {
    x: u32,
    y: u32,
    margin_x: u32,
    right: u32,
    bottom: u32,
    cell: u32,
}

impl LayoutCursor {
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }
}

impl Iterator for LayoutCursor {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if self.x >= self.right {
            self.x = self.margin_x;
            self.y = self.y.saturating_add(self.cell);
        }
        if self.y >= self.bottom {
            return None;
        }

        let cell = (self.x, self.y);
        self.x = self.x.saturating_add(self.cell);
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_margins() {
        let layout = GridLayout::new(1920, 1080, 64).unwrap();
        assert_eq!(layout.margins(), (0, 28));
        assert_eq!((layout.columns(), layout.rows()), (30, 16));
        assert_eq!(layout.cursor().count(), 480);
    }

    #[test]
    fn cells_are_row_major_from_margin() {
        let layout = GridLayout::new(100, 70, 30).unwrap();
        assert_eq!(layout.margins(), (5, 5));
        let cells: Vec<_> = layout.cursor().collect();
        assert_eq!(
            cells,
            vec![(5, 5), (35, 5), (65, 5), (5, 35), (35, 35), (65, 35)]
        );
    }

    #[test]
    fn odd_leftover_yields_clipped_edge_cells() {
        let layout = GridLayout::new(65, 65, 64).unwrap();
        assert_eq!(layout.margins(), (0, 0));
        assert_eq!((layout.columns(), layout.rows()), (2, 2));
        assert_eq!(
            layout.cursor().collect::<Vec<_>>(),
            vec![(0, 0), (64, 0), (0, 64), (64, 64)]
        );
    }

    #[test]
    fn tile_larger_than_even_canvas_has_no_cells() {
        let layout = GridLayout::new(50, 50, 64).unwrap();
        assert_eq!(layout.margins(), (25, 25));
        assert_eq!(layout.capacity(), 0);
        assert_eq!(layout.cursor().next(), None);
    }

    #[test]
    fn tile_larger_than_odd_canvas_has_one_clipped_cell() {
        let layout = GridLayout::new(51, 51, 64).unwrap();
        assert_eq!(layout.capacity(), 1);
        assert_eq!(layout.cursor().collect::<Vec<_>>(), vec![(25, 25)]);
    }

    #[test]
    fn exact_fit_has_no_trailing_wrap() {
        let layout = GridLayout::new(128, 128, 64).unwrap();
        let mut cursor = layout.cursor();
        assert_eq!(cursor.by_ref().take(4).count(), 4);
        assert_eq!(cursor.position(), (128, 64));
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        assert_eq!(
            GridLayout::new(0, 10, 5),
            Err(ConfigurationError::ZeroCanvas {
                width: 0,
                height: 10
            })
        );
        assert_eq!(GridLayout::new(10, 10, 0), Err(ConfigurationError::ZeroTileSize));
    }
}
