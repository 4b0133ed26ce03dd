//! Uniform bucket grid over the final hull list.
//!
//! Built once a ruin is complete and handed to whatever needs point or
//! area lookups (physics blockers, water simulation).

use glam::Vec2;
use ruingen_logic::hull::Hull;
use ruingen_logic::Rect;

#[derive(Debug, Clone)]
pub struct HullIndex {
    origin: Vec2,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
    rects: Vec<Rect>,
}

impl HullIndex {
    pub fn build(hulls: &[Hull], area: &Rect, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = ((area.width as f32 / cell_size).ceil() as usize).max(1);
        let rows = ((area.height as f32 / cell_size).ceil() as usize).max(1);
        let mut index = Self {
            origin: Vec2::new(area.x as f32, area.y as f32),
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            rects: hulls.iter().map(|h| h.rect).collect(),
        };
        for (i, hull) in hulls.iter().enumerate() {
            for cell in index.cells_covering(&hull.rect) {
                index.cells[cell].push(i);
            }
        }
        index
    }

    fn cell_coord(&self, p: Vec2) -> (usize, usize) {
        let local = (p - self.origin) / self.cell_size;
        let cx = (local.x.floor().max(0.0) as usize).min(self.cols - 1);
        let cy = (local.y.floor().max(0.0) as usize).min(self.rows - 1);
        (cx, cy)
    }

    fn cells_covering(&self, rect: &Rect) -> Vec<usize> {
        let (x0, y0) = self.cell_coord(Vec2::new(rect.x as f32, rect.y as f32));
        let (x1, y1) = self.cell_coord(Vec2::new(rect.right() as f32, rect.top() as f32));
        let mut cells = Vec::with_capacity((x1 - x0 + 1) * (y1 - y0 + 1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                cells.push(y * self.cols + x);
            }
        }
        cells
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The hull containing `point`; the lowest index wins on shared edges.
    pub fn hull_at(&self, point: Vec2) -> Option<usize> {
        let (cx, cy) = self.cell_coord(point);
        self.cells[cy * self.cols + cx]
            .iter()
            .copied()
            .filter(|&i| self.rects[i].contains_point(point))
            .min()
    }

    /// Hulls overlapping `rect` with positive area, ascending.
    pub fn query(&self, rect: &Rect) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .cells_covering(rect)
            .into_iter()
            .flat_map(|cell| self.cells[cell].iter().copied())
            .filter(|&i| self.rects[i].intersects(rect))
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }
}
