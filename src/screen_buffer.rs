use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Frame of packed ARGB pixels, stored column first so each ray writes one
/// contiguous slice. [`ScreenBuffer::to_row_major`] produces the layout a
/// display surface wants.
pub struct ScreenBuffer {
    width: usize,
    height: usize,
    columns: Vec<u32>,
    background: u32,
}

impl ScreenBuffer {
    /// # Panics
    /// If either dimension is zero.
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        assert!(width > 0 && height > 0, "screen buffer must not be empty");
        Self {
            width,
            height,
            columns: vec![background; width * height],
            background,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, column: usize, row: usize) -> u32 {
        self.columns[column * self.height + row]
    }

    #[inline]
    pub fn set(&mut self, column: usize, row: usize, color: u32) {
        self.columns[column * self.height + row] = color;
    }

    pub fn column(&self, column: usize) -> &[u32] {
        &self.columns[column * self.height..(column + 1) * self.height]
    }

    /// Only needed when a frame may leave pixels unwritten; the renderer
    /// covers every pixel of every column.
    pub fn clear(&mut self) {
        self.columns.fill(self.background);
    }

    /// One mutable slice per screen column, left to right, for parallel fill.
    pub fn par_columns_mut(&mut self) -> impl IndexedParallelIterator<Item = &mut [u32]> {
        self.columns.par_chunks_mut(self.height)
    }

    /// Parallel transpose into `out`, which must hold `width * height` pixels.
    pub fn to_row_major(&self, out: &mut [u32]) {
        assert_eq!(out.len(), self.width * self.height, "output size mismatch");
        let height = self.height;
        out.par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.iter_mut().enumerate() {
                    *px = self.columns[x * height + y];
                }
            });
    }

    pub fn row_major(&self) -> Vec<u32> {
        let mut out = vec![0; self.width * self.height];
        self.to_row_major(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_address_column_and_row() {
        let mut buf = ScreenBuffer::new(3, 2, 0);
        buf.set(2, 1, 7);
        assert_eq!(buf.get(2, 1), 7);
        assert_eq!(buf.column(2), &[0, 7]);
    }

    #[test]
    fn transpose_produces_row_major_pixels() {
        let mut buf = ScreenBuffer::new(3, 2, 0);
        for x in 0..3 {
            for y in 0..2 {
                buf.set(x, y, (y * 10 + x) as u32);
            }
        }
        assert_eq!(buf.row_major(), vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn parallel_columns_are_disjoint() {
        let mut buf = ScreenBuffer::new(4, 3, 0);
        buf.par_columns_mut()
            .enumerate()
            .for_each(|(x, column)| column.fill(x as u32 + 1));
        for x in 0..4 {
            assert!(buf.column(x).iter().all(|&c| c == x as u32 + 1));
        }
    }

    #[test]
    fn clear_restores_background() {
        let mut buf = ScreenBuffer::new(2, 2, 0xFF00_00FF);
        buf.set(1, 1, 5);
        buf.clear();
        assert!(buf.row_major().iter().all(|&c| c == 0xFF00_00FF));
    }
}
