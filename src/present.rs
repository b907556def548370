//! Stretching a finished frame onto a window surface.

use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Source pixel for every destination column and row.
pub struct ScaleLut {
    dst_w: usize,
    src_w: usize,
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            dst_w: 0,
            src_w: 0,
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }

    /// Nearest-neighbour mapping from a `dst_w × dst_h` surface back into a
    /// `src_w × src_h` frame.
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        let map_axis = |dst: usize, src: usize| -> Vec<usize> {
            (0..dst)
                .map(|d| ((d * src) / dst.max(1)).min(src.saturating_sub(1)))
                .collect()
        };
        Self {
            dst_w,
            src_w,
            src_x: map_axis(dst_w, src_w),
            src_y: map_axis(dst_h, src_h),
        }
    }

    pub fn matches(&self, dst_w: usize, dst_h: usize) -> bool {
        self.dst_w == dst_w && self.src_y.len() == dst_h
    }
}

/// Parallel over destination rows. `src` is row-major ARGB; the surface
/// takes `0RGB`, so alpha is dropped.
pub fn blit_nearest(dst: &mut [u32], src: &[u32], lut: &ScaleLut) {
    if lut.dst_w == 0 {
        return;
    }
    dst.par_chunks_mut(lut.dst_w)
        .zip(lut.src_y.par_iter())
        .for_each(|(dst_row, &sy)| {
            let src_row = &src[sy * lut.src_w..(sy + 1) * lut.src_w];
            for (px, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
                *px = src_row[sx] & 0x00FF_FFFF;
            }
        });
}
