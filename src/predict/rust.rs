// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Reference implementation of every predictor, one sample at a time.

use super::*;
use crate::partition::*;
use crate::util::*;

/// Multiplier and shift of the planar gradient, by log2 of the dimension.
const PLANE_MULT: [i32; 5] = [13, 17, 5, 11, 23];
const PLANE_SHIFT: [i32; 5] = [7, 10, 11, 15, 19];

#[inline(always)]
fn px<T: Pixel>(edge: &IntraEdgeBuf<T>, off: isize) -> i32 {
  i32::cast_from(edge.at(off))
}

/// The 4-tap angular filter.
#[inline(always)]
pub(crate) fn taps(a: i32, b: i32, c: i32, d: i32, f: i32) -> i32 {
  (a * (32 - f) + b * (64 - f) + c * (32 + f) + d * f + 64) >> 7
}

pub fn generic_fn<T: Pixel>(mode: PredictionMode) -> IntraPredFn<T> {
  match mode.family() {
    ModeFamily::Dc => pred_dc::<T>,
    ModeFamily::Plane => pred_plane::<T>,
    ModeFamily::Bilinear => pred_bilinear::<T>,
    ModeFamily::Vertical => pred_ver::<T>,
    ModeFamily::Horizontal => pred_hor::<T>,
    ModeFamily::AngX => pred_ang_x::<T>,
    ModeFamily::AngXY => pred_ang_xy::<T>,
    ModeFamily::AngY => pred_ang_y::<T>,
  }
}

pub fn pred_dc<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, _mode: PredictionMode,
  bsize: BlockSize, bit_depth: usize, avail: NeighborAvail,
) {
  let w = bsize.width();
  let h = bsize.height();
  let sum_left: i32 = (0..h).map(|y| i32::cast_from(edge.left(y))).sum();
  let sum_top: i32 = (0..w).map(|x| i32::cast_from(edge.top(x))).sum();
  let has_left = avail.contains(NeighborAvail::LEFT);
  let has_top = avail.contains(NeighborAvail::TOP);

  let dc = match (has_left, has_top) {
    (true, true) => {
      let n = (w + h) as i32;
      ((sum_left + sum_top + (n >> 1)) * (512 / n)) >> 9
    }
    (true, false) => (sum_left + (h as i32 >> 1)) >> bsize.height_log2(),
    (false, true) => (sum_top + (w as i32 >> 1)) >> bsize.width_log2(),
    (false, false) => 1 << (bit_depth - 1),
  };
  let v = T::cast_from(dc);
  for row in dst.chunks_mut(stride).take(h) {
    row[..w].fill(v);
  }
}

pub fn pred_plane<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, _mode: PredictionMode,
  bsize: BlockSize, bit_depth: usize, _avail: NeighborAvail,
) {
  let w = bsize.width() as isize;
  let h = bsize.height() as isize;
  let w2 = w >> 1;
  let h2 = h >> 1;
  let mult_h = PLANE_MULT[bsize.width_log2() - 2];
  let shift_h = PLANE_SHIFT[bsize.width_log2() - 2];
  let mult_v = PLANE_MULT[bsize.height_log2() - 2];
  let shift_v = PLANE_SHIFT[bsize.height_log2() - 2];

  let mut gh = 0;
  for x in 1..=w2 {
    gh += x as i32 * (px(edge, w2 + x) - px(edge, w2 - x));
  }
  let mut gv = 0;
  for y in 1..=h2 {
    gv += y as i32 * (px(edge, -h2 - y) - px(edge, -h2 + y));
  }

  let a = (px(edge, -h) + px(edge, w)) << 4;
  let b = ((gh << 5) * mult_h + (1 << (shift_h - 1))) >> shift_h;
  let c = ((gv << 5) * mult_v + (1 << (shift_v - 1))) >> shift_v;
  let mut base = a - (h2 as i32 - 1) * c - (w2 as i32 - 1) * b + 16;

  for row in dst.chunks_mut(stride).take(h as usize) {
    let mut v = base;
    for p in row[..w as usize].iter_mut() {
      *p = clip_pixel(v >> 5, bit_depth);
      v += b;
    }
    base += c;
  }
}

pub fn pred_bilinear<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, _mode: PredictionMode,
  bsize: BlockSize, bit_depth: usize, _avail: NeighborAvail,
) {
  let w = bsize.width();
  let h = bsize.height();
  let shift_x = bsize.width_log2();
  let shift_y = bsize.height_log2();
  let shift = shift_x.min(shift_y);
  let shift_xy = shift_x + shift_y + 1;
  let offset = 1 << (shift_x + shift_y);

  let mut top = [0i32; MAX_PU_SIZE];
  let mut left = [0i32; MAX_PU_SIZE];
  let mut top_delta = [0i32; MAX_PU_SIZE];
  let mut left_delta = [0i32; MAX_PU_SIZE];
  let mut wy = [0i32; MAX_PU_SIZE];

  for x in 0..w {
    top[x] = i32::cast_from(edge.top(x));
  }
  for y in 0..h {
    left[y] = i32::cast_from(edge.left(y));
  }

  let a = top[w - 1];
  let b = left[h - 1];
  // Estimate of the bottom-right sample.
  let c = if bsize.is_sqr() {
    (a + b + 1) >> 1
  } else {
    let sum = ((a << shift_x) + (b << shift_y)) * 13;
    (sum + (1 << (shift + 5))) >> (shift + 6)
  };
  let corner_w = (c << 1) - a - b;

  for x in 0..w {
    top_delta[x] = b - top[x];
    top[x] <<= shift_y;
  }
  let mut t = 0;
  for y in 0..h {
    left_delta[y] = a - left[y];
    left[y] <<= shift_x;
    wy[y] = t;
    t += corner_w;
  }

  for (y, row) in dst.chunks_mut(stride).take(h).enumerate() {
    let mut pred_x = left[y];
    let mut wxy = 0;
    for x in 0..w {
      pred_x += left_delta[y];
      wxy += wy[y];
      top[x] += top_delta[x];
      row[x] = clip_pixel(
        ((pred_x << shift_y) + (top[x] << shift_x) + wxy + offset) >> shift_xy,
        bit_depth,
      );
    }
  }
}

pub fn pred_ver<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, _mode: PredictionMode,
  bsize: BlockSize, _bit_depth: usize, _avail: NeighborAvail,
) {
  let w = bsize.width();
  let top = edge.slice(1, w);
  for row in dst.chunks_mut(stride).take(bsize.height()) {
    row[..w].copy_from_slice(top);
  }
}

pub fn pred_hor<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, _mode: PredictionMode,
  bsize: BlockSize, _bit_depth: usize, _avail: NeighborAvail,
) {
  let w = bsize.width();
  for (y, row) in dst.chunks_mut(stride).take(bsize.height()).enumerate() {
    row[..w].fill(edge.left(y));
  }
}

/// Modes 3 to 11: every row is an interpolated window of the top edge.
pub fn pred_ang_x<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, mode: PredictionMode,
  bsize: BlockSize, _bit_depth: usize, _avail: NeighborAvail,
) {
  let w = bsize.width();
  for (j, row) in dst.chunks_mut(stride).take(bsize.height()).enumerate() {
    let (whole, f) = context_pixel(mode, 0, j as i32 + 1);
    let mut ix = whole as isize;
    for p in row[..w].iter_mut() {
      *p = T::cast_from(taps(
        px(edge, ix),
        px(edge, ix + 1),
        px(edge, ix + 2),
        px(edge, ix + 3),
        f,
      ));
      ix += 1;
    }
  }
}

/// Modes 25 to 32: every column is an interpolated window of the left edge.
pub fn pred_ang_y<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, mode: PredictionMode,
  bsize: BlockSize, _bit_depth: usize, _avail: NeighborAvail,
) {
  let w = bsize.width();
  let h = bsize.height();
  for i in 0..w {
    let (whole, f) = context_pixel(mode, 1, i as i32 + 1);
    let mut iy = whole as isize;
    for j in 0..h {
      dst[j * stride + i] = T::cast_from(taps(
        px(edge, -iy),
        px(edge, -iy - 1),
        px(edge, -iy - 2),
        px(edge, -iy - 3),
        f,
      ));
      iy += 1;
    }
  }
}

/// Modes 13 to 23. A sample projects onto the top row while the column
/// displacement keeps it above the block (`iy <= -1`), and onto the left
/// column otherwise.
pub fn pred_ang_xy<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, mode: PredictionMode,
  bsize: BlockSize, _bit_depth: usize, _avail: NeighborAvail,
) {
  let w = bsize.width();
  let h = bsize.height();
  let mut ysteps = [(0i32, 0i32); MAX_PU_SIZE];
  for (i, s) in ysteps[..w].iter_mut().enumerate() {
    *s = context_pixel(mode, 1, i as i32 + 1);
  }

  for (j, row) in dst.chunks_mut(stride).take(h).enumerate() {
    let (xstep, fx) = context_pixel(mode, 0, j as i32 + 1);
    for (i, p) in row[..w].iter_mut().enumerate() {
      let (ystep, fy) = ysteps[i];
      let iy = j as isize - ystep as isize;
      let v = if iy <= -1 {
        let ix = i as isize - xstep as isize;
        taps(
          px(edge, ix + 2),
          px(edge, ix + 1),
          px(edge, ix),
          px(edge, ix - 1),
          fx,
        )
      } else {
        taps(
          px(edge, -iy - 2),
          px(edge, -iy - 1),
          px(edge, -iy),
          px(edge, -iy + 1),
          fy,
        )
      };
      *p = T::cast_from(v);
    }
  }
}
