// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Angular predictors that filter each reference line once.
//!
//! For slopes `mult / 2^shift` with a small shift the fractional position
//! repeats every `2^shift` rows (or columns), while the integer position
//! advances by exactly `mult`. All rows of one phase are then windows of a
//! single filtered line. The output is identical to [`super::rust`].

use super::rust::taps;
use super::*;
use crate::partition::MAX_PU_SIZE;
use crate::util::*;

/// Longest filtered line, reached by mode 3 on 64-sample high blocks.
const LINE_CAP: usize = 256;

/// Period in steps and integer advance per period of `mode` along `axis`,
/// `None` when the period is longer than any block.
#[inline]
fn period(mode: PredictionMode, axis: usize) -> Option<(usize, usize)> {
  let (mult, shift) = DIR_DXDY[axis][mode.index()];
  (shift <= 3).then_some((1 << shift, mult as usize))
}

/// Faster kernel for `mode`, if there is one.
pub(crate) fn fast_fn<T: Pixel>(
  mode: PredictionMode,
) -> Option<IntraPredFn<T>> {
  match mode.family() {
    ModeFamily::AngX => {
      period(mode, 0).map(|_| pred_ang_x::<T> as IntraPredFn<T>)
    }
    ModeFamily::AngY => {
      period(mode, 1).map(|_| pred_ang_y::<T> as IntraPredFn<T>)
    }
    ModeFamily::AngXY => (period(mode, 0).is_some()
      && period(mode, 1).is_some())
    .then_some(pred_ang_xy::<T> as IntraPredFn<T>),
    _ => None,
  }
}

#[inline(always)]
fn tap4<T: Pixel>(a: T, b: T, c: T, d: T, f: i32) -> T {
  T::cast_from(taps(
    i32::cast_from(a),
    i32::cast_from(b),
    i32::cast_from(c),
    i32::cast_from(d),
    f,
  ))
}

fn pred_ang_x<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, mode: PredictionMode,
  bsize: BlockSize, bit_depth: usize, avail: NeighborAvail,
) {
  let Some((period, mult)) = period(mode, 0) else {
    return rust::pred_ang_x(dst, stride, edge, mode, bsize, bit_depth, avail);
  };
  let w = bsize.width();
  let h = bsize.height();
  let mut line = [T::cast_from(0u8); LINE_CAP];

  for p in 0..period.min(h) {
    let (whole, f) = context_pixel(mode, 0, p as i32 + 1);
    let reps = (h - 1 - p) / period;
    let len = w + reps * mult;
    debug_assert!(len <= LINE_CAP);

    let src = edge.slice(whole as isize, len + 3);
    for (v, s) in line[..len].iter_mut().zip(src.windows(4)) {
      *v = tap4(s[0], s[1], s[2], s[3], f);
    }
    for q in 0..=reps {
      let j = p + q * period;
      let start = q * mult;
      dst[j * stride..j * stride + w].copy_from_slice(&line[start..start + w]);
    }
  }
}

fn pred_ang_y<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, mode: PredictionMode,
  bsize: BlockSize, bit_depth: usize, avail: NeighborAvail,
) {
  let Some((period, mult)) = period(mode, 1) else {
    return rust::pred_ang_y(dst, stride, edge, mode, bsize, bit_depth, avail);
  };
  let w = bsize.width();
  let h = bsize.height();
  let mut line = [T::cast_from(0u8); LINE_CAP];

  for p in 0..period.min(w) {
    let (whole, f) = context_pixel(mode, 1, p as i32 + 1);
    let reps = (w - 1 - p) / period;
    let len = h + reps * mult;
    debug_assert!(len <= LINE_CAP);

    // Line sample k filters offsets -(whole + k) down to -(whole + k) - 3.
    let src = edge.slice(-((whole as usize + len + 2) as isize), len + 3);
    for (v, s) in line[..len].iter_mut().zip(src.windows(4).rev()) {
      *v = tap4(s[3], s[2], s[1], s[0], f);
    }
    for q in 0..=reps {
      let i = p + q * period;
      let col = &line[q * mult..q * mult + h];
      for (row, &v) in dst.chunks_mut(stride).zip(col) {
        row[i] = v;
      }
    }
  }
}

fn pred_ang_xy<T: Pixel>(
  dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>, mode: PredictionMode,
  bsize: BlockSize, bit_depth: usize, avail: NeighborAvail,
) {
  let (Some((row_period, _)), Some((col_period, _))) =
    (period(mode, 0), period(mode, 1))
  else {
    return rust::pred_ang_xy(dst, stride, edge, mode, bsize, bit_depth, avail);
  };
  let w = bsize.width();
  let h = bsize.height();

  let mut ystep = [0usize; MAX_PU_SIZE];
  for (i, s) in ystep[..w].iter_mut().enumerate() {
    *s = context_pixel(mode, 1, i as i32 + 1).0 as usize;
  }
  let mut line = [T::cast_from(0u8); LINE_CAP];

  // Samples projecting onto the left column. Column i covers rows
  // ystep[i].. and reads the line from its start.
  for p in 0..col_period.min(w) {
    let len = h.saturating_sub(ystep[p]);
    if len == 0 {
      continue;
    }
    let (_, f) = context_pixel(mode, 1, p as i32 + 1);
    let src = edge.slice(-(len as isize) - 1, len + 3);
    for (v, s) in line[..len].iter_mut().zip(src.windows(4).rev()) {
      *v = tap4(s[0], s[1], s[2], s[3], f);
    }
    for i in (p..w).step_by(col_period) {
      let first = ystep[i];
      for (j, row) in dst.chunks_mut(stride).take(h).enumerate().skip(first) {
        row[i] = line[j - first];
      }
    }
  }

  // Samples projecting onto the top row. Entry k of the line holds the
  // sample at top offset k - 1; every row reads a window ending at w - 1.
  let src = edge.slice(-2, w + 4);
  for p in 0..row_period.min(h) {
    let (_, f) = context_pixel(mode, 0, p as i32 + 1);
    for (v, s) in line[..=w].iter_mut().zip(src.windows(4)) {
      *v = tap4(s[3], s[2], s[1], s[0], f);
    }
    for j in (p..h).step_by(row_period) {
      let first = ystep[..w].partition_point(|&s| s <= j);
      if first == w {
        continue;
      }
      let xstep = context_pixel(mode, 0, j as i32 + 1).0 as usize;
      debug_assert!(first + 1 >= xstep);
      dst[j * stride + first..j * stride + w]
        .copy_from_slice(&line[first + 1 - xstep..w + 1 - xstep]);
    }
  }
}
