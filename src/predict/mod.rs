// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]

//! Luma intra predictors.
//!
//! Every predictor reads the reference samples of an [`IntraEdgeBuf`] and
//! writes a `w` x `h` block. Angular modes walk the edge with a fixed-point
//! slope from [`DIR_DXDY`] and a 4-tap filter with weights
//! `(32 - f, 64 - f, 32 + f, f)`.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::cpu_features::CpuFeatureLevel;
use crate::intra_edge::IntraEdgeBuf;
use crate::partition::BlockSize;
use crate::recon_intra::NeighborAvail;
use crate::serialize::{Deserialize, Serialize};
use crate::util::Pixel;

pub(crate) mod fast;
pub mod rust;

pub const NUM_INTRA_MODES: usize = 33;

#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  FromPrimitive,
  Serialize,
  Deserialize,
)]
#[repr(u8)]
pub enum PredictionMode {
  DC_PRED,
  PLANE_PRED,
  BI_PRED,
  ANG_X_3,
  ANG_X_4,
  ANG_X_5,
  ANG_X_6,
  ANG_X_7,
  ANG_X_8,
  ANG_X_9,
  ANG_X_10,
  ANG_X_11,
  VERT_PRED, // 12
  ANG_XY_13,
  ANG_XY_14,
  ANG_XY_15,
  ANG_XY_16,
  ANG_XY_17,
  ANG_XY_18,
  ANG_XY_19,
  ANG_XY_20,
  ANG_XY_21,
  ANG_XY_22,
  ANG_XY_23,
  HOR_PRED, // 24
  ANG_Y_25,
  ANG_Y_26,
  ANG_Y_27,
  ANG_Y_28,
  ANG_Y_29,
  ANG_Y_30,
  ANG_Y_31,
  ANG_Y_32,
}

/// Groups of modes sharing one prediction kernel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModeFamily {
  Dc,
  Plane,
  Bilinear,
  Vertical,
  Horizontal,
  /// Near-vertical modes referencing the top and top-right samples.
  AngX,
  /// Diagonal modes crossing from the top row to the left column.
  AngXY,
  /// Near-horizontal modes referencing the left and left-down samples.
  AngY,
}

pub static ALL_INTRA_MODES: [PredictionMode; NUM_INTRA_MODES] = {
  let mut modes = [PredictionMode::DC_PRED; NUM_INTRA_MODES];
  let mut i = 0;
  while i < NUM_INTRA_MODES {
    modes[i] = PredictionMode::from_u8_const(i as u8);
    i += 1;
  }
  modes
};

impl PredictionMode {
  /// Mode with the given index, `None` past the last angular mode.
  #[inline]
  pub fn from_index(idx: usize) -> Option<Self> {
    Self::from_usize(idx)
  }

  #[inline(always)]
  pub const fn index(self) -> usize {
    self as usize
  }

  const fn from_u8_const(v: u8) -> Self {
    use PredictionMode::*;
    const TABLE: [PredictionMode; NUM_INTRA_MODES] = [
      DC_PRED, PLANE_PRED, BI_PRED, ANG_X_3, ANG_X_4, ANG_X_5, ANG_X_6,
      ANG_X_7, ANG_X_8, ANG_X_9, ANG_X_10, ANG_X_11, VERT_PRED, ANG_XY_13,
      ANG_XY_14, ANG_XY_15, ANG_XY_16, ANG_XY_17, ANG_XY_18, ANG_XY_19,
      ANG_XY_20, ANG_XY_21, ANG_XY_22, ANG_XY_23, HOR_PRED, ANG_Y_25,
      ANG_Y_26, ANG_Y_27, ANG_Y_28, ANG_Y_29, ANG_Y_30, ANG_Y_31, ANG_Y_32,
    ];
    TABLE[v as usize]
  }

  pub const fn family(self) -> ModeFamily {
    match self as u8 {
      0 => ModeFamily::Dc,
      1 => ModeFamily::Plane,
      2 => ModeFamily::Bilinear,
      3..=11 => ModeFamily::AngX,
      12 => ModeFamily::Vertical,
      13..=23 => ModeFamily::AngXY,
      24 => ModeFamily::Horizontal,
      _ => ModeFamily::AngY,
    }
  }

  #[inline]
  pub const fn is_angular(self) -> bool {
    self as u8 > PredictionMode::BI_PRED as u8
  }
}

/// Slope of every mode as `(multiplier, shift)` pairs. Index 0 is dx/dy and
/// steps along rows, index 1 is dy/dx and steps along columns.
#[rustfmt::skip]
pub static DIR_DXDY: [[(u8, u8); NUM_INTRA_MODES]; 2] = [
  [
    (0, 0), (0, 0), (0, 0), (11, 2), (2, 0), (11, 3), (1, 0), (93, 7),
    (1, 1), (93, 8), (1, 2), (1, 3), (0, 0), (1, 3), (1, 2), (93, 8),
    (1, 1), (93, 7), (1, 0), (11, 3), (2, 0), (11, 2), (4, 0), (8, 0),
    (0, 0), (8, 0), (4, 0), (11, 2), (2, 0), (11, 3), (1, 0), (93, 7),
    (1, 1),
  ],
  [
    (0, 0), (0, 0), (0, 0), (93, 8), (1, 1), (93, 7), (1, 0), (11, 3),
    (2, 0), (11, 2), (4, 0), (8, 0), (0, 0), (8, 0), (4, 0), (11, 2),
    (2, 0), (11, 3), (1, 0), (93, 7), (1, 1), (93, 8), (1, 2), (1, 3),
    (0, 0), (1, 3), (1, 2), (93, 8), (1, 1), (93, 7), (1, 0), (11, 3),
    (2, 0),
  ],
];

/// Integer and 1/32 fractional displacement reached after `d` steps along
/// `axis` (0: rows, 1: columns).
#[inline(always)]
pub fn context_pixel(mode: PredictionMode, axis: usize, d: i32) -> (i32, i32) {
  let (mult, shift) = DIR_DXDY[axis][mode as usize];
  let t = d * mult as i32;
  let whole = t >> shift;
  let frac = ((t << 5) >> shift) - (whole << 5);
  (whole, frac)
}

/// Writes the `bsize` prediction of `mode` to `dst`.
pub type IntraPredFn<T> = fn(
  dst: &mut [T],
  stride: usize,
  edge: &IntraEdgeBuf<T>,
  mode: PredictionMode,
  bsize: BlockSize,
  bit_depth: usize,
  avail: NeighborAvail,
);

/// Predictor for each mode, selected once from the CPU feature level.
#[derive(Clone, Copy)]
pub struct IntraPredictors<T: Pixel> {
  fns: [IntraPredFn<T>; NUM_INTRA_MODES],
}

impl<T: Pixel> IntraPredictors<T> {
  pub fn new(cpu: CpuFeatureLevel) -> Self {
    let mut fns: [IntraPredFn<T>; NUM_INTRA_MODES] =
      [rust::pred_dc::<T>; NUM_INTRA_MODES];
    for mode in ALL_INTRA_MODES {
      fns[mode.index()] = rust::generic_fn::<T>(mode);
      if cpu.has_fast_paths() {
        if let Some(f) = fast::fast_fn::<T>(mode) {
          fns[mode.index()] = f;
        }
      }
    }
    log::info!(
      "intra predictors for {:?}, fast paths {}",
      cpu,
      if cpu.has_fast_paths() { "enabled" } else { "disabled" }
    );
    IntraPredictors { fns }
  }

  /// Kernel used for `mode`.
  #[inline]
  pub fn get(&self, mode: PredictionMode) -> IntraPredFn<T> {
    self.fns[mode.index()]
  }

  /// Predicts a `bsize` block into `dst` with row stride `stride`.
  ///
  /// `edge` must have been filled for `bsize`; `avail` only affects
  /// `DC_PRED`.
  #[inline]
  pub fn predict(
    &self, dst: &mut [T], stride: usize, edge: &IntraEdgeBuf<T>,
    mode: PredictionMode, bsize: BlockSize, bit_depth: usize,
    avail: NeighborAvail,
  ) {
    debug_assert!(stride >= bsize.width());
    debug_assert!(dst.len() >= (bsize.height() - 1) * stride + bsize.width());
    (self.fns[mode.index()])(dst, stride, edge, mode, bsize, bit_depth, avail);

    #[cfg(feature = "check_fast_paths")]
    {
      let w = bsize.width();
      let h = bsize.height();
      let mut reference = vec![T::cast_from(0u8); w * h];
      (rust::generic_fn::<T>(mode))(
        &mut reference,
        w,
        edge,
        mode,
        bsize,
        bit_depth,
        avail,
      );
      for (y, row) in reference.chunks(w).enumerate() {
        assert_eq!(
          &dst[y * stride..y * stride + w],
          row,
          "fast path mismatch for {:?} {:?} at row {}",
          mode,
          bsize,
          y
        );
      }
    }
  }
}

impl<T: Pixel> Default for IntraPredictors<T> {
  fn default() -> Self {
    Self::new(CpuFeatureLevel::default())
  }
}
