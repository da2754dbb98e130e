// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

#![allow(non_camel_case_types)]

use thiserror::Error;

use crate::serialize::{Deserialize, Serialize};

pub use self::BlockSize::*;

/// Log2 of the 4x4 unit used by availability maps.
pub const MI_SIZE_LOG2: usize = 2;
pub const MI_SIZE: usize = 1 << MI_SIZE_LOG2;

pub const MAX_PU_SIZE_LOG2: usize = 6;
pub const MAX_PU_SIZE: usize = 1 << MAX_PU_SIZE_LOG2;

/// Shapes an intra prediction unit can take: the square sizes, the 2NxN and
/// Nx2N halves, and the 4:1 short-distance splits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockSize {
  BLOCK_4X4,
  BLOCK_4X8,
  BLOCK_8X4,
  BLOCK_8X8,
  BLOCK_8X16,
  BLOCK_16X8,
  BLOCK_16X16,
  BLOCK_16X32,
  BLOCK_32X16,
  BLOCK_32X32,
  BLOCK_32X64,
  BLOCK_64X32,
  BLOCK_64X64,
  BLOCK_4X16,
  BLOCK_16X4,
  BLOCK_8X32,
  BLOCK_32X8,
  BLOCK_16X64,
  BLOCK_64X16,
}

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("invalid block size")]
pub struct InvalidBlockSize;

impl BlockSize {
  pub const BLOCK_SIZES: usize = BLOCK_64X16 as usize + 1;

  pub const ALL: [BlockSize; BlockSize::BLOCK_SIZES] = [
    BLOCK_4X4,
    BLOCK_4X8,
    BLOCK_8X4,
    BLOCK_8X8,
    BLOCK_8X16,
    BLOCK_16X8,
    BLOCK_16X16,
    BLOCK_16X32,
    BLOCK_32X16,
    BLOCK_32X32,
    BLOCK_32X64,
    BLOCK_64X32,
    BLOCK_64X64,
    BLOCK_4X16,
    BLOCK_16X4,
    BLOCK_8X32,
    BLOCK_32X8,
    BLOCK_16X64,
    BLOCK_64X16,
  ];

  /// # Errors
  ///
  /// - Returns `InvalidBlockSize` if `w` by `h` is not a legal prediction
  ///   unit shape.
  pub fn from_width_and_height_opt(
    w: usize, h: usize,
  ) -> Result<BlockSize, InvalidBlockSize> {
    match (w, h) {
      (4, 4) => Ok(BLOCK_4X4),
      (4, 8) => Ok(BLOCK_4X8),
      (4, 16) => Ok(BLOCK_4X16),
      (8, 4) => Ok(BLOCK_8X4),
      (8, 8) => Ok(BLOCK_8X8),
      (8, 16) => Ok(BLOCK_8X16),
      (8, 32) => Ok(BLOCK_8X32),
      (16, 4) => Ok(BLOCK_16X4),
      (16, 8) => Ok(BLOCK_16X8),
      (16, 16) => Ok(BLOCK_16X16),
      (16, 32) => Ok(BLOCK_16X32),
      (16, 64) => Ok(BLOCK_16X64),
      (32, 8) => Ok(BLOCK_32X8),
      (32, 16) => Ok(BLOCK_32X16),
      (32, 32) => Ok(BLOCK_32X32),
      (32, 64) => Ok(BLOCK_32X64),
      (64, 16) => Ok(BLOCK_64X16),
      (64, 32) => Ok(BLOCK_64X32),
      (64, 64) => Ok(BLOCK_64X64),
      _ => Err(InvalidBlockSize),
    }
  }

  #[inline]
  pub const fn width_log2(self) -> usize {
    match self {
      BLOCK_4X4 | BLOCK_4X8 | BLOCK_4X16 => 2,
      BLOCK_8X4 | BLOCK_8X8 | BLOCK_8X16 | BLOCK_8X32 => 3,
      BLOCK_16X4 | BLOCK_16X8 | BLOCK_16X16 | BLOCK_16X32 | BLOCK_16X64 => 4,
      BLOCK_32X8 | BLOCK_32X16 | BLOCK_32X32 | BLOCK_32X64 => 5,
      BLOCK_64X16 | BLOCK_64X32 | BLOCK_64X64 => 6,
    }
  }

  #[inline]
  pub const fn height_log2(self) -> usize {
    match self {
      BLOCK_4X4 | BLOCK_8X4 | BLOCK_16X4 => 2,
      BLOCK_4X8 | BLOCK_8X8 | BLOCK_16X8 | BLOCK_32X8 => 3,
      BLOCK_4X16 | BLOCK_8X16 | BLOCK_16X16 | BLOCK_32X16 | BLOCK_64X16 => 4,
      BLOCK_8X32 | BLOCK_16X32 | BLOCK_32X32 | BLOCK_64X32 => 5,
      BLOCK_16X64 | BLOCK_32X64 | BLOCK_64X64 => 6,
    }
  }

  #[inline]
  pub const fn width(self) -> usize {
    1 << self.width_log2()
  }

  #[inline]
  pub const fn height(self) -> usize {
    1 << self.height_log2()
  }

  #[inline]
  pub const fn area(self) -> usize {
    self.width() * self.height()
  }

  /// Width in 4x4 units.
  #[inline]
  pub const fn width_mi(self) -> usize {
    self.width() >> MI_SIZE_LOG2
  }

  /// Height in 4x4 units.
  #[inline]
  pub const fn height_mi(self) -> usize {
    self.height() >> MI_SIZE_LOG2
  }

  #[inline]
  pub const fn is_sqr(self) -> bool {
    self.width_log2() == self.height_log2()
  }
}

/// Absolute offset in 4x4 units inside a picture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockOffset {
  pub x: usize,
  pub y: usize,
}

impl BlockOffset {
  #[inline]
  pub const fn new(x: usize, y: usize) -> Self {
    BlockOffset { x, y }
  }

  /// Offset of the 4x4 unit holding the given luma sample.
  #[inline]
  pub const fn from_luma(x: usize, y: usize) -> Self {
    BlockOffset { x: x >> MI_SIZE_LOG2, y: y >> MI_SIZE_LOG2 }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn dimensions_round_trip_through_lookup() {
    for &bsize in BlockSize::ALL.iter() {
      assert_eq!(
        BlockSize::from_width_and_height_opt(bsize.width(), bsize.height()),
        Ok(bsize)
      );
      assert_eq!(bsize.width_mi() * MI_SIZE, bsize.width());
    }
  }

  #[test]
  fn rejects_illegal_shapes() {
    for (w, h) in [(4, 32), (128, 128), (12, 4)] {
      assert_eq!(
        BlockSize::from_width_and_height_opt(w, h),
        Err(InvalidBlockSize)
      );
    }
  }

  #[test]
  fn only_square_sizes_are_sqr() {
    let sqr: Vec<_> = BlockSize::ALL
      .iter()
      .filter(|b| b.is_sqr())
      .map(|b| b.width())
      .collect();
    assert_eq!(sqr, vec![4, 8, 16, 32, 64]);
  }
}
