// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Causal neighbour availability for intra prediction units.
//!
//! A neighbour group is usable when it lies inside the picture, belongs to
//! the slice of the current unit, and was reconstructed earlier in coding
//! order. The last condition only matters for the top-right and left-down
//! groups, whose coding order inside the CTU is looked up in per-CTU-size
//! tables built from the z-scan.

use bitflags::bitflags;

use crate::partition::*;

bitflags! {
  /// Neighbour groups whose reconstructed samples may be referenced.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct NeighborAvail: u8 {
    const LEFT = 1 << 0;
    const TOP = 1 << 1;
    const TOP_LEFT = 1 << 2;
    const TOP_RIGHT = 1 << 3;
    const LEFT_DOWN = 1 << 4;
  }
}

/// Slice index of every 4x4 unit of a picture.
///
/// Slices start at a CTU and run in CTU raster order to the next slice
/// start.
#[derive(Debug, Clone)]
pub struct SliceMap {
  cols: usize,
  rows: usize,
  ctu_size_log2: usize,
  slices: Vec<u16>,
  next_slice: u16,
}

impl SliceMap {
  /// A map covering `cols` x `rows` 4x4 units, all in slice 0.
  pub fn new(cols: usize, rows: usize, ctu_size_log2: usize) -> Self {
    debug_assert!(ctu_size_log2 >= MI_SIZE_LOG2);
    SliceMap {
      cols,
      rows,
      ctu_size_log2,
      slices: vec![0; cols * rows],
      next_slice: 1,
    }
  }

  const fn ctu_mi_log2(&self) -> usize {
    self.ctu_size_log2 - MI_SIZE_LOG2
  }

  /// Opens a new slice at CTU (`ctu_x`, `ctu_y`). Every CTU from there to
  /// the end of the picture in raster order is assigned to it.
  ///
  /// Returns the index of the new slice.
  pub fn start_slice(&mut self, ctu_x: usize, ctu_y: usize) -> u16 {
    let slice = self.next_slice;
    self.next_slice += 1;

    let log2 = self.ctu_mi_log2();
    let ctu_cols = (self.cols + (1 << log2) - 1) >> log2;
    let first = ctu_y * ctu_cols + ctu_x;
    for y in 0..self.rows {
      for x in 0..self.cols {
        if (y >> log2) * ctu_cols + (x >> log2) >= first {
          self.slices[y * self.cols + x] = slice;
        }
      }
    }
    log::debug!("slice {} starts at CTU ({}, {})", slice, ctu_x, ctu_y);
    slice
  }

  /// Slice index of the unit at (`x`, `y`), `None` outside the picture.
  #[inline]
  pub fn slice_at(&self, x: isize, y: isize) -> Option<u16> {
    if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
      return None;
    }
    Some(self.slices[y as usize * self.cols + x as usize])
  }
}

/// Interleaves the bits of `x` and `y` into a z-scan index.
#[inline]
const fn z_order(x: usize, y: usize) -> usize {
  let mut z = 0;
  let mut bit = 0;
  while bit < 8 {
    z |= ((x >> bit) & 1) << (2 * bit);
    z |= ((y >> bit) & 1) << (2 * bit + 1);
    bit += 1;
  }
  z
}

/// Per-CTU reconstruction order of the top-right and left-down neighbours
/// of each 4x4 unit, for one CTU size.
#[derive(Debug, Clone)]
pub struct CtuAvailTables {
  units_log2: usize,
  top_right: Vec<bool>,
  left_down: Vec<bool>,
}

impl CtuAvailTables {
  pub fn new(ctu_size_log2: usize) -> Self {
    debug_assert!((3..=MAX_PU_SIZE_LOG2).contains(&ctu_size_log2));
    let units_log2 = ctu_size_log2 - MI_SIZE_LOG2;
    let n = 1 << units_log2;
    let mut top_right = vec![false; n * n];
    let mut left_down = vec![false; n * n];

    for y in 0..n {
      for x in 0..n {
        let cur = z_order(x, y);
        top_right[y * n + x] = if y == 0 {
          // Row above the CTU.
          true
        } else if x + 1 == n {
          // CTU to the right is not coded yet.
          false
        } else {
          z_order(x + 1, y - 1) < cur
        };
        left_down[y * n + x] = if y + 1 == n {
          false
        } else if x == 0 {
          true
        } else {
          z_order(x - 1, y + 1) < cur
        };
      }
    }

    CtuAvailTables { units_log2, top_right, left_down }
  }

  #[inline]
  fn index(&self, x: usize, y: usize) -> usize {
    let mask = (1 << self.units_log2) - 1;
    ((y & mask) << self.units_log2) + (x & mask)
  }

  /// Whether the unit above and to the right of (`x`, `y`) precedes it.
  #[inline]
  pub fn top_right(&self, x: usize, y: usize) -> bool {
    self.top_right[self.index(x, y)]
  }

  /// Whether the unit below and to the left of (`x`, `y`) precedes it.
  #[inline]
  pub fn left_down(&self, x: usize, y: usize) -> bool {
    self.left_down[self.index(x, y)]
  }
}

/// Computes the usable neighbour groups of the prediction unit at `bo`.
///
/// Never fails: neighbours outside the picture, in another slice, or not yet
/// reconstructed are reported as unavailable.
pub fn resolve_availability(
  bo: BlockOffset, bsize: BlockSize, slice_map: &SliceMap,
  order: &CtuAvailTables,
) -> NeighborAvail {
  let x = bo.x as isize;
  let y = bo.y as isize;
  let wu = bsize.width_mi() as isize;
  let hu = bsize.height_mi() as isize;

  let cur = match slice_map.slice_at(x, y) {
    Some(s) => s,
    None => return NeighborAvail::empty(),
  };
  let same_slice =
    |nx: isize, ny: isize| slice_map.slice_at(nx, ny) == Some(cur);

  let mut avail = NeighborAvail::empty();
  avail.set(NeighborAvail::LEFT, same_slice(x - 1, y));
  avail.set(NeighborAvail::TOP, same_slice(x, y - 1));
  avail.set(NeighborAvail::TOP_LEFT, same_slice(x - 1, y - 1));
  avail.set(
    NeighborAvail::TOP_RIGHT,
    same_slice(x + wu, y - 1) && order.top_right(bo.x + wu as usize - 1, bo.y),
  );
  avail.set(
    NeighborAvail::LEFT_DOWN,
    same_slice(x - 1, y + hu) && order.left_down(bo.x, bo.y + hu as usize - 1),
  );
  avail
}
