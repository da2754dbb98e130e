// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Reference samples for intra prediction.
//!
//! The edge buffer is one line of samples centred on the top-left corner:
//!
//! ```text
//!   offset: -2h-pad ... -h-1 ... -1    0    1 ... w   w+1 ... 2w ... 2w+pad
//!           [left-down padding][left] [TL] [top]     [top-right] [padding]
//! ```
//!
//! Samples come either from the CTU border cache, a linear copy of the last
//! row and column of every block already reconstructed inside the current
//! CTU, or from the reconstructed picture when the block sits on the top or
//! left border of its CTU.

use std::ops::RangeInclusive;

use v_frame::plane::{Plane, PlaneOffset};

use crate::partition::*;
use crate::recon_intra::NeighborAvail;
use crate::util::*;

pub const EDGE_BUF_HALF: usize = 256;
pub const EDGE_BUF_LEN: usize = 2 * EDGE_BUF_HALF + 1;

/// Samples written past the top-right segment.
#[inline]
pub const fn top_padding(w: usize, h: usize) -> usize {
  (h * 11 / 4 + 4).saturating_sub(w)
}

/// Samples written past the left-down segment.
#[inline]
pub const fn left_padding(w: usize, h: usize) -> usize {
  (w * 11 / 4 + 4).saturating_sub(h)
}

/// Reference sample line addressed by signed offsets from the top-left
/// sample.
#[derive(Clone)]
pub struct IntraEdgeBuf<T: Pixel> {
  buf: Aligned<[T; EDGE_BUF_LEN]>,
}

impl<T: Pixel> IntraEdgeBuf<T> {
  pub fn new() -> Self {
    IntraEdgeBuf { buf: Aligned::new([T::cast_from(0u8); EDGE_BUF_LEN]) }
  }

  /// Sets every sample, including those outside any block's reach.
  pub fn fill(&mut self, v: T) {
    self.buf.fill(v);
  }

  #[inline(always)]
  fn index(off: isize) -> usize {
    debug_assert!(
      off.unsigned_abs() <= EDGE_BUF_HALF,
      "edge offset {} out of range",
      off
    );
    (EDGE_BUF_HALF as isize + off) as usize
  }

  #[inline(always)]
  pub fn at(&self, off: isize) -> T {
    self.buf[Self::index(off)]
  }

  #[inline(always)]
  pub fn set(&mut self, off: isize, v: T) {
    self.buf[Self::index(off)] = v;
  }

  /// `len` samples starting at offset `start`, in increasing offset order.
  #[inline]
  pub fn slice(&self, start: isize, len: usize) -> &[T] {
    let i = Self::index(start);
    &self.buf[i..i + len]
  }

  #[inline]
  pub fn slice_mut(&mut self, start: isize, len: usize) -> &mut [T] {
    let i = Self::index(start);
    &mut self.buf[i..i + len]
  }

  /// Top sample `x`.
  #[inline(always)]
  pub fn top(&self, x: usize) -> T {
    self.at(1 + x as isize)
  }

  /// Left sample `y`.
  #[inline(always)]
  pub fn left(&self, y: usize) -> T {
    self.at(-1 - y as isize)
  }

  #[inline(always)]
  pub fn top_left(&self) -> T {
    self.at(0)
  }

  /// Offsets written by [`fill_intra_edges`] for `bsize`. No predictor
  /// reads outside this range.
  pub fn reach(bsize: BlockSize) -> RangeInclusive<isize> {
    let w = bsize.width();
    let h = bsize.height();
    let lo = 2 * h + left_padding(w, h);
    let hi = 2 * w + top_padding(w, h);
    -(lo as isize)..=hi as isize
  }
}

impl<T: Pixel> Default for IntraEdgeBuf<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// Last row and column of each block reconstructed inside one CTU, stored
/// linearly per internal 4-sample edge.
#[derive(Debug, Clone)]
pub struct CtuBorderCache<T: Pixel> {
  ctu_size: usize,
  origin_x: usize,
  origin_y: usize,
  // Entry k holds the row just above local y = 4k.
  rows: Vec<T>,
  // Entry k holds the column just left of local x = 4k.
  cols: Vec<T>,
}

impl<T: Pixel> CtuBorderCache<T> {
  pub fn new(ctu_size_log2: usize) -> Self {
    let ctu_size = 1 << ctu_size_log2;
    let edges = ctu_size >> MI_SIZE_LOG2;
    CtuBorderCache {
      ctu_size,
      origin_x: 0,
      origin_y: 0,
      rows: vec![T::cast_from(0u8); edges * ctu_size],
      cols: vec![T::cast_from(0u8); edges * ctu_size],
    }
  }

  #[inline]
  pub const fn ctu_size(&self) -> usize {
    self.ctu_size
  }

  /// Picture position of the CTU currently cached.
  #[inline]
  pub const fn origin(&self) -> (usize, usize) {
    (self.origin_x, self.origin_y)
  }

  /// Starts caching the CTU whose top-left luma sample is (`x`, `y`).
  pub fn reset(&mut self, x: usize, y: usize) {
    debug_assert!(x % self.ctu_size == 0 && y % self.ctu_size == 0);
    self.origin_x = x;
    self.origin_y = y;
  }

  /// Records the bottom row and right column of a block reconstructed at
  /// CTU-local (`x`, `y`).
  pub fn capture(
    &mut self, recon: &Plane<T>, x: usize, y: usize, bsize: BlockSize,
  ) {
    let w = bsize.width();
    let h = bsize.height();
    let s = self.ctu_size;
    debug_assert!(x + w <= s && y + h <= s);
    let px = self.origin_x + x;
    let py = self.origin_y + y;
    let width = recon.cfg.width;
    let height = recon.cfg.height;

    if y + h < s && py + h <= height {
      let src =
        recon.slice(PlaneOffset { x: px as isize, y: (py + h - 1) as isize });
      let n = w.min(width.saturating_sub(px));
      let k = (y + h) >> MI_SIZE_LOG2;
      self.rows[k * s + x..k * s + x + n].copy_from_slice(&src[0][..n]);
    }
    if x + w < s && px + w <= width {
      let src =
        recon.slice(PlaneOffset { x: (px + w - 1) as isize, y: py as isize });
      let n = h.min(height.saturating_sub(py));
      let k = (x + w) >> MI_SIZE_LOG2;
      let col = &mut self.cols[k * s + y..k * s + y + n];
      for (j, v) in col.iter_mut().enumerate() {
        *v = src[j][0];
      }
    }
  }

  /// Row above the CTU-local luma row `y`, starting at column 0.
  #[inline]
  pub fn row(&self, y: usize) -> &[T] {
    debug_assert!(y > 0 && y % MI_SIZE == 0 && y < self.ctu_size);
    let k = y >> MI_SIZE_LOG2;
    &self.rows[k * self.ctu_size..(k + 1) * self.ctu_size]
  }

  /// Column left of the CTU-local luma column `x`, starting at row 0.
  #[inline]
  pub fn col(&self, x: usize) -> &[T] {
    debug_assert!(x > 0 && x % MI_SIZE == 0 && x < self.ctu_size);
    let k = x >> MI_SIZE_LOG2;
    &self.cols[k * self.ctu_size..(k + 1) * self.ctu_size]
  }
}

/// Which CTU borders a block touches. Bit 0 is the left border, bit 1 the
/// top border.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CtuBorder {
  Interior = 0,
  Left = 1,
  Top = 2,
  TopLeft = 3,
}

impl CtuBorder {
  #[inline]
  pub const fn from_position(x_in_ctu: usize, y_in_ctu: usize) -> Self {
    match ((y_in_ctu == 0) as u8) << 1 | (x_in_ctu == 0) as u8 {
      0 => CtuBorder::Interior,
      1 => CtuBorder::Left,
      2 => CtuBorder::Top,
      _ => CtuBorder::TopLeft,
    }
  }

  #[inline]
  pub const fn index(self) -> usize {
    self as usize
  }
}

/// Where the reference samples of one block are read from.
pub struct EdgeSource<'a, T: Pixel> {
  pub recon: &'a Plane<T>,
  pub cache: &'a CtuBorderCache<T>,
  /// Picture position of the block's top-left luma sample.
  pub x: usize,
  pub y: usize,
}

impl<'a, T: Pixel> EdgeSource<'a, T> {
  pub fn new(
    recon: &'a Plane<T>, cache: &'a CtuBorderCache<T>, x: usize, y: usize,
  ) -> Self {
    let (ox, oy) = cache.origin();
    debug_assert!(x >= ox && x - ox < cache.ctu_size());
    debug_assert!(y >= oy && y - oy < cache.ctu_size());
    EdgeSource { recon, cache, x, y }
  }

  /// Position inside the cached CTU.
  #[inline]
  pub fn local(&self) -> (usize, usize) {
    let (ox, oy) = self.cache.origin();
    (self.x - ox, self.y - oy)
  }

  #[inline]
  pub fn border(&self) -> CtuBorder {
    let (lx, ly) = self.local();
    CtuBorder::from_position(lx, ly)
  }

  /// Picture row above the block, clipped to the picture width.
  fn picture_top(&self) -> &'a [T] {
    let width = self.recon.cfg.width;
    let start = (self.y - 1) * self.recon.cfg.stride + self.x;
    &self.recon.data_origin()[start..start + width - self.x]
  }

  /// Picture column left of the block, clipped to the picture height.
  fn picture_left(&self) -> LeftSamples<'a, T> {
    let stride = self.recon.cfg.stride;
    let start = self.y * stride + self.x - 1;
    LeftSamples {
      data: &self.recon.data_origin()[start..],
      stride,
      len: self.recon.cfg.height - self.y,
    }
  }

  fn picture_top_left(&self) -> T {
    self.recon.p(self.x - 1, self.y - 1)
  }
}

/// Column of samples, possibly strided.
#[derive(Clone, Copy)]
struct LeftSamples<'a, T> {
  data: &'a [T],
  stride: usize,
  len: usize,
}

impl<'a, T: Pixel> LeftSamples<'a, T> {
  const fn linear(data: &'a [T]) -> Self {
    LeftSamples { data, stride: 1, len: data.len() }
  }

  const fn empty() -> Self {
    LeftSamples { data: &[], stride: 1, len: 0 }
  }

  #[inline(always)]
  fn get(&self, j: usize) -> T {
    self.data[j * self.stride]
  }
}

pub type FillEdgeFn<T> = fn(
  src: &EdgeSource<'_, T>,
  edge: &mut IntraEdgeBuf<T>,
  avail: NeighborAvail,
  bsize: BlockSize,
  bit_depth: usize,
);

const TOP_ANY: NeighborAvail =
  NeighborAvail::TOP.union(NeighborAvail::TOP_RIGHT);
const LEFT_ANY: NeighborAvail =
  NeighborAvail::LEFT.union(NeighborAvail::LEFT_DOWN);

fn fill_interior<T: Pixel>(
  src: &EdgeSource<'_, T>, edge: &mut IntraEdgeBuf<T>, avail: NeighborAvail,
  bsize: BlockSize, bit_depth: usize,
) {
  let (lx, ly) = src.local();
  let row = src.cache.row(ly);
  let top: &[T] = if avail.intersects(TOP_ANY) { &row[lx..] } else { &[] };
  let left = if avail.intersects(LEFT_ANY) {
    LeftSamples::linear(&src.cache.col(lx)[ly..])
  } else {
    LeftSamples::empty()
  };
  // The block holding the corner may end below `ly`, leaving its sample out
  // of the cached row.
  let corner =
    avail.contains(NeighborAvail::TOP_LEFT).then(|| src.picture_top_left());
  fill_edges(edge, avail, bsize, bit_depth, top, left, corner);
}

fn fill_ctu_left<T: Pixel>(
  src: &EdgeSource<'_, T>, edge: &mut IntraEdgeBuf<T>, avail: NeighborAvail,
  bsize: BlockSize, bit_depth: usize,
) {
  let (lx, ly) = src.local();
  let top: &[T] =
    if avail.intersects(TOP_ANY) { &src.cache.row(ly)[lx..] } else { &[] };
  let left = if avail.intersects(LEFT_ANY) {
    src.picture_left()
  } else {
    LeftSamples::empty()
  };
  let corner =
    avail.contains(NeighborAvail::TOP_LEFT).then(|| src.picture_top_left());
  fill_edges(edge, avail, bsize, bit_depth, top, left, corner);
}

fn fill_ctu_top<T: Pixel>(
  src: &EdgeSource<'_, T>, edge: &mut IntraEdgeBuf<T>, avail: NeighborAvail,
  bsize: BlockSize, bit_depth: usize,
) {
  let (lx, ly) = src.local();
  let top: &[T] =
    if avail.intersects(TOP_ANY) { src.picture_top() } else { &[] };
  let left = if avail.intersects(LEFT_ANY) {
    LeftSamples::linear(&src.cache.col(lx)[ly..])
  } else {
    LeftSamples::empty()
  };
  let corner =
    avail.contains(NeighborAvail::TOP_LEFT).then(|| src.picture_top_left());
  fill_edges(edge, avail, bsize, bit_depth, top, left, corner);
}

fn fill_ctu_top_left<T: Pixel>(
  src: &EdgeSource<'_, T>, edge: &mut IntraEdgeBuf<T>, avail: NeighborAvail,
  bsize: BlockSize, bit_depth: usize,
) {
  let top: &[T] =
    if avail.intersects(TOP_ANY) { src.picture_top() } else { &[] };
  let left = if avail.intersects(LEFT_ANY) {
    src.picture_left()
  } else {
    LeftSamples::empty()
  };
  let corner =
    avail.contains(NeighborAvail::TOP_LEFT).then(|| src.picture_top_left());
  fill_edges(edge, avail, bsize, bit_depth, top, left, corner);
}

/// Fill routine for blocks touching `border`.
pub fn fill_edge_fn<T: Pixel>(border: CtuBorder) -> FillEdgeFn<T> {
  match border {
    CtuBorder::Interior => fill_interior::<T>,
    CtuBorder::Left => fill_ctu_left::<T>,
    CtuBorder::Top => fill_ctu_top::<T>,
    CtuBorder::TopLeft => fill_ctu_top_left::<T>,
  }
}

/// Fills `edge` with the reference samples of the `bsize` block at `src`.
///
/// Afterwards every offset in [`IntraEdgeBuf::reach`] holds a valid sample:
/// unavailable neighbours are replaced by replicated or mid-range values.
#[inline]
pub fn fill_intra_edges<T: Pixel>(
  src: &EdgeSource<'_, T>, edge: &mut IntraEdgeBuf<T>, avail: NeighborAvail,
  bsize: BlockSize, bit_depth: usize,
) {
  (fill_edge_fn::<T>(src.border()))(src, edge, avail, bsize, bit_depth);
}

fn fill_edges<T: Pixel>(
  edge: &mut IntraEdgeBuf<T>, avail: NeighborAvail, bsize: BlockSize,
  bit_depth: usize, top: &[T], left: LeftSamples<'_, T>, corner: Option<T>,
) {
  let w = bsize.width();
  let h = bsize.height();
  let dc = T::cast_from(1u32 << (bit_depth - 1));

  edge.slice_mut(-2 * h as isize, 2 * (w + h) + 1).fill(dc);

  if avail.contains(NeighborAvail::TOP) {
    debug_assert!(top.len() >= w);
    edge.slice_mut(1, w).copy_from_slice(&top[..w]);
  }

  if avail.contains(NeighborAvail::TOP_RIGHT) {
    // The picture may end before the top-right segment does.
    let n = top.len().min(2 * w).saturating_sub(w);
    edge.slice_mut(w as isize + 1, n).copy_from_slice(&top[w..w + n]);
    let last = edge.at((w + n) as isize);
    edge.slice_mut((w + n) as isize + 1, w - n).fill(last);
  } else {
    let last = edge.at(w as isize);
    edge.slice_mut(w as isize + 1, w).fill(last);
  }

  let pad = top_padding(w, h);
  let last = edge.at(2 * w as isize);
  edge.slice_mut(2 * w as isize + 1, pad).fill(last);

  if avail.contains(NeighborAvail::LEFT) {
    debug_assert!(left.len >= h);
    for y in 0..h {
      edge.set(-1 - y as isize, left.get(y));
    }
  }

  if avail.contains(NeighborAvail::LEFT_DOWN) {
    let n = left.len.min(2 * h).max(h);
    for y in h..n {
      edge.set(-1 - y as isize, left.get(y));
    }
    let last = edge.at(-(n as isize));
    for y in n..2 * h {
      edge.set(-1 - y as isize, last);
    }
  } else {
    let last = edge.at(-(h as isize));
    edge.slice_mut(-2 * h as isize, h).fill(last);
  }

  let pad = left_padding(w, h);
  let last = edge.at(-2 * h as isize);
  edge.slice_mut(-((2 * h + pad) as isize), pad).fill(last);

  let top_left = match corner {
    Some(v) => v,
    None if avail.contains(NeighborAvail::TOP) => edge.at(1),
    None if avail.contains(NeighborAvail::LEFT) => edge.at(-1),
    None => dc,
  };
  edge.set(0, top_left);
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::recon_intra::{resolve_availability, CtuAvailTables, SliceMap};
  use interpolate_name::interpolate_test;
  use pretty_assertions::assert_eq;
  use rand::{Rng, SeedableRng};
  use rand_chacha::ChaChaRng;

  const CTU_LOG2: usize = 6;

  fn random_plane<T: Pixel>(
    rng: &mut ChaChaRng, w: usize, h: usize, bit_depth: usize,
  ) -> Plane<T> {
    let mut plane = Plane::new(w, h, 0, 0, 16, 16);
    let stride = plane.cfg.stride;
    for row in plane.data_origin_mut().chunks_mut(stride).take(h) {
      for v in row[..w].iter_mut() {
        *v = T::cast_from(rng.gen_range(0..(1u32 << bit_depth)));
      }
    }
    plane
  }

  // Caches every 4x4 unit of the CTU at (x, y).
  fn cache_ctu<T: Pixel>(
    recon: &Plane<T>, x: usize, y: usize,
  ) -> CtuBorderCache<T> {
    let mut cache = CtuBorderCache::new(CTU_LOG2);
    cache.reset(x, y);
    let s = cache.ctu_size();
    for by in (0..s).step_by(4) {
      for bx in (0..s).step_by(4) {
        cache.capture(recon, bx, by, BlockSize::BLOCK_4X4);
      }
    }
    cache
  }

  #[test]
  fn unavailable_neighbors_use_mid_value() {
    let recon = Plane::<u16>::new(64, 64, 0, 0, 0, 0);
    let cache = CtuBorderCache::new(CTU_LOG2);
    let src = EdgeSource::new(&recon, &cache, 0, 0);
    for &bsize in BlockSize::ALL.iter() {
      let mut edge = IntraEdgeBuf::new();
      fill_intra_edges(&src, &mut edge, NeighborAvail::empty(), bsize, 10);
      for off in IntraEdgeBuf::<u16>::reach(bsize) {
        assert_eq!(edge.at(off), 512, "{:?} offset {}", bsize, off);
      }
    }
  }

  #[interpolate_test(u8, 8)]
  #[interpolate_test(u16_10, 10)]
  fn no_gaps_within_reach(bit_depth: usize) {
    let mut rng = ChaChaRng::from_seed([7; 32]);
    let recon = random_plane::<u16>(&mut rng, 192, 192, bit_depth);
    let cache = cache_ctu(&recon, 64, 64);
    let sentinel = u16::MAX;

    for &bsize in BlockSize::ALL.iter() {
      for bits in 0..32u8 {
        let avail = NeighborAvail::from_bits_truncate(bits);
        for &(x, y) in &[(64, 64), (96, 64), (64, 96), (96, 96)] {
          if x + bsize.width() > 128 || y + bsize.height() > 128 {
            continue;
          }
          let src = EdgeSource::new(&recon, &cache, x, y);
          let mut edge = IntraEdgeBuf::new();
          edge.fill(sentinel);
          fill_intra_edges(&src, &mut edge, avail, bsize, bit_depth);
          for off in IntraEdgeBuf::<u16>::reach(bsize) {
            assert_ne!(
              edge.at(off),
              sentinel,
              "{:?} {:?} {}",
              bsize,
              avail,
              off
            );
          }
        }
      }
    }
  }

  #[test]
  fn cache_and_picture_fills_agree() {
    let mut rng = ChaChaRng::from_seed([3; 32]);
    let recon = random_plane::<u8>(&mut rng, 192, 192, 8);
    let cache = cache_ctu(&recon, 64, 64);
    let slices = SliceMap::new(48, 48, CTU_LOG2);
    let order = CtuAvailTables::new(CTU_LOG2);
    let strided = fill_edge_fn::<u8>(CtuBorder::TopLeft);

    for &bsize in BlockSize::ALL.iter() {
      let (w, h) = (bsize.width(), bsize.height());
      for y in (64..128).step_by(h) {
        for x in (64..128).step_by(w) {
          let src = EdgeSource::new(&recon, &cache, x, y);
          let avail = resolve_availability(
            BlockOffset::from_luma(x, y),
            bsize,
            &slices,
            &order,
          );
          let mut from_cache = IntraEdgeBuf::new();
          let mut from_picture = IntraEdgeBuf::new();
          fill_intra_edges(&src, &mut from_cache, avail, bsize, 8);
          strided(&src, &mut from_picture, avail, bsize, 8);
          let reach = IntraEdgeBuf::<u8>::reach(bsize);
          let len = (reach.end() - reach.start() + 1) as usize;
          assert_eq!(
            from_cache.slice(*reach.start(), len),
            from_picture.slice(*reach.start(), len),
            "{:?} at ({}, {})",
            bsize,
            x,
            y
          );
        }
      }
    }
  }

  #[test]
  fn mixed_sizes_in_coding_order() {
    let mut rng = ChaChaRng::from_seed([9; 32]);
    let recon = random_plane::<u16>(&mut rng, 128, 128, 10);
    let slices = SliceMap::new(32, 32, CTU_LOG2);
    let order = CtuAvailTables::new(CTU_LOG2);
    let strided = fill_edge_fn::<u16>(CtuBorder::TopLeft);
    let mut cache = CtuBorderCache::new(CTU_LOG2);
    cache.reset(0, 0);

    // Quadtree leaves of the first CTU in z-order.
    let blocks = [
      (0, 0, BlockSize::BLOCK_16X16),
      (16, 0, BlockSize::BLOCK_8X8),
      (24, 0, BlockSize::BLOCK_8X8),
      (16, 8, BlockSize::BLOCK_8X8),
      (24, 8, BlockSize::BLOCK_8X8),
      (0, 16, BlockSize::BLOCK_16X16),
      (16, 16, BlockSize::BLOCK_16X16),
      (32, 0, BlockSize::BLOCK_32X32),
      (0, 32, BlockSize::BLOCK_32X32),
      (32, 32, BlockSize::BLOCK_16X16),
      (48, 32, BlockSize::BLOCK_16X16),
      (32, 48, BlockSize::BLOCK_16X16),
      (48, 48, BlockSize::BLOCK_16X16),
    ];
    for &(x, y, bsize) in blocks.iter() {
      let src = EdgeSource::new(&recon, &cache, x, y);
      let avail = resolve_availability(
        BlockOffset::from_luma(x, y),
        bsize,
        &slices,
        &order,
      );
      let mut from_cache = IntraEdgeBuf::new();
      let mut from_picture = IntraEdgeBuf::new();
      fill_intra_edges(&src, &mut from_cache, avail, bsize, 10);
      strided(&src, &mut from_picture, avail, bsize, 10);
      if avail.contains(NeighborAvail::TOP_LEFT) {
        assert_eq!(from_cache.top_left(), recon.p(x - 1, y - 1));
      }
      let reach = IntraEdgeBuf::<u16>::reach(bsize);
      let len = (reach.end() - reach.start() + 1) as usize;
      assert_eq!(
        from_cache.slice(*reach.start(), len),
        from_picture.slice(*reach.start(), len),
        "{:?} at ({}, {})",
        bsize,
        x,
        y
      );
      cache.capture(&recon, x, y, bsize);
    }
  }

  #[test]
  fn missing_top_right_replicates_last_top_sample() {
    let mut recon = Plane::<u8>::new(64, 64, 0, 0, 0, 0);
    let stride = recon.cfg.stride;
    for (i, v) in recon.data_origin_mut()[3 * stride..3 * stride + 64]
      .iter_mut()
      .enumerate()
    {
      *v = i as u8;
    }
    let mut cache = CtuBorderCache::new(CTU_LOG2);
    for x in (0..64).step_by(8) {
      cache.capture(&recon, x, 0, BlockSize::BLOCK_8X4);
    }
    let src = EdgeSource::new(&recon, &cache, 8, 4);
    let mut edge = IntraEdgeBuf::new();
    fill_intra_edges(
      &src,
      &mut edge,
      NeighborAvail::TOP,
      BlockSize::BLOCK_8X8,
      8,
    );
    assert_eq!(edge.slice(1, 8), &[8, 9, 10, 11, 12, 13, 14, 15]);
    assert!(edge.slice(9, 8 + top_padding(8, 8)).iter().all(|&v| v == 15));
    // Top-left falls back to the first top sample.
    assert_eq!(edge.top_left(), 8);
    // Left side keeps the mid value.
    assert_eq!(edge.left(0), 128);
  }

  #[test]
  fn top_left_falls_back_to_left() {
    let mut edge = IntraEdgeBuf::<u8>::new();
    fill_edges(
      &mut edge,
      NeighborAvail::LEFT,
      BlockSize::BLOCK_4X4,
      8,
      &[],
      LeftSamples::linear(&[40, 41, 42, 43]),
      None,
    );
    assert_eq!(edge.top_left(), 40);
    assert_eq!(edge.left(3), 43);
    // Left-down missing: replicate the last left sample.
    assert_eq!(edge.left(4), 43);
    assert_eq!(edge.top(0), 128);
  }

  #[test]
  fn top_right_clipped_at_picture_edge() {
    let mut recon = Plane::<u8>::new(72, 72, 0, 0, 32, 32);
    let stride = recon.cfg.stride;
    for (i, v) in recon.data_origin_mut()[63 * stride..63 * stride + 72]
      .iter_mut()
      .enumerate()
    {
      *v = i as u8;
    }
    let mut cache = CtuBorderCache::new(CTU_LOG2);
    cache.reset(64, 64);
    let src = EdgeSource::new(&recon, &cache, 64, 64);
    let mut edge = IntraEdgeBuf::new();
    fill_intra_edges(
      &src,
      &mut edge,
      NeighborAvail::TOP | NeighborAvail::TOP_RIGHT,
      BlockSize::BLOCK_4X4,
      8,
    );
    assert_eq!(edge.slice(1, 8), &[64, 65, 66, 67, 68, 69, 70, 71]);

    let mut edge = IntraEdgeBuf::new();
    fill_intra_edges(
      &src,
      &mut edge,
      NeighborAvail::TOP | NeighborAvail::TOP_RIGHT,
      BlockSize::BLOCK_8X8,
      8,
    );
    assert_eq!(edge.slice(1, 8), &[64, 65, 66, 67, 68, 69, 70, 71]);
    assert!(edge.slice(9, 8).iter().all(|&v| v == 71));
  }
}
