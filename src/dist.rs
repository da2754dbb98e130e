// Copyright (c) 2019-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Distortion between a source block and its prediction.

use crate::util::*;

/// Sum of absolute differences of a `w` x `h` block.
pub fn get_sad<T: Pixel>(
  src: &[T], src_stride: usize, pred: &[T], pred_stride: usize, w: usize,
  h: usize,
) -> u32 {
  let mut sum = 0u32;

  for (row_src, row_pred) in
    src.chunks(src_stride).take(h).zip(pred.chunks(pred_stride))
  {
    sum += row_src[..w]
      .iter()
      .zip(row_pred)
      .map(|(&a, &b)| (i32::cast_from(a) - i32::cast_from(b)).unsigned_abs())
      .sum::<u32>();
  }

  sum
}

#[inline(always)]
const fn butterfly(a: i32, b: i32) -> (i32, i32) {
  ((a + b), (a - b))
}

#[inline(always)]
#[allow(clippy::identity_op, clippy::erasing_op)]
fn hadamard4_1d(data: &mut [i32], n: usize, stride0: usize, stride1: usize) {
  for i in 0..n {
    let sub: &mut [i32] = &mut data[i * stride0..];
    let (a0, a1) = butterfly(sub[0 * stride1], sub[1 * stride1]);
    let (a2, a3) = butterfly(sub[2 * stride1], sub[3 * stride1]);
    let (b0, b2) = butterfly(a0, a2);
    let (b1, b3) = butterfly(a1, a3);
    sub[0 * stride1] = b0;
    sub[1 * stride1] = b1;
    sub[2 * stride1] = b2;
    sub[3 * stride1] = b3;
  }
}

#[inline(always)]
#[allow(clippy::identity_op, clippy::erasing_op)]
fn hadamard8_1d(data: &mut [i32], n: usize, stride0: usize, stride1: usize) {
  for i in 0..n {
    let sub: &mut [i32] = &mut data[i * stride0..];

    let (a0, a1) = butterfly(sub[0 * stride1], sub[1 * stride1]);
    let (a2, a3) = butterfly(sub[2 * stride1], sub[3 * stride1]);
    let (a4, a5) = butterfly(sub[4 * stride1], sub[5 * stride1]);
    let (a6, a7) = butterfly(sub[6 * stride1], sub[7 * stride1]);

    let (b0, b2) = butterfly(a0, a2);
    let (b1, b3) = butterfly(a1, a3);
    let (b4, b6) = butterfly(a4, a6);
    let (b5, b7) = butterfly(a5, a7);

    let (c0, c4) = butterfly(b0, b4);
    let (c1, c5) = butterfly(b1, b5);
    let (c2, c6) = butterfly(b2, b6);
    let (c3, c7) = butterfly(b3, b7);

    sub[0 * stride1] = c0;
    sub[1 * stride1] = c1;
    sub[2 * stride1] = c2;
    sub[3 * stride1] = c3;
    sub[4 * stride1] = c4;
    sub[5 * stride1] = c5;
    sub[6 * stride1] = c6;
    sub[7 * stride1] = c7;
  }
}

#[inline(always)]
fn hadamard2d(data: &mut [i32], size: usize) {
  let func = if size == 4 { hadamard4_1d } else { hadamard8_1d };
  // Columns, then rows.
  func(data, size, 1, size);
  func(data, size, size, 1);
}

/// Sum of absolute transformed differences.
///
/// Blocks with a side of 4 are split into 4x4 Hadamard transforms, all
/// others into 8x8. The sum is normalized by the transform size.
pub fn get_satd<T: Pixel>(
  src: &[T], src_stride: usize, pred: &[T], pred_stride: usize, w: usize,
  h: usize,
) -> u32 {
  let size = w.min(h).min(8);
  let mut sum = 0u64;

  for chunk_y in (0..h).step_by(size) {
    for chunk_x in (0..w).step_by(size) {
      let buf: &mut [i32] = &mut [0; 8 * 8][..size * size];

      for (r, row_diff) in buf.chunks_mut(size).enumerate() {
        let y = chunk_y + r;
        let row_src = &src[y * src_stride + chunk_x..][..size];
        let row_pred = &pred[y * pred_stride + chunk_x..][..size];
        for (diff, (&a, &b)) in
          row_diff.iter_mut().zip(row_src.iter().zip(row_pred))
        {
          *diff = i32::cast_from(a) - i32::cast_from(b);
        }
      }

      hadamard2d(buf, size);

      sum += buf.iter().map(|a| a.unsigned_abs() as u64).sum::<u64>();
    }
  }

  let ln = msb(size as i32) as u64;
  ((sum + (1 << ln >> 1)) >> ln) as u32
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::partition::BlockSize;
  use crate::partition::BlockSize::*;
  use pretty_assertions::assert_eq;

  // Source p(x, y) = x + y, prediction q(x, y) = 2x, both with a padded
  // stride.
  fn setup_blocks<T: Pixel>(bsize: BlockSize) -> (Vec<T>, Vec<T>, usize) {
    let stride = bsize.width() + 16;
    let mut src = vec![T::cast_from(0u8); stride * bsize.height()];
    let mut pred = src.clone();
    for y in 0..bsize.height() {
      for x in 0..bsize.width() {
        src[y * stride + x] = T::cast_from((x + y) as u32);
        pred[y * stride + x] = T::cast_from((2 * x) as u32);
      }
    }
    (src, pred, stride)
  }

  fn expected_sad(bsize: BlockSize) -> u32 {
    let mut sum = 0;
    for y in 0..bsize.height() as i32 {
      for x in 0..bsize.width() as i32 {
        sum += (y - x).unsigned_abs();
      }
    }
    sum
  }

  fn sad_matches_direct_sum_inner<T: Pixel>() {
    for &bsize in BlockSize::ALL.iter() {
      let (src, pred, stride) = setup_blocks::<T>(bsize);
      let sad =
        get_sad(&src, stride, &pred, stride, bsize.width(), bsize.height());
      assert_eq!(sad, expected_sad(bsize), "{:?}", bsize);
    }
  }

  #[test]
  fn sad_matches_direct_sum_u8() {
    sad_matches_direct_sum_inner::<u8>();
  }

  #[test]
  fn sad_matches_direct_sum_u16() {
    sad_matches_direct_sum_inner::<u16>();
  }

  #[test]
  fn sad_4x4_by_hand() {
    let (src, pred, stride) = setup_blocks::<u8>(BLOCK_4X4);
    assert_eq!(get_sad(&src, stride, &pred, stride, 4, 4), 20);
  }

  #[test]
  fn satd_of_identical_blocks_is_zero() {
    let (src, _, stride) = setup_blocks::<u16>(BLOCK_32X8);
    assert_eq!(get_satd(&src, stride, &src, stride, 32, 8), 0);
  }

  #[test]
  fn satd_of_constant_difference() {
    // Only the DC coefficient survives: 16d (4x4) or 64d (8x8) per
    // transform before normalization.
    let a = vec![110u8; 64 * 64];
    let b = vec![100u8; 64 * 64];
    assert_eq!(get_satd(&a, 4, &b, 4, 4, 4), 40);
    assert_eq!(get_satd(&a, 8, &b, 8, 8, 8), 80);
    assert_eq!(get_satd(&a, 16, &b, 16, 16, 4), 4 * 40);
    assert_eq!(get_satd(&a, 64, &b, 64, 64, 64), 64 * 80);
  }

  #[test]
  fn satd_of_impulse_spreads_evenly() {
    let mut a = vec![0u8; 16];
    let b = vec![0u8; 16];
    a[5] = 1;
    // 16 coefficients of magnitude 1, normalized by 4.
    assert_eq!(get_satd(&a, 4, &b, 4, 4, 4), 4);
  }
}
