// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

mod align;

pub use self::align::*;
pub use v_frame::math::*;
pub use v_frame::pixel::*;

/// Clips a prediction to the range of a `bit_depth` sample.
#[inline(always)]
pub fn clip_pixel<T: Pixel>(v: i32, bit_depth: usize) -> T {
  T::cast_from(v.clamp(0, (1 << bit_depth) - 1))
}
