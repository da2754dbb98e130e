// Copyright (c) 2019-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::ops::{Deref, DerefMut};

#[repr(align(64))]
#[derive(Clone, Copy, Debug, Default)]
pub struct Align64;

/// A 64 byte aligned piece of data.
///
/// Edge buffers and prediction blocks are kept in these so that vectorized
/// consumers can load whole cache lines.
///
/// ```
/// use ravs2::util::Aligned;
///
/// let x: Aligned<[i16; 64 * 64]> = Aligned::new([0; 64 * 64]);
/// assert!(x.as_ptr() as usize % 64 == 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Aligned<T> {
  _alignment: [Align64; 0],
  pub data: T,
}

impl<T> Aligned<T> {
  pub const fn new(data: T) -> Self {
    Aligned { _alignment: [], data }
  }
}

impl<T> Deref for Aligned<T> {
  type Target = T;

  #[inline(always)]
  fn deref(&self) -> &T {
    &self.data
  }
}

impl<T> DerefMut for Aligned<T> {
  #[inline(always)]
  fn deref_mut(&mut self) -> &mut T {
    &mut self.data
  }
}
