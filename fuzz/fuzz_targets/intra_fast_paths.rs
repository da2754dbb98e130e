// Copyright (c) 2019-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ravs2::predict::ALL_INTRA_MODES;
use ravs2::prelude::*;

// Byte 0 picks the block size, byte 1 the mode, byte 2 the bit depth and
// the rest seeds the edge samples.
fuzz_target!(|data: &[u8]| {
  if data.len() < 4 {
    return;
  }
  let bsize = BlockSize::ALL[data[0] as usize % BlockSize::ALL.len()];
  let mode = ALL_INTRA_MODES[data[1] as usize % ALL_INTRA_MODES.len()];
  let bit_depth = [8, 10, 12][data[2] as usize % 3];
  let avail = NeighborAvail::from_bits_truncate(data[3]);
  let samples = &data[4..];

  let mut edge = IntraEdgeBuf::<u16>::new();
  for (i, off) in IntraEdgeBuf::<u16>::reach(bsize).enumerate() {
    let b = samples.get(i % samples.len().max(1)).copied().unwrap_or(0);
    let v = ((b as u16) << 4 | i as u16 & 15) & ((1 << bit_depth) - 1);
    edge.set(off, v);
  }

  let generic = IntraPredictors::<u16>::new(CpuFeatureLevel::RUST);
  let selected = IntraPredictors::<u16>::default();
  let n = bsize.area();
  let mut a = vec![0u16; n];
  let mut b = vec![0u16; n];
  let w = bsize.width();
  generic.predict(&mut a, w, &edge, mode, bsize, bit_depth, avail);
  selected.predict(&mut b, w, &edge, mode, bsize, bit_depth, avail);
  assert_eq!(a, b, "{:?} {:?}", mode, bsize);
});
