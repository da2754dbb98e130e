// Copyright (c) 2020-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use crate::partition::BlockSize;
use crate::rdo::RMD_REFINE_BUDGET;
use crate::serialize::{Deserialize, Serialize};

/// Fastest preset.
pub const MAX_SPEED: usize = 10;

/// Contains the intra search speed settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntraSpeedSettings {
  /// Uses rough mode decision instead of evaluating every mode.
  ///
  /// Enabled is faster.
  pub rough_mode_decision: bool,

  /// Uses SATD instead of SAD as the mode distortion.
  ///
  /// Enabled is slower.
  pub use_satd: bool,

  /// Number of candidates handed to RDO, indexed by log2 of the larger
  /// block side minus 2.
  pub rdo_candidates: [usize; 5],

  /// Evaluations allowed in the +-1 refinement of rough mode decision.
  pub rmd_refine_budget: usize,

  /// Allows the line-based angular kernels when the CPU level permits.
  pub fast_paths: bool,
}

impl Default for IntraSpeedSettings {
  /// The default settings are equivalent to speed 0
  fn default() -> Self {
    IntraSpeedSettings {
      rough_mode_decision: false,
      use_satd: true,
      rdo_candidates: [9, 9, 5, 5, 5],
      rmd_refine_budget: RMD_REFINE_BUDGET,
      fast_paths: true,
    }
  }
}

impl IntraSpeedSettings {
  /// Set the speed setting according to a numeric speed preset.
  pub fn from_preset(speed: usize) -> Self {
    // The default settings are equivalent to speed 0
    let mut settings = IntraSpeedSettings::default();

    if speed >= 2 {
      settings.rdo_candidates = [8, 8, 4, 4, 4];
    }

    if speed >= 4 {
      settings.rough_mode_decision = true;
    }

    if speed >= 8 {
      settings.use_satd = false;
      settings.rdo_candidates = [4, 4, 3, 3, 2];
      settings.rmd_refine_budget = 2;
    }

    settings
  }

  /// RDO candidate count for `bsize`.
  #[inline]
  pub fn rdo_candidates_for(&self, bsize: BlockSize) -> usize {
    let log2 = bsize.width_log2().max(bsize.height_log2());
    self.rdo_candidates[log2 - 2]
  }
}
