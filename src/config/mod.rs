// Copyright (c) 2020-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use thiserror::Error;

use crate::cpu_features::CpuFeatureLevel;
use crate::partition::MAX_PU_SIZE_LOG2;
use crate::rdo::MAX_INTRA_CANDIDATES;
use crate::serialize::{Deserialize, Serialize};

mod speedsettings;
pub use speedsettings::*;

/// Smallest supported CTU, 16x16.
pub const MIN_CTU_SIZE_LOG2: usize = 4;

/// Enumeration of possible invalid configuration errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum InvalidConfig {
  /// The bit depth is invalid.
  #[error("invalid bit depth {0} (expected 8, 10 or 12)")]
  InvalidBitDepth(usize),
  /// The CTU size is invalid.
  #[error("invalid CTU size log2 {actual} (expected >= {min}, <= {max})")]
  InvalidCtuSize {
    /// The actual value.
    actual: usize,
    /// The minimal supported value.
    min: usize,
    /// The maximal supported value.
    max: usize,
  },
  /// An RDO candidate count exceeds the candidate list capacity.
  #[error("invalid rdo candidates {actual} (expected <= {max})")]
  TooManyRdoCandidates {
    /// The actual value.
    actual: usize,
    /// The maximal supported value.
    max: usize,
  },
  /// An RDO candidate count is zero.
  #[error("invalid rdo candidates 0 (expected >= 1)")]
  NoRdoCandidates,
}

/// Intra core configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct IntraConfig {
  /// Sample bit depth.
  pub bit_depth: usize,
  /// Log2 of the CTU size.
  pub ctu_size_log2: usize,
  /// Search settings.
  pub speed_settings: IntraSpeedSettings,
  /// CPU level used to select the predictor kernels.
  #[cfg_attr(feature = "serialize", serde(skip))]
  pub cpu_feature_level: CpuFeatureLevel,
}

impl Default for IntraConfig {
  fn default() -> Self {
    IntraConfig {
      bit_depth: 8,
      ctu_size_log2: MAX_PU_SIZE_LOG2,
      speed_settings: IntraSpeedSettings::default(),
      cpu_feature_level: CpuFeatureLevel::default(),
    }
  }
}

impl IntraConfig {
  /// Configuration at a numeric speed preset.
  pub fn with_speed_preset(speed: usize) -> Self {
    IntraConfig {
      speed_settings: IntraSpeedSettings::from_preset(speed),
      ..Default::default()
    }
  }

  /// CPU level the predictor table should be built for.
  ///
  /// Disabling the fast paths forces the reference kernels.
  pub fn effective_cpu_level(&self) -> CpuFeatureLevel {
    if self.speed_settings.fast_paths {
      self.cpu_feature_level
    } else {
      CpuFeatureLevel::RUST
    }
  }

  /// Validates the configuration.
  ///
  /// # Errors
  ///
  /// - Returns `InvalidConfig` if the bit depth, CTU size or RDO candidate
  ///   counts are out of range.
  pub fn validate(&self) -> Result<(), InvalidConfig> {
    use InvalidConfig::*;

    if ![8, 10, 12].contains(&self.bit_depth) {
      return Err(InvalidBitDepth(self.bit_depth));
    }

    if !(MIN_CTU_SIZE_LOG2..=MAX_PU_SIZE_LOG2).contains(&self.ctu_size_log2) {
      return Err(InvalidCtuSize {
        actual: self.ctu_size_log2,
        min: MIN_CTU_SIZE_LOG2,
        max: MAX_PU_SIZE_LOG2,
      });
    }

    for &n in self.speed_settings.rdo_candidates.iter() {
      if n == 0 {
        return Err(NoRdoCandidates);
      }
      if n > MAX_INTRA_CANDIDATES {
        return Err(TooManyRdoCandidates {
          actual: n,
          max: MAX_INTRA_CANDIDATES,
        });
      }
    }

    Ok(())
  }
}
