// Copyright (c) 2019-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Kernel selection level.
//!
//! `GENERIC` enables the line-based fast paths on every target. Setting the
//! `RAVS2_CPU_TARGET` environment variable to `rust` selects the reference
//! kernels everywhere.

use arg_enum_proc_macro::ArgEnum;
use std::env;
use std::str::FromStr;

use crate::serialize::{Deserialize, Serialize};

pub(crate) const CPU_TARGET_ENV: &str = "RAVS2_CPU_TARGET";

#[derive(
  Debug,
  Copy,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  ArgEnum,
  Serialize,
  Deserialize,
)]
pub enum CpuFeatureLevel {
  RUST,
  GENERIC,
}

impl CpuFeatureLevel {
  /// Whether the table-driven fast paths may be used at this level.
  #[inline]
  pub fn has_fast_paths(self) -> bool {
    self != CpuFeatureLevel::RUST
  }
}

impl Default for CpuFeatureLevel {
  fn default() -> CpuFeatureLevel {
    let manual = env::var(CPU_TARGET_ENV)
      .ok()
      .and_then(|feature| CpuFeatureLevel::from_str(&feature).ok());
    manual.unwrap_or(CpuFeatureLevel::GENERIC)
  }
}
