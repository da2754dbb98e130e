// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! ravs2 is the intra prediction core of an AVS2 encoder.
//!
//! It produces bit-exact predictions for the 33 luma intra modes, prepares
//! their reference samples from the reconstructed picture, and ranks modes
//! for the rate-distortion stage.
//!
//! ```
//! use ravs2::prelude::*;
//!
//! let cfg = IntraConfig::default();
//! cfg.validate().unwrap();
//! let preds = IntraPredictors::<u8>::new(cfg.cpu_feature_level);
//! let mut edge = IntraEdgeBuf::<u8>::new();
//! edge.fill(100);
//! let mut dst = [0u8; 8 * 8];
//! preds.predict(
//!   &mut dst, 8, &edge, PredictionMode::DC_PRED, BlockSize::BLOCK_8X8,
//!   8, NeighborAvail::LEFT | NeighborAvail::TOP,
//! );
//! assert!(dst.iter().all(|&v| v == 100));
//! ```

#![deny(bare_trait_objects)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_ptr_alignment)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::verbose_bit_mask)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::range_plus_one)]
#![warn(clippy::expl_impl_clone_on_copy)]
#![warn(clippy::linkedlist)]
#![warn(clippy::map_flatten)]
#![warn(clippy::mem_forget)]
#![warn(clippy::mut_mut)]
#![warn(clippy::needless_continue)]
#![warn(clippy::path_buf_push_overwrite)]
#![warn(clippy::range_minus_one)]

mod serialize {
  cfg_if::cfg_if! {
    if #[cfg(feature="serialize")] {
      pub use serde::*;
    } else {
      pub use noop_proc_macro::{Deserialize, Serialize};
    }
  }
}

pub mod util;

pub mod config;
pub mod cpu_features;
pub mod dist;
pub mod intra_edge;
pub mod partition;
pub mod predict;
pub mod rdo;
pub mod recon_intra;

pub use v_frame::pixel::Pixel;
pub use v_frame::plane::Plane;

/// Commonly used types and traits.
pub mod prelude {
  pub use crate::config::{InvalidConfig, IntraConfig, IntraSpeedSettings};
  pub use crate::cpu_features::CpuFeatureLevel;
  pub use crate::intra_edge::{
    fill_edge_fn, fill_intra_edges, CtuBorder, CtuBorderCache, EdgeSource,
    IntraEdgeBuf,
  };
  pub use crate::partition::{BlockSize, InvalidBlockSize};
  pub use crate::predict::{IntraPredictors, PredictionMode};
  pub use crate::rdo::{
    IntraCandidate, IntraCandidates, IntraModeSearch, IntraScratch,
    SearchStrategy,
  };
  pub use crate::recon_intra::{
    resolve_availability, CtuAvailTables, NeighborAvail, SliceMap,
  };
  pub use v_frame::pixel::{CastFromPrimitive, Pixel};
  pub use v_frame::plane::{Plane, PlaneOffset};
}
