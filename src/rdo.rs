// Copyright (c) 2017-2024, The ravs2 contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Intra mode search ahead of full rate-distortion optimization.
//!
//! Each search fills the reference samples once, predicts some or all of the
//! 33 modes, scores them with a pixel distortion plus a mode signalling cost
//! and keeps the cheapest ones in a short sorted list.

use arrayvec::ArrayVec;
use v_frame::plane::Plane;

use crate::config::{IntraConfig, IntraSpeedSettings};
use crate::dist::{get_sad, get_satd};
use crate::intra_edge::{fill_intra_edges, EdgeSource, IntraEdgeBuf};
use crate::partition::*;
use crate::predict::{
  IntraPredictors, PredictionMode, ALL_INTRA_MODES, NUM_INTRA_MODES,
};
use crate::recon_intra::NeighborAvail;
use crate::util::*;

/// Capacity of every candidate list.
pub const MAX_INTRA_CANDIDATES: usize = 10;

/// Default number of evaluations in the +-1 refinement of rough mode
/// decision.
pub const RMD_REFINE_BUDGET: usize = 4;

const MPM_MODE_BITS: u64 = 2;
const OTHER_MODE_BITS: u64 = 6;

const FIRST_ANGULAR: usize = PredictionMode::ANG_X_3 as usize;
const LAST_ANGULAR: usize = PredictionMode::ANG_Y_32 as usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntraCandidate {
  pub mode: PredictionMode,
  pub cost: u64,
}

/// Candidates sorted by ascending cost, at most `capacity` of them.
///
/// Entries of equal cost keep their insertion order.
#[derive(Clone, Debug)]
pub struct IntraCandidates {
  list: ArrayVec<IntraCandidate, MAX_INTRA_CANDIDATES>,
  capacity: usize,
}

impl IntraCandidates {
  /// # Panics
  ///
  /// - If `capacity` is zero or larger than `MAX_INTRA_CANDIDATES`.
  pub fn new(capacity: usize) -> Self {
    assert!(
      capacity > 0 && capacity <= MAX_INTRA_CANDIDATES,
      "candidate capacity {} out of range",
      capacity
    );
    IntraCandidates { list: ArrayVec::new(), capacity }
  }

  #[inline]
  pub const fn capacity(&self) -> usize {
    self.capacity
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.list.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.list.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &IntraCandidate> {
    self.list.iter()
  }

  pub fn modes(&self) -> impl Iterator<Item = PredictionMode> + '_ {
    self.list.iter().map(|c| c.mode)
  }

  #[inline]
  pub fn best(&self) -> Option<IntraCandidate> {
    self.list.first().copied()
  }

  /// Inserts `mode` ahead of the first entry with a strictly larger cost,
  /// dropping the last entry of a full list.
  ///
  /// Returns `false` and leaves the list untouched when the list is full
  /// and `cost` is not below its last entry.
  pub fn insert_if_better(&mut self, mode: PredictionMode, cost: u64) -> bool {
    let pos = self
      .list
      .iter()
      .position(|c| c.cost > cost)
      .unwrap_or(self.list.len());
    if pos >= self.capacity {
      return false;
    }
    if self.list.len() == self.capacity {
      self.list.pop();
    }
    self.list.insert(pos, IntraCandidate { mode, cost });
    true
  }
}

/// How many and which modes a search evaluates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchStrategy {
  /// Every mode, in id order.
  Exhaustive,
  /// Rough mode decision: anchors, then refinement around the best modes.
  Rough,
  /// One mode, typically re-evaluated in a second pass.
  Single(PredictionMode),
}

/// Per-thread search state.
///
/// Holds the reference samples of the current block, the prediction of every
/// mode evaluated for it and the resulting candidates.
pub struct IntraScratch<T: Pixel> {
  pub edge: IntraEdgeBuf<T>,
  preds: Vec<Aligned<[T; MAX_PU_SIZE * MAX_PU_SIZE]>>,
  evaluated: [bool; NUM_INTRA_MODES],
  bsize: BlockSize,
  candidates: IntraCandidates,
}

impl<T: Pixel> IntraScratch<T> {
  pub fn new() -> Self {
    IntraScratch {
      edge: IntraEdgeBuf::new(),
      preds: vec![
        Aligned::new([T::cast_from(0u8); MAX_PU_SIZE * MAX_PU_SIZE]);
        NUM_INTRA_MODES
      ],
      evaluated: [false; NUM_INTRA_MODES],
      bsize: BlockSize::BLOCK_4X4,
      candidates: IntraCandidates::new(1),
    }
  }

  /// Candidates of the last search.
  #[inline]
  pub fn candidates(&self) -> &IntraCandidates {
    &self.candidates
  }

  /// Prediction of `mode` for the last searched block, row-major with a
  /// stride of the block width, if the search evaluated it.
  pub fn prediction(&self, mode: PredictionMode) -> Option<&[T]> {
    self.evaluated[mode.index()]
      .then(|| &self.preds[mode.index()][..self.bsize.area()])
  }

  fn start_block(&mut self, bsize: BlockSize, capacity: usize) {
    self.evaluated = [false; NUM_INTRA_MODES];
    self.bsize = bsize;
    self.candidates = IntraCandidates::new(capacity);
  }
}

impl<T: Pixel> Default for IntraScratch<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// Ranks intra modes for the rate-distortion stage.
#[derive(Clone, Copy)]
pub struct IntraModeSearch<T: Pixel> {
  predictors: IntraPredictors<T>,
  bit_depth: usize,
  speed_settings: IntraSpeedSettings,
}

/// One block being searched.
struct BlockSearch<'a, T: Pixel> {
  predictors: &'a IntraPredictors<T>,
  scratch: &'a mut IntraScratch<T>,
  org: &'a [T],
  org_stride: usize,
  bsize: BlockSize,
  bit_depth: usize,
  avail: NeighborAvail,
  use_satd: bool,
  mpm: [PredictionMode; 2],
  lambda: u64,
  refine_budget: usize,
}

impl<'a, T: Pixel> BlockSearch<'a, T> {
  fn mode_bits(&self, mode: PredictionMode) -> u64 {
    if self.mpm.contains(&mode) {
      MPM_MODE_BITS
    } else {
      OTHER_MODE_BITS
    }
  }

  /// Predicts and scores `mode` unless already done for this block.
  fn visit(&mut self, mode: PredictionMode) {
    let idx = mode.index();
    if self.scratch.evaluated[idx] {
      return;
    }
    let bits = self.mode_bits(mode);
    let w = self.bsize.width();
    let h = self.bsize.height();
    let scratch = &mut *self.scratch;
    let pred = &mut scratch.preds[idx][..w * h];
    self.predictors.predict(
      pred,
      w,
      &scratch.edge,
      mode,
      self.bsize,
      self.bit_depth,
      self.avail,
    );
    scratch.evaluated[idx] = true;

    let dist = if self.use_satd {
      get_satd(self.org, self.org_stride, pred, w, w, h)
    } else {
      get_sad(self.org, self.org_stride, pred, w, w, h)
    };
    let cost = dist as u64 + self.lambda * bits;
    let kept = scratch.candidates.insert_if_better(mode, cost);
    log::trace!(
      "{:?} {:?}: dist {} cost {}{}",
      self.bsize,
      mode,
      dist,
      cost,
      if kept { "" } else { " (dropped)" }
    );
  }

  fn visit_index(&mut self, idx: isize) -> bool {
    if !(FIRST_ANGULAR as isize..=LAST_ANGULAR as isize).contains(&idx) {
      return false;
    }
    match PredictionMode::from_index(idx as usize) {
      Some(mode) if !self.scratch.evaluated[mode.index()] => {
        self.visit(mode);
        true
      }
      _ => false,
    }
  }

  fn exhaustive(&mut self) {
    for &mode in ALL_INTRA_MODES.iter() {
      self.visit(mode);
    }
  }

  fn rough(&mut self, num_rdo: usize) {
    // Anchors: the three non-angular modes and every fourth angular mode.
    for &mode in ALL_INTRA_MODES.iter() {
      let idx = mode.index();
      if !mode.is_angular() || idx % 4 == 0 {
        self.visit(mode);
      }
    }

    let snapshot: ArrayVec<PredictionMode, MAX_INTRA_CANDIDATES> =
      self.scratch.candidates.modes().collect();
    for mode in snapshot.into_iter().filter(|m| m.is_angular()) {
      let idx = mode.index() as isize;
      self.visit_index(idx - 2);
      self.visit_index(idx + 2);
    }

    let top: ArrayVec<PredictionMode, 2> =
      self.scratch.candidates.modes().take(2).collect();
    let mut budget = self.refine_budget;
    'refine: for mode in top.into_iter().filter(|m| m.is_angular()) {
      let idx = mode.index() as isize;
      for n in [idx - 1, idx + 1] {
        if budget == 0 {
          break 'refine;
        }
        if self.visit_index(n) {
          budget -= 1;
        }
      }
    }

    for mode in self.mpm {
      self.visit(mode);
    }

    let mut visited = self.scratch.evaluated;
    self.scratch.candidates =
      compact_candidates(&self.scratch.candidates, &mut visited, num_rdo);
  }
}

/// Keeps up to `num_rdo` candidates whose angular neighbours were visited.
///
/// Non-angular modes are always kept. Mode 3 only needs mode 4, mode 32 only
/// mode 31, and mode 31 only mode 30; a kept mode 31 marks mode 32 visited.
/// The best candidate survives if nothing else does.
fn compact_candidates(
  cands: &IntraCandidates, visited: &mut [bool; NUM_INTRA_MODES],
  num_rdo: usize,
) -> IntraCandidates {
  let mut kept = IntraCandidates::new(num_rdo);
  for c in cands.iter() {
    if kept.len() == kept.capacity() {
      break;
    }
    let m = c.mode.index();
    let keep = match m {
      0..=2 => true,
      FIRST_ANGULAR => visited[m + 1],
      31 => {
        let k = visited[30];
        if k {
          visited[32] = true;
        }
        k
      }
      LAST_ANGULAR => visited[m - 1],
      _ => visited[m - 1] && visited[m + 1],
    };
    if keep {
      kept.insert_if_better(c.mode, c.cost);
    }
  }
  if kept.is_empty() {
    if let Some(best) = cands.best() {
      kept.insert_if_better(best.mode, best.cost);
    }
  }
  kept
}

impl<T: Pixel> IntraModeSearch<T> {
  pub fn new(config: &IntraConfig) -> Self {
    IntraModeSearch {
      predictors: IntraPredictors::new(config.effective_cpu_level()),
      bit_depth: config.bit_depth,
      speed_settings: config.speed_settings,
    }
  }

  #[inline]
  pub const fn predictors(&self) -> &IntraPredictors<T> {
    &self.predictors
  }

  /// Strategy the speed settings ask for when no mode is imposed.
  #[inline]
  pub const fn default_strategy(&self) -> SearchStrategy {
    if self.speed_settings.rough_mode_decision {
      SearchStrategy::Rough
    } else {
      SearchStrategy::Exhaustive
    }
  }

  /// Searches the `bsize` block at `src` against the original picture
  /// `org`, leaving the candidates and predictions in `scratch`.
  ///
  /// `mpm` are the two most probable modes and `lambda` weighs the mode
  /// signalling bits against distortion. Returns the number of candidates
  /// selected for RDO.
  pub fn search(
    &self, scratch: &mut IntraScratch<T>, strategy: SearchStrategy,
    src: &EdgeSource<'_, T>, bsize: BlockSize, avail: NeighborAvail,
    org: &Plane<T>, mpm: [PredictionMode; 2], lambda: u32,
  ) -> usize {
    let num_rdo = self.speed_settings.rdo_candidates_for(bsize);
    let capacity = match strategy {
      SearchStrategy::Exhaustive => num_rdo,
      SearchStrategy::Rough => MAX_INTRA_CANDIDATES,
      SearchStrategy::Single(_) => 1,
    };
    scratch.start_block(bsize, capacity);
    fill_intra_edges(src, &mut scratch.edge, avail, bsize, self.bit_depth);

    let org_stride = org.cfg.stride;
    let mut block = BlockSearch {
      predictors: &self.predictors,
      scratch,
      org: &org.data_origin()[src.y * org_stride + src.x..],
      org_stride,
      bsize,
      bit_depth: self.bit_depth,
      avail,
      use_satd: self.speed_settings.use_satd,
      mpm,
      lambda: lambda as u64,
      refine_budget: self.speed_settings.rmd_refine_budget,
    };

    match strategy {
      SearchStrategy::Exhaustive => block.exhaustive(),
      SearchStrategy::Rough => block.rough(num_rdo),
      SearchStrategy::Single(mode) => block.visit(mode),
    }

    let count = block.scratch.candidates.len();
    log::debug!(
      "{:?} at ({}, {}): {:?} kept {} of {} modes, best {:?}",
      bsize,
      src.x,
      src.y,
      strategy,
      count,
      block.scratch.evaluated.iter().filter(|&&e| e).count(),
      block.scratch.candidates.best().map(|c| c.mode)
    );
    count
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::intra_edge::CtuBorderCache;
  use crate::predict::PredictionMode::*;
  use pretty_assertions::assert_eq;
  use rand::{Rng, SeedableRng};
  use rand_chacha::ChaChaRng;

  #[test]
  fn insertion_keeps_costs_sorted() {
    let mut cands = IntraCandidates::new(4);
    for (mode, cost) in
      [(ANG_X_3, 50), (ANG_X_4, 30), (ANG_X_5, 80), (ANG_X_6, 10)]
    {
      assert!(cands.insert_if_better(mode, cost));
    }
    let got: Vec<_> = cands.iter().map(|c| (c.mode, c.cost)).collect();
    assert_eq!(
      got,
      vec![(ANG_X_6, 10), (ANG_X_4, 30), (ANG_X_3, 50), (ANG_X_5, 80)]
    );
  }

  #[test]
  fn full_list_drops_worst_and_rejects_ties() {
    let mut cands = IntraCandidates::new(2);
    assert!(cands.insert_if_better(DC_PRED, 5));
    assert!(cands.insert_if_better(PLANE_PRED, 5));
    // Equal cost on a full list does not improve it.
    assert!(!cands.insert_if_better(BI_PRED, 5));
    assert!(cands.insert_if_better(VERT_PRED, 1));
    let got: Vec<_> = cands.modes().collect();
    assert_eq!(got, vec![VERT_PRED, DC_PRED]);
  }

  #[test]
  #[should_panic]
  fn capacity_above_maximum_panics() {
    let _ = IntraCandidates::new(MAX_INTRA_CANDIDATES + 1);
  }

  #[test]
  fn compaction_applies_boundary_rules() {
    let mut cands = IntraCandidates::new(MAX_INTRA_CANDIDATES);
    for (cost, mode) in
      [ANG_Y_31, ANG_Y_32, ANG_X_3, ANG_X_7, DC_PRED].into_iter().enumerate()
    {
      cands.insert_if_better(mode, cost as u64);
    }
    let mut visited = [false; NUM_INTRA_MODES];
    for m in [0, 1, 2, 4, 30, 31] {
      visited[m] = true;
    }
    let kept = compact_candidates(&cands, &mut visited, 10);
    let got: Vec<_> = kept.modes().collect();
    assert_eq!(got, vec![ANG_Y_31, ANG_Y_32, ANG_X_3, DC_PRED]);
    assert!(visited[32]);

    let kept = compact_candidates(&cands, &mut visited, 2);
    assert_eq!(kept.len(), 2);
  }

  #[test]
  fn compaction_keeps_best_when_nothing_qualifies() {
    let mut cands = IntraCandidates::new(3);
    cands.insert_if_better(ANG_X_7, 3);
    cands.insert_if_better(ANG_XY_18, 1);
    let mut visited = [false; NUM_INTRA_MODES];
    let kept = compact_candidates(&cands, &mut visited, 3);
    assert_eq!(kept.modes().collect::<Vec<_>>(), vec![ANG_XY_18]);
  }

  // 64x64 pictures; the 8x8 block at (16, 16) is the first block of a
  // 16x16 CTU. Its source rows repeat the reconstructed left neighbours, so
  // only HOR_PRED predicts it exactly.
  struct Fixture {
    recon: Plane<u8>,
    org: Plane<u8>,
    cache: CtuBorderCache<u8>,
  }

  fn fixture() -> Fixture {
    let mut rng = ChaChaRng::from_seed([11; 32]);
    let mut recon = Plane::new(64, 64, 0, 0, 0, 0);
    for v in recon.data_origin_mut().iter_mut() {
      *v = rng.gen();
    }
    let mut org = recon.clone();
    let stride = org.cfg.stride;
    for y in 16..24 {
      let left = recon.p(15, y);
      org.data_origin_mut()[y * stride + 16..y * stride + 24].fill(left);
    }
    let mut cache = CtuBorderCache::new(4);
    cache.reset(16, 16);
    Fixture { recon, org, cache }
  }

  #[test]
  fn exhaustive_search_finds_horizontal() {
    let f = fixture();
    let search = IntraModeSearch::<u8>::new(&IntraConfig::default());
    let mut scratch = IntraScratch::new();
    let src = EdgeSource::new(&f.recon, &f.cache, 16, 16);
    let count = search.search(
      &mut scratch,
      SearchStrategy::Exhaustive,
      &src,
      BlockSize::BLOCK_8X8,
      NeighborAvail::all(),
      &f.org,
      [DC_PRED, PLANE_PRED],
      4,
    );
    assert_eq!(count, 9);
    // HOR_PRED is not an MPM: zero distortion plus 4 * 6 bits.
    assert_eq!(
      scratch.candidates().best(),
      Some(IntraCandidate { mode: HOR_PRED, cost: 24 })
    );
    let costs: Vec<_> = scratch.candidates().iter().map(|c| c.cost).collect();
    assert!(costs.windows(2).all(|w| w[0] <= w[1]));
    for &mode in ALL_INTRA_MODES.iter() {
      assert!(scratch.prediction(mode).is_some());
    }
  }

  #[test]
  fn rough_search_respects_rdo_count() {
    let f = fixture();
    let cfg = IntraConfig::with_speed_preset(4);
    let search = IntraModeSearch::<u8>::new(&cfg);
    assert_eq!(search.default_strategy(), SearchStrategy::Rough);
    let mut scratch = IntraScratch::new();
    let src = EdgeSource::new(&f.recon, &f.cache, 16, 16);
    let count = search.search(
      &mut scratch,
      SearchStrategy::Rough,
      &src,
      BlockSize::BLOCK_8X8,
      NeighborAvail::all(),
      &f.org,
      [HOR_PRED, DC_PRED],
      4,
    );
    assert!(count >= 1);
    let rdo_count =
      cfg.speed_settings.rdo_candidates_for(BlockSize::BLOCK_8X8);
    assert!(count <= rdo_count);
    // Mode 24 is an anchor and an MPM.
    assert_eq!(scratch.candidates().best().map(|c| c.mode), Some(HOR_PRED));
    // Modes never evaluated have no cached prediction.
    assert!(ALL_INTRA_MODES.iter().any(|&m| scratch.prediction(m).is_none()));
  }

  // Flat reconstruction: every mode predicts the same block, so all modes
  // share one distortion and only the MPM bits and visiting order rank them.
  fn rough_visits(
    budget: usize, mpm: [PredictionMode; 2],
  ) -> (Vec<usize>, Vec<PredictionMode>) {
    let mut rng = ChaChaRng::from_seed([5; 32]);
    let mut recon = Plane::new(64, 64, 0, 0, 0, 0);
    recon.data_origin_mut().fill(100u8);
    let mut org = Plane::new(64, 64, 0, 0, 0, 0);
    for v in org.data_origin_mut().iter_mut() {
      *v = rng.gen();
    }
    let mut cache = CtuBorderCache::new(4);
    cache.reset(16, 16);

    let mut cfg = IntraConfig::with_speed_preset(4);
    cfg.speed_settings.rmd_refine_budget = budget;
    let search = IntraModeSearch::<u8>::new(&cfg);
    let mut scratch = IntraScratch::new();
    let src = EdgeSource::new(&recon, &cache, 16, 16);
    let count = search.search(
      &mut scratch,
      SearchStrategy::Rough,
      &src,
      BlockSize::BLOCK_16X16,
      NeighborAvail::all(),
      &org,
      mpm,
      4,
    );
    assert_eq!(scratch.candidates().capacity(), 4);
    assert_eq!(count, scratch.candidates().len());

    let visited = ALL_INTRA_MODES
      .iter()
      .filter(|&&m| scratch.prediction(m).is_some())
      .map(|m| m.index())
      .collect();
    (visited, scratch.candidates().modes().collect())
  }

  #[test]
  fn rough_search_expands_anchors_and_forces_mpms() {
    let (visited, kept) =
      rough_visits(RMD_REFINE_BUDGET, [ANG_XY_13, ANG_Y_27]);
    // Anchors, +-2 around the anchors kept, then both MPMs. The best two
    // candidates are DC and PLANE, so nothing is refined.
    assert_eq!(
      visited,
      vec![
        0, 1, 2, 4, 6, 8, 10, 12, 13, 14, 16, 18, 20, 22, 24, 26, 27, 28, 30,
        32
      ]
    );
    assert_eq!(kept, vec![ANG_XY_13, ANG_Y_27, DC_PRED, PLANE_PRED]);
  }

  #[test]
  fn refinement_stops_at_budget() {
    // Two angular MPMs among the anchors lead the list and get refined.
    let expanded =
      [0, 1, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32];

    let (visited, _) = rough_visits(4, [ANG_X_8, ANG_Y_28]);
    let mut expected = expanded.to_vec();
    expected.extend([7, 9, 27, 29]);
    expected.sort_unstable();
    assert_eq!(visited, expected);

    let (visited, _) = rough_visits(2, [ANG_X_8, ANG_Y_28]);
    let mut expected = expanded.to_vec();
    expected.extend([7, 9]);
    expected.sort_unstable();
    assert_eq!(visited, expected);

    let (visited, _) = rough_visits(0, [ANG_X_8, ANG_Y_28]);
    assert_eq!(visited, expanded.to_vec());
  }

  #[test]
  fn single_mode_matches_direct_prediction() {
    let f = fixture();
    let search = IntraModeSearch::<u8>::new(&IntraConfig::default());
    let mut scratch = IntraScratch::new();
    let src = EdgeSource::new(&f.recon, &f.cache, 16, 16);
    let count = search.search(
      &mut scratch,
      SearchStrategy::Single(ANG_XY_14),
      &src,
      BlockSize::BLOCK_8X8,
      NeighborAvail::all(),
      &f.org,
      [DC_PRED, PLANE_PRED],
      0,
    );
    assert_eq!(count, 1);
    assert_eq!(scratch.candidates().best().map(|c| c.mode), Some(ANG_XY_14));

    let mut expected = [0u8; 64];
    search.predictors().predict(
      &mut expected,
      8,
      &scratch.edge,
      ANG_XY_14,
      BlockSize::BLOCK_8X8,
      8,
      NeighborAvail::all(),
    );
    assert_eq!(scratch.prediction(ANG_XY_14), Some(&expected[..]));
    assert!(scratch.prediction(DC_PRED).is_none());
  }
}
