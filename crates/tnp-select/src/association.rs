//! Geometric association between object collections.
//!
//! Three concrete matching stages built on the cross-product enumeration:
//! jet cleaning, trigger matching and generator-truth matching. Every
//! angular threshold is supplied by the caller (configuration), not
//! hardcoded.

use crate::combinatorics::index_pairs;
use crate::geometry::delta_r;

/// PDG identity code of the electron.
pub const ELECTRON_PDG_ID: i32 = 11;

/// Generator status bit: particle is prompt.
pub const STATUS_PROMPT_BIT: u32 = 0;

/// Generator status bit: particle is the last copy in the generation
/// record.
pub const STATUS_LAST_COPY_BIT: u32 = 13;

/// Sentinel index meaning "no matched object".
pub const NO_MATCH: i32 = -1;

fn bit_set(mask: i32, bit: u32) -> bool {
    mask & (1 << bit) != 0
}

/// Jet cleaning: an eligible electron stays clean unless some eligible
/// jet lies within `max_dr` of it. Ineligible electrons are never clean.
pub fn clean_from_jets(
    good_electron: &[bool],
    ele_eta: &[f64],
    ele_phi: &[f64],
    good_jet: &[bool],
    jet_eta: &[f64],
    jet_phi: &[f64],
    max_dr: f64,
) -> Vec<bool> {
    let mut clean = good_electron.to_vec();
    for (ie, ij) in index_pairs(ele_eta.len(), jet_eta.len()) {
        if good_electron[ie]
            && good_jet[ij]
            && delta_r(ele_eta[ie], ele_phi[ie], jet_eta[ij], jet_phi[ij]) <= max_dr
        {
            clean[ie] = false;
        }
    }
    clean
}

/// Trigger matching: a candidate electron is matched when some trigger
/// object carries the electron identity code, has `filter_bit` set in its
/// filter bitmask, and lies within `max_dr`. One satisfying object is
/// enough.
#[allow(clippy::too_many_arguments)]
pub fn trigger_match(
    candidate: &[bool],
    ele_eta: &[f64],
    ele_phi: &[f64],
    trig_id: &[i32],
    trig_filter_bits: &[i32],
    trig_eta: &[f64],
    trig_phi: &[f64],
    max_dr: f64,
    filter_bit: u32,
) -> Vec<bool> {
    let mut matched = vec![false; ele_eta.len()];
    for (ie, it) in index_pairs(ele_eta.len(), trig_eta.len()) {
        if matched[ie] || !candidate[ie] {
            continue;
        }
        if trig_id[it].abs() != ELECTRON_PDG_ID || !bit_set(trig_filter_bits[it], filter_bit) {
            continue;
        }
        if delta_r(ele_eta[ie], ele_phi[ie], trig_eta[it], trig_phi[it]) < max_dr {
            matched[ie] = true;
        }
    }
    matched
}

/// Cuts a generator particle must pass to enter truth matching.
#[derive(Debug, Clone, Copy)]
pub struct GenMatchCuts {
    /// Minimum generator momentum (GeV).
    pub min_pt: f64,
    /// Maximum |pseudorapidity|.
    pub max_abs_eta: f64,
    /// Maximum accepted angular separation.
    pub max_dr: f64,
}

impl Default for GenMatchCuts {
    fn default() -> Self {
        Self { min_pt: 3.0, max_abs_eta: 2.7, max_dr: 0.2 }
    }
}

/// Generator-truth matching.
///
/// For each selected electron, scan generator particles that are
/// electrons (|pdg| == 11), pass the kinematic cuts, and are flagged both
/// prompt and last-copy. The match is the candidate at the smallest
/// angular separation across ALL qualifying candidates; it is accepted
/// only when that minimum is below `cuts.max_dr`. Unselected or
/// unmatched electrons get [`NO_MATCH`].
#[allow(clippy::too_many_arguments)]
pub fn gen_match(
    selected: &[bool],
    ele_eta: &[f64],
    ele_phi: &[f64],
    gen_pdg: &[i32],
    gen_pt: &[f64],
    gen_eta: &[f64],
    gen_phi: &[f64],
    gen_status: &[i32],
    cuts: GenMatchCuts,
) -> Vec<i32> {
    let mut matched = vec![NO_MATCH; ele_eta.len()];
    for (ie, &is_selected) in selected.iter().enumerate() {
        if !is_selected {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for ig in 0..gen_eta.len() {
            if gen_pdg[ig].abs() != ELECTRON_PDG_ID
                || gen_pt[ig] < cuts.min_pt
                || gen_eta[ig].abs() > cuts.max_abs_eta
                || !bit_set(gen_status[ig], STATUS_PROMPT_BIT)
                || !bit_set(gen_status[ig], STATUS_LAST_COPY_BIT)
            {
                continue;
            }
            let dr = delta_r(ele_eta[ie], ele_phi[ie], gen_eta[ig], gen_phi[ig]);
            if best.is_none_or(|(_, best_dr)| dr < best_dr) {
                best = Some((ig, dr));
            }
        }
        if let Some((ig, dr)) = best
            && dr < cuts.max_dr
        {
            matched[ie] = ig as i32;
        }
    }
    matched
}
