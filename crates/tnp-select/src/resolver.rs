//! Candidate-pair resolution.
//!
//! Builds tag/probe pairs from eligibility masks, applies the
//! invariant-mass constraint, and resolves each event to a single pair
//! (or none) under one of two policies. The random source is an injected
//! dependency so both policies are deterministically testable.

use rand::Rng;
use tracing::debug;

use crate::combinatorics::index_pairs;
use crate::kinematics::{FourMomentum, pair_mass};

/// Electron attribute arrays of one event, co-indexed.
///
/// Callers validate that all four slices share a length (the event table
/// does this per collection).
#[derive(Debug, Clone, Copy)]
pub struct Electrons<'a> {
    /// Transverse momenta.
    pub pt: &'a [f64],
    /// Pseudorapidities.
    pub eta: &'a [f64],
    /// Azimuths.
    pub phi: &'a [f64],
    /// Masses.
    pub mass: &'a [f64],
}

impl Electrons<'_> {
    /// Number of electrons.
    pub fn len(&self) -> usize {
        self.pt.len()
    }

    /// True when the event has no electrons.
    pub fn is_empty(&self) -> bool {
        self.pt.is_empty()
    }

    /// Four-momentum of electron `i`.
    pub fn p4(&self, i: usize) -> FourMomentum {
        FourMomentum::from_pt_eta_phi_m(self.pt[i], self.eta[i], self.phi[i], self.mass[i])
    }
}

/// A resolved tag/probe pair with its composed invariant mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePair {
    /// Tag index into the electron collection.
    pub tag: usize,
    /// Probe index into the electron collection.
    pub probe: usize,
    /// Composed tag+probe invariant mass (GeV).
    pub mass: f64,
}

/// Result of resolving one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Exactly one pair was selected.
    Selected {
        /// The resolved pair.
        pair: CandidatePair,
        /// AND of the tag and probe genuine-match labels.
        mc_truth: bool,
    },
    /// The event yields no pair.
    NoCandidate,
}

impl Outcome {
    /// The selected pair, if any.
    pub fn pair(&self) -> Option<CandidatePair> {
        match self {
            Outcome::Selected { pair, .. } => Some(*pair),
            Outcome::NoCandidate => None,
        }
    }
}

/// Policy R1: random pair from the mass-windowed cross product.
///
/// All (tag-eligible, probe-eligible) pairs whose composed mass falls
/// inside `window` are retained; a pair is then drawn uniformly at
/// random, redrawing while tag and probe coincide. The redraw is bounded
/// by `max_draws`: a retained list that cannot supply distinct indices
/// reports no candidate instead of looping.
pub fn resolve_random_pair(
    ele: &Electrons<'_>,
    tag_eligible: &[bool],
    probe_eligible: &[bool],
    genuine: &[bool],
    window: [f64; 2],
    max_draws: u32,
    rng: &mut impl Rng,
) -> Outcome {
    let n = ele.len();
    let mut retained: Vec<CandidatePair> = Vec::new();
    for (tag, probe) in index_pairs(n, n) {
        if !tag_eligible[tag] || !probe_eligible[probe] {
            continue;
        }
        let mass = pair_mass(ele.p4(tag), ele.p4(probe));
        if mass < window[0] || mass > window[1] {
            continue;
        }
        retained.push(CandidatePair { tag, probe, mass });
    }
    if retained.is_empty() {
        return Outcome::NoCandidate;
    }

    for _ in 0..max_draws {
        let pair = retained[rng.gen_range(0..retained.len())];
        if pair.tag != pair.probe {
            return Outcome::Selected {
                pair,
                mc_truth: genuine[pair.tag] && genuine[pair.probe],
            };
        }
    }
    debug!(retained = retained.len(), max_draws, "unresolvable ambiguity in random-pair draw");
    Outcome::NoCandidate
}

/// Policy R2: pT-ordered tag, pole-mass-nearest probe.
///
/// Clean electrons are sorted by descending pT (stable, ties keep index
/// order). The tag is drawn uniformly over the two leading candidates;
/// a tag failing the tight-identification or trigger-match predicate
/// rejects the event outright. The probe is the other clean electron
/// whose composed mass is nearest the pole mass (linear running-minimum
/// scan, no sampling).
pub fn resolve_pole_nearest(
    ele: &Electrons<'_>,
    clean: &[bool],
    tight: &[bool],
    trigger_matched: &[bool],
    genuine: &[bool],
    pole_mass: f64,
    rng: &mut impl Rng,
) -> Outcome {
    let mut candidates: Vec<usize> = (0..ele.len()).filter(|&i| clean[i]).collect();
    if candidates.len() < 2 {
        return Outcome::NoCandidate;
    }
    candidates.sort_by(|&a, &b| ele.pt[b].total_cmp(&ele.pt[a]));

    let tag = candidates[rng.gen_range(0..2usize)];
    if !tight[tag] || !trigger_matched[tag] {
        debug!(tag, "tag rejected by identification or trigger match");
        return Outcome::NoCandidate;
    }

    let tag_p4 = ele.p4(tag);
    let mut best: Option<(CandidatePair, f64)> = None;
    for &probe in &candidates {
        if probe == tag {
            continue;
        }
        let mass = pair_mass(tag_p4, ele.p4(probe));
        let dist = (mass - pole_mass).abs();
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((CandidatePair { tag, probe, mass }, dist));
        }
    }
    match best {
        Some((pair, _)) => Outcome::Selected {
            pair,
            mc_truth: genuine[pair.tag] && genuine[pair.probe],
        },
        None => Outcome::NoCandidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    const M_E: f64 = 0.000511;
    const WINDOW: [f64; 2] = [50.0, 130.0];

    /// Two electrons back to back at pt 45.6: pair mass ≈ 91.2.
    fn dielectron() -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            vec![45.6, 45.6],
            vec![0.0, 0.0],
            vec![0.0, PI],
            vec![M_E, M_E],
        )
    }

    fn electrons<'a>(
        arrays: &'a (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>),
    ) -> Electrons<'a> {
        Electrons { pt: &arrays.0, eta: &arrays.1, phi: &arrays.2, mass: &arrays.3 }
    }

    #[test]
    fn random_pair_never_selects_identical_indices() {
        let arrays = dielectron();
        let ele = electrons(&arrays);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = resolve_random_pair(
                &ele,
                &[true, true],
                &[true, true],
                &[true, true],
                WINDOW,
                32,
                &mut rng,
            );
            let pair = outcome.pair().expect("two non-degenerate candidates must resolve");
            assert_ne!(pair.tag, pair.probe);
            assert_relative_eq!(pair.mass, 91.2, epsilon = 1e-3);
        }
    }

    #[test]
    fn random_pair_truth_is_and_of_legs() {
        let arrays = dielectron();
        let ele = electrons(&arrays);
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = resolve_random_pair(
            &ele,
            &[true, true],
            &[true, true],
            &[true, false],
            WINDOW,
            32,
            &mut rng,
        );
        match outcome {
            Outcome::Selected { mc_truth, .. } => assert!(!mc_truth),
            Outcome::NoCandidate => panic!("expected a selected pair"),
        }
    }

    #[test]
    fn random_pair_empty_masks_yield_no_candidate() {
        let arrays = dielectron();
        let ele = electrons(&arrays);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = resolve_random_pair(
            &ele,
            &[false, false],
            &[true, true],
            &[true, true],
            WINDOW,
            32,
            &mut rng,
        );
        assert_eq!(outcome, Outcome::NoCandidate);
    }

    #[test]
    fn random_pair_out_of_window_pairs_are_dropped() {
        // pt 10 back to back: mass ≈ 20, below the window.
        let arrays =
            (vec![10.0, 10.0], vec![0.0, 0.0], vec![0.0, PI], vec![M_E, M_E]);
        let ele = electrons(&arrays);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = resolve_random_pair(
            &ele,
            &[true, true],
            &[true, true],
            &[true, true],
            WINDOW,
            32,
            &mut rng,
        );
        assert_eq!(outcome, Outcome::NoCandidate);
    }

    #[test]
    fn random_pair_bounded_retry_on_degenerate_list() {
        // A single heavy "electron": only the self-pair falls in the
        // window, so no draw can produce distinct indices. The bounded
        // retry must report no candidate instead of spinning.
        let arrays = (vec![45.6], vec![0.0], vec![0.0], vec![45.6]);
        let ele = electrons(&arrays);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome =
            resolve_random_pair(&ele, &[true], &[true], &[true], WINDOW, 8, &mut rng);
        assert_eq!(outcome, Outcome::NoCandidate);
    }

    #[test]
    fn random_pair_no_electrons() {
        let arrays = (vec![], vec![], vec![], vec![]);
        let ele = electrons(&arrays);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = resolve_random_pair(&ele, &[], &[], &[], WINDOW, 32, &mut rng);
        assert_eq!(outcome, Outcome::NoCandidate);
    }

    /// Two identical leading electrons (either may be drawn as tag) and
    /// three probe candidates composing to ≈ {80, 91, 105} GeV.
    fn pole_scan_event() -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        // Back-to-back massless legs at eta 0: m = 2·sqrt(pt_tag·pt_probe).
        (
            vec![100.0, 100.0, 16.0, 20.7025, 27.5625],
            vec![0.0; 5],
            vec![0.0, 0.0, PI, PI, PI],
            vec![0.0; 5],
        )
    }

    #[test]
    fn pole_nearest_picks_the_91_gev_probe() {
        let arrays = pole_scan_event();
        let ele = electrons(&arrays);
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = resolve_pole_nearest(
                &ele,
                &[true; 5],
                &[true; 5],
                &[true; 5],
                &[true; 5],
                91.1876,
                &mut rng,
            );
            let pair = outcome.pair().expect("expected a selected pair");
            assert_eq!(pair.probe, 3);
            assert_relative_eq!(pair.mass, 91.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn pole_nearest_rejects_untight_tag_without_retry() {
        let arrays = pole_scan_event();
        let ele = electrons(&arrays);
        let mut rng = StdRng::seed_from_u64(0);
        // Neither leading candidate passes tight ID.
        let outcome = resolve_pole_nearest(
            &ele,
            &[true; 5],
            &[false, false, true, true, true],
            &[true; 5],
            &[true; 5],
            91.1876,
            &mut rng,
        );
        assert_eq!(outcome, Outcome::NoCandidate);
    }

    #[test]
    fn pole_nearest_needs_two_clean_electrons() {
        let arrays = dielectron();
        let ele = electrons(&arrays);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = resolve_pole_nearest(
            &ele,
            &[true, false],
            &[true, true],
            &[true, true],
            &[true, true],
            91.1876,
            &mut rng,
        );
        assert_eq!(outcome, Outcome::NoCandidate);
    }

    #[test]
    fn pole_nearest_sort_is_stable_on_pt_ties() {
        // Equal-pT candidates keep index order, so the tag draw is over
        // indices {0, 1} in both possible outcomes.
        let arrays = (
            vec![45.6, 45.6, 40.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, PI, 1.0],
            vec![M_E, M_E, M_E],
        );
        let ele = electrons(&arrays);
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = resolve_pole_nearest(
                &ele,
                &[true; 3],
                &[true; 3],
                &[true; 3],
                &[true; 3],
                91.1876,
                &mut rng,
            );
            let pair = outcome.pair().unwrap();
            assert!(pair.tag < 2, "tag must come from the two leading candidates");
        }
    }
}
