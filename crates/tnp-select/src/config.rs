//! Selection configuration.
//!
//! Every threshold the matching and resolution stages use — the resonance
//! window and pole mass, the angular-separation cones, the eligibility
//! predicates and the working-point definitions — lives here so that
//! systematic-variation studies can tune them without touching code.

use std::path::Path;

use serde::Deserialize;
use tnp_core::{Error, Result};

use crate::association::GenMatchCuts;

/// One identification working point evaluated on the probe.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkingPoint {
    /// Name used for the output flag (`passing_<name>` in Parquet).
    pub name: String,
    /// Identification expression over electron columns.
    pub expr: String,
}

/// Tunable parameters of the tag-and-probe selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Accepted pair invariant-mass window `[low, high]` (GeV).
    pub mass_window: [f64; 2],
    /// Nominal resonance pole mass (GeV).
    pub pole_mass: f64,
    /// Jet-cleaning cone: an electron within this ΔR of a good jet is
    /// not clean.
    pub jet_clean_dr: f64,
    /// Trigger-matching cone.
    pub trigger_dr: f64,
    /// Bit in the trigger-object filter bitmask that denotes the tight
    /// working-point track-isolation filter.
    pub trigger_filter_bit: u32,
    /// Generator-truth matching cone.
    pub gen_match_dr: f64,
    /// Minimum generator-electron momentum (GeV).
    pub gen_min_pt: f64,
    /// Maximum generator-electron |pseudorapidity|.
    pub gen_max_abs_eta: f64,
    /// Retry bound for the random-pair draw; exhaustion yields no
    /// candidate instead of looping.
    pub max_pair_draws: u32,
    /// Seed for the resolver draws. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Whether generator collections are present and truth matching runs.
    pub is_mc: bool,
    /// Baseline electron eligibility.
    pub good_electrons: String,
    /// Baseline jet eligibility.
    pub good_jets: String,
    /// Tight identification predicate shared by the tag selection and
    /// truth matching.
    pub tag_id: String,
    /// Working points evaluated on the probe, in output order.
    pub working_points: Vec<WorkingPoint>,
    /// Optional per-event weight expression over scalar columns.
    pub weight: Option<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            mass_window: [50.0, 130.0],
            pole_mass: 91.1876,
            jet_clean_dr: 0.3,
            trigger_dr: 0.3,
            trigger_filter_bit: 1,
            gen_match_dr: 0.2,
            gen_min_pt: 3.0,
            gen_max_abs_eta: 2.7,
            max_pair_draws: 32,
            seed: None,
            is_mc: false,
            good_electrons: "abs(Electron_eta) < 2.5 && Electron_pt > 5".into(),
            good_jets: "Jet_pt > 30 && abs(Jet_eta) < 2.5 && Jet_jetId > 0 && Jet_puId > 4"
                .into(),
            tag_id: "Electron_cutBased == 4".into(),
            working_points: vec![
                WorkingPoint { name: "CutBasedVeto".into(), expr: "Electron_cutBased == 1".into() },
                WorkingPoint {
                    name: "CutBasedLoose".into(),
                    expr: "Electron_cutBased == 2".into(),
                },
                WorkingPoint {
                    name: "CutBasedMedium".into(),
                    expr: "Electron_cutBased == 3".into(),
                },
                WorkingPoint {
                    name: "CutBasedTight".into(),
                    expr: "Electron_cutBased == 4".into(),
                },
                WorkingPoint { name: "MVAtth".into(), expr: "Electron_mvaTTH > 0.7".into() },
            ],
            weight: None,
        }
    }
}

impl SelectionConfig {
    /// Load a configuration from a JSON file. Missing fields fall back
    /// to the defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Sanity-check the numeric parameters.
    pub fn validate(&self) -> Result<()> {
        let [lo, hi] = self.mass_window;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::Config(format!(
                "mass_window must satisfy low < high, got [{lo}, {hi}]"
            )));
        }
        if self.pole_mass <= 0.0 {
            return Err(Error::Config(format!("pole_mass must be positive, got {}", self.pole_mass)));
        }
        for (name, dr) in [
            ("jet_clean_dr", self.jet_clean_dr),
            ("trigger_dr", self.trigger_dr),
            ("gen_match_dr", self.gen_match_dr),
        ] {
            if dr <= 0.0 {
                return Err(Error::Config(format!("{name} must be positive, got {dr}")));
            }
        }
        if self.max_pair_draws == 0 {
            return Err(Error::Config("max_pair_draws must be at least 1".into()));
        }
        Ok(())
    }

    /// Generator-matching cuts in the shape the association stage takes.
    pub fn gen_match_cuts(&self) -> GenMatchCuts {
        GenMatchCuts {
            min_pt: self.gen_min_pt,
            max_abs_eta: self.gen_max_abs_eta,
            max_dr: self.gen_match_dr,
        }
    }

    /// True when `mass` lies inside the accepted window.
    pub fn mass_in_window(&self, mass: f64) -> bool {
        let [lo, hi] = self.mass_window;
        (lo..=hi).contains(&mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SelectionConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.mass_in_window(91.0));
        assert!(!cfg.mass_in_window(49.9));
        assert!(!cfg.mass_in_window(130.1));
        assert_eq!(cfg.working_points.len(), 5);
    }

    #[test]
    fn partial_json_overrides() {
        let cfg: SelectionConfig =
            serde_json::from_str(r#"{"mass_window": [60.0, 120.0], "is_mc": true, "seed": 7}"#)
                .unwrap();
        assert_eq!(cfg.mass_window, [60.0, 120.0]);
        assert!(cfg.is_mc);
        assert_eq!(cfg.seed, Some(7));
        // Untouched fields keep their defaults.
        assert_eq!(cfg.pole_mass, 91.1876);
        assert_eq!(cfg.max_pair_draws, 32);
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(serde_json::from_str::<SelectionConfig>(r#"{"mass_windoww": [1, 2]}"#).is_err());
    }

    #[test]
    fn invalid_windows_rejected() {
        let cfg: SelectionConfig =
            serde_json::from_str(r#"{"mass_window": [130.0, 50.0]}"#).unwrap();
        assert!(cfg.validate().is_err());
        let cfg: SelectionConfig = serde_json::from_str(r#"{"max_pair_draws": 0}"#).unwrap();
        assert!(cfg.validate().is_err());
    }
}
