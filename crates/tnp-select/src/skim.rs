//! The per-event skim pipeline.
//!
//! Wires the stages together: eligibility predicates → jet cleaning →
//! trigger matching → truth matching → candidate resolution → record
//! composition. Each event is resolved independently; the batch driver
//! parallelizes over events with one derived RNG seed per event.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use tnp_core::{Error, PairRecord, Result};
use tnp_event::{CompiledExpr, EventTable};

use crate::association::{clean_from_jets, gen_match, trigger_match};
use crate::config::SelectionConfig;
use crate::kinematics::pair_kinematics;
use crate::resolver::{Electrons, Outcome, resolve_pole_nearest, resolve_random_pair};

/// Candidate-resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Random pair from the mass-windowed cross product.
    RandomPair,
    /// pT-ordered tag with the pole-mass-nearest probe.
    PoleNearest,
}

/// A configured skim with all selection expressions compiled once.
pub struct Skimmer {
    config: SelectionConfig,
    policy: Policy,
    good_electrons: CompiledExpr,
    good_jets: CompiledExpr,
    tag_id: CompiledExpr,
    working_points: Vec<(String, CompiledExpr)>,
    weight: Option<CompiledExpr>,
}

impl Skimmer {
    /// Compile the configuration's expressions into a ready skim.
    pub fn new(config: SelectionConfig, policy: Policy) -> Result<Self> {
        config.validate()?;
        let good_electrons = CompiledExpr::compile(&config.good_electrons)?;
        let good_jets = CompiledExpr::compile(&config.good_jets)?;
        let tag_id = CompiledExpr::compile(&config.tag_id)?;
        let working_points = config
            .working_points
            .iter()
            .map(|wp| Ok((wp.name.clone(), CompiledExpr::compile(&wp.expr)?)))
            .collect::<Result<Vec<_>>>()?;
        let weight = config.weight.as_deref().map(CompiledExpr::compile).transpose()?;
        Ok(Self { config, policy, good_electrons, good_jets, tag_id, working_points, weight })
    }

    /// The configuration this skim runs with.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Resolve one event to a reduced record, or nothing.
    ///
    /// `index` identifies the event when no `event` column is present.
    pub fn skim_event(
        &self,
        table: &EventTable,
        index: usize,
        rng: &mut impl Rng,
    ) -> Result<Option<PairRecord>> {
        if !table.has("Electron_pt") || table.collection_len("Electron_pt")? == 0 {
            return Ok(None);
        }
        let cfg = &self.config;
        let ele = Electrons {
            pt: table.floats("Electron_pt")?,
            eta: table.floats("Electron_eta")?,
            phi: table.floats("Electron_phi")?,
            mass: table.floats("Electron_mass")?,
        };
        let n = ele.len();

        // Threshold eligibility, then geometric cleaning.
        let good_ele = self.good_electrons.eval_mask(table)?;
        let (good_jet, jet_eta, jet_phi) = if table.has("Jet_eta") {
            (
                self.good_jets.eval_mask(table)?,
                table.floats("Jet_eta")?.to_vec(),
                table.floats("Jet_phi")?.to_vec(),
            )
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };
        let clean = clean_from_jets(
            &good_ele,
            ele.eta,
            ele.phi,
            &good_jet,
            &jet_eta,
            &jet_phi,
            cfg.jet_clean_dr,
        );

        // Tight identification gates both the tag and the probe side.
        let tag_id = self.tag_id.eval_mask(table)?;
        let tight: Vec<bool> = (0..n).map(|i| tag_id[i] && clean[i]).collect();

        let trigger = if table.has("TrigObj_eta") {
            trigger_match(
                &tight,
                ele.eta,
                ele.phi,
                table.ints("TrigObj_id")?,
                table.ints("TrigObj_filterBits")?,
                table.floats("TrigObj_eta")?,
                table.floats("TrigObj_phi")?,
                cfg.trigger_dr,
                cfg.trigger_filter_bit,
            )
        } else {
            vec![false; n]
        };

        // Genuine-match labels: data is genuine by construction.
        let genuine: Vec<bool> = if cfg.is_mc {
            gen_match(
                &tight,
                ele.eta,
                ele.phi,
                table.ints("GenPart_pdgId")?,
                table.floats("GenPart_pt")?,
                table.floats("GenPart_eta")?,
                table.floats("GenPart_phi")?,
                table.ints("GenPart_statusFlags")?,
                cfg.gen_match_cuts(),
            )
            .iter()
            .map(|&idx| idx >= 0)
            .collect()
        } else {
            vec![true; n]
        };

        let outcome = match self.policy {
            Policy::RandomPair => {
                let tag_eligible: Vec<bool> = (0..n).map(|i| tight[i] && trigger[i]).collect();
                resolve_random_pair(
                    &ele,
                    &tag_eligible,
                    &tight,
                    &genuine,
                    cfg.mass_window,
                    cfg.max_pair_draws,
                    rng,
                )
            }
            Policy::PoleNearest => {
                resolve_pole_nearest(&ele, &clean, &tight, &trigger, &genuine, cfg.pole_mass, rng)
            }
        };

        let (pair, mc_truth) = match outcome {
            Outcome::Selected { pair, mc_truth } => (pair, mc_truth),
            Outcome::NoCandidate => {
                debug!(event = index, "no tag/probe candidate");
                return Ok(None);
            }
        };

        let tag_p4 = ele.p4(pair.tag);
        let probe_p4 = ele.p4(pair.probe);
        let charge = self.electron_charges(table, n)?;

        let working_points = self
            .working_points
            .iter()
            .map(|(name, expr)| {
                let id = expr.eval_mask(table)?;
                Ok((name.clone(), id[pair.probe] && good_ele[pair.probe] && clean[pair.probe]))
            })
            .collect::<Result<Vec<_>>>()?;

        let weight = self.weight.as_ref().map(|w| w.eval_scalar(table)).transpose()?;

        Ok(Some(PairRecord {
            event: event_id(table, index)?,
            tag: tag_p4.kinematics(),
            tag_charge: charge[pair.tag],
            probe: probe_p4.kinematics(),
            probe_charge: charge[pair.probe],
            pair: pair_kinematics(tag_p4, probe_p4),
            mc_truth,
            working_points,
            weight,
        }))
    }

    /// Skim a batch of events in parallel.
    ///
    /// Event `i` draws from a `StdRng` seeded `base_seed + i`, so runs
    /// are reproducible given a configured seed and workers never share
    /// a random stream. Events without a resolved pair contribute no
    /// record.
    pub fn skim_events(&self, tables: &[EventTable]) -> Result<Vec<PairRecord>> {
        let base_seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        let records = tables
            .par_iter()
            .enumerate()
            .map(|(i, table)| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
                self.skim_event(table, i, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(records.into_iter().flatten().collect())
    }

    fn electron_charges(&self, table: &EventTable, n: usize) -> Result<Vec<i32>> {
        if table.has("Electron_charge") {
            Ok(table.ints("Electron_charge")?.to_vec())
        } else {
            Ok(vec![0; n])
        }
    }
}

fn event_id(table: &EventTable, index: usize) -> Result<u64> {
    if !table.has("event") {
        return Ok(index as u64);
    }
    let col = table.col("event")?;
    if col.len() != 1 {
        return Err(Error::Validation(format!(
            "'event' must be a scalar column, got length {}",
            col.len()
        )));
    }
    Ok(col.value(0) as u64)
}
