//! Four-momentum composition for tag/probe pairs.

use std::ops::Add;

use tnp_core::Kinematics;

/// Cartesian four-momentum.
///
/// Built from collider coordinates `(pt, eta, phi, mass)`; summed
/// componentwise. Every invariant-mass number in the pipeline comes from
/// this type, so the resolver and the output record cannot diverge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourMomentum {
    px: f64,
    py: f64,
    pz: f64,
    e: f64,
}

impl FourMomentum {
    /// Build from transverse momentum, pseudorapidity, azimuth and mass.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p2 = px * px + py * py + pz * pz;
        let e = (mass * mass + p2).sqrt();
        Self { px, py, pz, e }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        (self.px * self.px + self.py * self.py).sqrt()
    }

    /// Pseudorapidity. Zero for a vanishing transverse momentum.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 { 0.0 } else { (self.pz / pt).asinh() }
    }

    /// Azimuth in `(-π, π]`.
    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }

    /// Invariant mass. Tiny negative `E² - p²` from floating error is
    /// clamped to zero.
    pub fn mass(&self) -> f64 {
        let p2 = self.px * self.px + self.py * self.py + self.pz * self.pz;
        (self.e * self.e - p2).max(0.0).sqrt()
    }

    /// Collider-coordinate view.
    pub fn kinematics(&self) -> Kinematics {
        Kinematics { pt: self.pt(), eta: self.eta(), phi: self.phi(), mass: self.mass() }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

/// Kinematics of the composed `a + b` system.
pub fn pair_kinematics(a: FourMomentum, b: FourMomentum) -> Kinematics {
    (a + b).kinematics()
}

/// Invariant mass of the composed `a + b` system.
pub fn pair_mass(a: FourMomentum, b: FourMomentum) -> f64 {
    (a + b).mass()
}
