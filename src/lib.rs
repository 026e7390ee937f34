//! Pfmat -- Phase-field fracture and crystal plasticity material models
//!
//! This crate implements constitutive models evaluated at the integration (Gauss) points of a
//! finite element simulation:
//!
//! * [material::PolycrystalElasticity] interpolates the elasticity tensor and the crystal rotation
//!   of a polycrystal from phase-field order parameters and per-grain data
//! * [material::StrainSplitDamage] splits the strain into tensile and compressive parts and degrades
//!   the tensile stress by a damage (phase-field fracture) variable
//! * [material::CrystalPlasticity] updates the state of a finite-strain crystal plasticity model by an
//!   implicit (Backward Euler) local solve, including plastic work and bulk viscosity
//!
//! All models implement [material::ConstitutiveModel] and are evaluated independently at each point.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod material;
pub mod prelude;
