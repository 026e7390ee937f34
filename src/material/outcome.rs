use super::LocalState;
use crate::StrError;
use russell_lab::Vector;
use russell_tensor::{Tensor2, Tensor4};
use serde::{Deserialize, Serialize};

/// Holds statistics of the local (integration point) solver
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSolverStats {
    /// Number of substeps of the last attempt
    pub n_substep: usize,

    /// Total number of fixed-point iterations on the slip system resistances
    pub n_iteration_gss: usize,

    /// Total number of Newton iterations on the stress
    pub n_iteration_stress: usize,

    /// Norm of the stress residual at the end of the last Newton loop
    pub residual_norm: f64,
}

/// Holds the properties computed by the polycrystal elasticity interpolator
#[derive(Clone, Debug)]
pub struct PolycrystalProperties {
    /// Holds the derivatives of the elasticity tensor with respect to each order parameter (scaled to eV)
    pub delasticity_dop: Vec<Tensor4>,

    /// Holds the interpolated crystal rotation (crysrot = Rᵀ; general tensor)
    pub crystal_rotation: Tensor2,

    /// Holds the sum of interpolation weights Σh (before clamping)
    pub total_weight: f64,
}

/// Holds the properties computed by the strain-split damage model
#[derive(Clone, Debug)]
pub struct DamageProperties {
    /// Holds the derivative of the stress with respect to the damage variable: ∂σ/∂c
    pub dstress_ddamage: Tensor2,

    /// Holds the positive (tensile) elastic energy G0⁺
    pub g0_pos: f64,

    /// Holds the derivative of the positive elastic energy with respect to the strain: ∂G0⁺/∂ε
    pub dg0_pos_dstrain: Tensor2,

    /// Holds the positive parts of the principal strains
    pub positive_principal_strains: Vector,
}

/// Holds the properties computed by the crystal plasticity model
#[derive(Clone, Debug)]
pub struct PlasticityProperties {
    /// Holds the elastic energy density W0e
    pub w0e: f64,

    /// Holds the accumulated plastic work density W0p
    pub w0p: f64,

    /// Holds ∂W0e/∂ε
    pub dw0e_dstrain: Tensor2,

    /// Holds ∂W0p/∂ε
    pub dw0p_dstrain: Tensor2,

    /// Holds the artificial bulk viscosity pressure q
    pub viscous_pressure: f64,

    /// Holds the local solver statistics
    pub stats: LocalSolverStats,
}

/// Holds the model-specific properties of an update
#[derive(Clone, Debug)]
pub enum DerivedProperties {
    Polycrystal(PolycrystalProperties),
    StrainSplitDamage(DamageProperties),
    CrystalPlasticity(PlasticityProperties),
}

/// Holds the results of a converged update at a point
#[derive(Clone, Debug)]
pub struct PointUpdate {
    /// Holds the new (current) local state
    pub state: LocalState,

    /// Holds the tangent modulus (Jacobian multiplier)
    pub tangent: Tensor4,

    /// Holds the model-specific properties
    pub derived: DerivedProperties,
}

/// Holds the information of a failed local solve
#[derive(Clone, Debug)]
pub struct Cutback {
    /// Holds the reason of the failure
    pub reason: StrError,

    /// Holds the local solver statistics
    pub stats: LocalSolverStats,
}

/// Holds the outcome of a constitutive update
///
/// A local non-convergence is not an error; instead, the host is asked to
/// reduce the time step and retry.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The update converged
    Converged(PointUpdate),

    /// The update did not converge and the host should cut the time step back
    Cutback(Cutback),
}

impl DerivedProperties {
    /// Returns the polycrystal properties
    pub fn polycrystal(&self) -> Result<&PolycrystalProperties, StrError> {
        match self {
            DerivedProperties::Polycrystal(p) => Ok(p),
            _ => Err("properties do not correspond to the polycrystal interpolator"),
        }
    }

    /// Returns the strain-split damage properties
    pub fn damage(&self) -> Result<&DamageProperties, StrError> {
        match self {
            DerivedProperties::StrainSplitDamage(p) => Ok(p),
            _ => Err("properties do not correspond to the strain-split damage model"),
        }
    }

    /// Returns the crystal plasticity properties
    pub fn plasticity(&self) -> Result<&PlasticityProperties, StrError> {
        match self {
            DerivedProperties::CrystalPlasticity(p) => Ok(p),
            _ => Err("properties do not correspond to the crystal plasticity model"),
        }
    }
}

impl Outcome {
    /// Indicates whether the update converged or not
    pub fn converged(&self) -> bool {
        match self {
            Outcome::Converged(_) => true,
            Outcome::Cutback(_) => false,
        }
    }

    /// Returns the update or the cutback reason as an error
    pub fn into_update(self) -> Result<PointUpdate, StrError> {
        match self {
            Outcome::Converged(update) => Ok(update),
            Outcome::Cutback(cutback) => Err(cutback.reason),
        }
    }

    /// Returns the local solver statistics, if any
    pub fn stats(&self) -> Option<LocalSolverStats> {
        match self {
            Outcome::Converged(update) => match &update.derived {
                DerivedProperties::CrystalPlasticity(p) => Some(p.stats),
                _ => None,
            },
            Outcome::Cutback(cutback) => Some(cutback.stats),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
