use super::{EulerAngles, DEFAULT_KDAMAGE, DEFAULT_LENGTH_SCALE, DEFAULT_PRESSURE_SCALE, FCC_SLIP_SYSTEMS};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Holds the elastic constants of a crystal with cubic symmetry (Voigt notation)
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamCubicElasticity {
    /// C₁₁ constant
    pub c11: f64,

    /// C₁₂ constant
    pub c12: f64,

    /// C₄₄ constant (shear)
    pub c44: f64,
}

/// Holds parameters for the polycrystal elasticity interpolator
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamPolycrystal {
    /// Number of order parameters (op_num)
    pub n_order_parameter: usize,

    /// Length scale of the problem (m)
    pub length_scale: f64,

    /// Pressure scale of the problem (Pa)
    pub pressure_scale: f64,
}

/// Holds parameters for the strain-split (phase-field fracture) damage model
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamStrainSplitDamage {
    /// Young's modulus
    ///
    /// Used only if the elasticity tensor is not supplied by the integration point input.
    pub young: f64,

    /// Poisson's coefficient
    ///
    /// Used only if the elasticity tensor is not supplied by the integration point input.
    pub poisson: f64,

    /// Stiffness of the fully damaged material (must be > 0)
    pub kdamage: f64,
}

/// Holds the parameters of the power-law flow rule
///
/// ```text
/// Δγ = a0 |τ/g|^(1/xm) sign(τ) Δt
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamFlowRate {
    /// Reference slip rate
    pub a0: f64,

    /// Strain rate sensitivity exponent (0 < xm ≤ 1)
    pub xm: f64,
}

/// Holds the parameters of the slip system hardening law
///
/// ```text
/// h = h0 |1 - g/τsat|^a sign(1 - g/τsat)
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamHardening {
    /// Latent hardening ratio (between systems of different slip planes)
    pub r: f64,

    /// Initial hardening modulus
    pub h0: f64,

    /// Saturation slip system resistance
    pub tau_sat: f64,

    /// Hardening exponent
    pub a: f64,
}

/// Defines the kind of tangent modulus returned by the crystal plasticity model
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TangentKind {
    /// Returns the elasticity tensor
    Elastic,

    /// Returns the derivative of the Cauchy stress with respect to the elastic deformation gradient
    ///
    /// The slip increments are held fixed at their converged values; thus, this is the
    /// elastic part of the consistent tangent and omits the plastic flow contribution.
    Exact,
}

/// Holds the tolerances and iteration limits of the local (integration point) solver
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ParamLocalSolver {
    /// Relative tolerance of the stress residual
    pub rtol: f64,

    /// Absolute tolerance of the stress residual
    pub abs_tol: f64,

    /// Tolerance of the slip system resistance fixed-point iterations
    pub gtol: f64,

    /// Maximum allowed slip increment in a single step
    pub slip_incr_tol: f64,

    /// Maximum number of Newton iterations on the stress residual
    pub max_iter: usize,

    /// Maximum number of fixed-point iterations on the slip system resistances
    pub max_iter_gss: usize,

    /// Maximum number of substepping levels (1 means no substepping)
    ///
    /// The level k uses 2^(k-1) substeps.
    pub max_substep_iter: usize,

    /// Kind of tangent modulus
    pub tangent: TangentKind,
}

/// Holds parameters for the finite-strain crystal plasticity model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamCrystalPlasticity {
    /// Elastic constants in the crystal frame
    pub elasticity: ParamCubicElasticity,

    /// Orientation of the crystal
    ///
    /// Used only if the crystal rotation is not supplied by the integration point input.
    pub euler_angles: EulerAngles,

    /// Slip systems in the crystal frame (normal followed by direction)
    pub slip_systems: Vec<[f64; 6]>,

    /// Flow rule
    pub flow_rate: ParamFlowRate,

    /// Initial slip system resistance
    pub gss_initial: f64,

    /// Hardening law
    pub hardening: ParamHardening,

    /// Von Neumann (quadratic) artificial bulk viscosity coefficient
    pub c0: f64,

    /// Landshoff (linear) artificial bulk viscosity coefficient
    pub c1: f64,

    /// Local solver settings
    pub solver: ParamLocalSolver,
}

/// Holds parameters for all material models
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ParamMaterial {
    /// Polycrystal elasticity interpolator (linear elastic stress)
    Polycrystal(ParamPolycrystal),

    /// Strain-split damage model for phase-field fracture
    StrainSplitDamage(ParamStrainSplitDamage),

    /// Finite-strain crystal plasticity with plastic work and bulk viscosity
    CrystalPlasticity(ParamCrystalPlasticity),
}

impl ParamCubicElasticity {
    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if self.c44 <= 0.0 {
            return Err("c44 must be > 0.0");
        }
        if self.c11 <= f64::abs(self.c12) {
            return Err("c11 must be greater than |c12|");
        }
        if self.c11 + 2.0 * self.c12 <= 0.0 {
            return Err("c11 + 2 c12 must be > 0.0");
        }
        Ok(())
    }
}

impl ParamPolycrystal {
    /// Allocates a new instance with default length and pressure scales
    pub fn new(n_order_parameter: usize) -> Self {
        ParamPolycrystal {
            n_order_parameter,
            length_scale: DEFAULT_LENGTH_SCALE,
            pressure_scale: DEFAULT_PRESSURE_SCALE,
        }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if self.n_order_parameter < 1 {
            return Err("n_order_parameter must be ≥ 1");
        }
        if self.length_scale <= 0.0 {
            return Err("length_scale must be > 0.0");
        }
        if self.pressure_scale <= 0.0 {
            return Err("pressure_scale must be > 0.0");
        }
        Ok(())
    }
}

impl ParamStrainSplitDamage {
    /// Allocates a new instance with the default kdamage
    pub fn new(young: f64, poisson: f64) -> Self {
        ParamStrainSplitDamage {
            young,
            poisson,
            kdamage: DEFAULT_KDAMAGE,
        }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if self.young <= 0.0 {
            return Err("young must be > 0.0");
        }
        if self.poisson <= -1.0 || self.poisson >= 0.5 {
            return Err("poisson must be in (-1.0, 0.5)");
        }
        if self.kdamage <= 0.0 {
            return Err("kdamage must be > 0.0");
        }
        Ok(())
    }
}

impl ParamLocalSolver {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        ParamLocalSolver {
            rtol: 1e-6,
            abs_tol: 1e-6,
            gtol: 1e-2,
            slip_incr_tol: 2e-2,
            max_iter: 100,
            max_iter_gss: 100,
            max_substep_iter: 1,
            tangent: TangentKind::Elastic,
        }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if self.rtol <= 0.0 || self.abs_tol <= 0.0 || self.gtol <= 0.0 {
            return Err("solver tolerances must be > 0.0");
        }
        if self.slip_incr_tol <= 0.0 {
            return Err("slip_incr_tol must be > 0.0");
        }
        if self.max_iter < 1 || self.max_iter_gss < 1 {
            return Err("maximum numbers of iterations must be ≥ 1");
        }
        if self.max_substep_iter < 1 {
            return Err("max_substep_iter must be ≥ 1");
        }
        if self.max_substep_iter > 20 {
            return Err("max_substep_iter must be ≤ 20");
        }
        Ok(())
    }
}

impl ParamCrystalPlasticity {
    /// Allocates a new instance with FCC slip systems and default solver settings
    pub fn new_fcc(
        elasticity: ParamCubicElasticity,
        flow_rate: ParamFlowRate,
        gss_initial: f64,
        hardening: ParamHardening,
    ) -> Self {
        ParamCrystalPlasticity {
            elasticity,
            euler_angles: EulerAngles::new(0.0, 0.0, 0.0),
            slip_systems: FCC_SLIP_SYSTEMS.to_vec(),
            flow_rate,
            gss_initial,
            hardening,
            c0: 0.0,
            c1: 0.0,
            solver: ParamLocalSolver::new(),
        }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        self.elasticity.validate()?;
        self.solver.validate()?;
        if self.slip_systems.is_empty() {
            return Err("there must be at least one slip system");
        }
        if self.flow_rate.a0 <= 0.0 {
            return Err("a0 must be > 0.0");
        }
        if self.flow_rate.xm <= 0.0 || self.flow_rate.xm > 1.0 {
            return Err("xm must be in (0.0, 1.0]");
        }
        if self.gss_initial <= 0.0 {
            return Err("gss_initial must be > 0.0");
        }
        if self.hardening.tau_sat <= 0.0 {
            return Err("tau_sat must be > 0.0");
        }
        if self.hardening.r < 0.0 || self.hardening.h0 < 0.0 || self.hardening.a < 0.0 {
            return Err("hardening parameters r, h0, and a must be ≥ 0.0");
        }
        if self.c0 < 0.0 || self.c1 < 0.0 {
            return Err("bulk viscosity coefficients must be ≥ 0.0");
        }
        Ok(())
    }
}

impl ParamMaterial {
    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        match self {
            ParamMaterial::Polycrystal(p) => p.validate(),
            ParamMaterial::StrainSplitDamage(p) => p.validate(),
            ParamMaterial::CrystalPlasticity(p) => p.validate(),
        }
    }
}

impl fmt::Display for ParamMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamMaterial::Polycrystal(p) => {
                write!(f, "Polycrystal elasticity\n")?;
                write!(f, "======================\n")?;
                write!(f, "n_order_parameter = {}\n", p.n_order_parameter)?;
                write!(f, "length_scale = {:?}\n", p.length_scale)?;
                write!(f, "pressure_scale = {:?}\n", p.pressure_scale)?;
            }
            ParamMaterial::StrainSplitDamage(p) => {
                write!(f, "Strain-split damage\n")?;
                write!(f, "===================\n")?;
                write!(f, "young = {:?}\n", p.young)?;
                write!(f, "poisson = {:?}\n", p.poisson)?;
                write!(f, "kdamage = {:?}\n", p.kdamage)?;
            }
            ParamMaterial::CrystalPlasticity(p) => {
                write!(f, "Crystal plasticity\n")?;
                write!(f, "==================\n")?;
                write!(f, "elasticity = {:?}\n", p.elasticity)?;
                write!(f, "euler_angles = {:?}\n", p.euler_angles)?;
                write!(f, "n_slip_system = {}\n", p.slip_systems.len())?;
                write!(f, "flow_rate = {:?}\n", p.flow_rate)?;
                write!(f, "gss_initial = {:?}\n", p.gss_initial)?;
                write!(f, "hardening = {:?}\n", p.hardening)?;
                write!(f, "c0 = {:?}\n", p.c0)?;
                write!(f, "c1 = {:?}\n", p.c1)?;
                write!(f, "solver = {:?}\n", p.solver)?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
