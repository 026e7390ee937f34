use super::{ConstitutiveModel, DamageProperties, DerivedProperties, LocalState, Outcome, PointInput, PointUpdate};
use crate::base::ParamStrainSplitDamage;
use crate::StrError;
use russell_lab::Vector;
use russell_tensor::{t2_ddot_t2, LinElasticity, Mandel, Spectral2, Tensor2, Tensor4};

/// Implements the strain-split damage model for phase-field fracture
///
/// The strain is split into tensile and compressive parts using its spectral
/// decomposition and only the tensile part of the stress is degraded by damage:
///
/// ```text
/// σ = ((1 - c)² + kdamage) σ0⁺ - σ0⁻
///
/// σ0⁺ = 3 Kb vol⁺ + 2 μ dev
/// σ0⁻ = 3 Kb vol⁻
/// ```
///
/// The Lamé constants are extracted from the (isotropic) elasticity tensor:
/// λ = C₀₀₁₁ and μ = C₀₁₀₁, giving Kb = λ + 2μ/3.
pub struct StrainSplitDamage {
    /// Linear elasticity (used if the elasticity tensor is not supplied by the input)
    lin_elasticity: LinElasticity,

    /// Stiffness of the fully damaged material
    kdamage: f64,
}

/// Splits the trace of the strain into its positive and negative parts
///
/// Returns `(etr⁺, etr⁻)` with `etr = etr⁺ - etr⁻` and both parts non-negative.
pub fn split_trace(etr: f64) -> (f64, f64) {
    ((f64::abs(etr) + etr) / 2.0, (f64::abs(etr) - etr) / 2.0)
}

/// Returns the strain rebuilt from its spectral decomposition and the principal strains
///
/// ```text
/// ε = Σ λₖ Pₖ
/// ```
fn spectral_strain(strain: &Tensor2) -> Result<(Tensor2, Vector), StrError> {
    let mut spectral = Spectral2::new(false);
    spectral.decompose(strain)?;
    let mut eps = Tensor2::new(Mandel::Symmetric);
    spectral.compose(&mut eps, &spectral.lambda)?;
    Ok((eps, spectral.lambda.clone()))
}

impl StrainSplitDamage {
    /// Allocates a new instance
    pub fn new(param: &ParamStrainSplitDamage) -> Result<Self, StrError> {
        param.validate()?;
        Ok(StrainSplitDamage {
            lin_elasticity: LinElasticity::new(param.young, param.poisson, false, false),
            kdamage: param.kdamage,
        })
    }

    /// Returns the degradation factor of the tensile stress: (1 - c)² + kdamage
    pub fn degradation_factor(&self, damage: f64) -> f64 {
        f64::powi(1.0 - damage, 2) + self.kdamage
    }

    /// Computes the stress and the damage-related properties
    ///
    /// The damage variable c must be in [0, 1] (not checked).
    pub fn calc_stress(
        &self,
        strain: &Tensor2,
        damage: f64,
        elasticity: &Tensor4,
    ) -> Result<(Tensor2, DamageProperties), StrError> {
        if strain.mandel() != Mandel::Symmetric {
            return Err("strain must use the symmetric representation");
        }
        if elasticity.mandel() != Mandel::Symmetric {
            return Err("elasticity tensor must use the symmetric representation");
        }

        // Lamé constants (Mandel: C₀₁₀₁ = D₃₃/2)
        let lambda = elasticity.matrix().get(0, 1);
        let mu = elasticity.matrix().get(3, 3) / 2.0;
        let kb = lambda + 2.0 * mu / 3.0;

        // principal strains
        let (eps, principal) = spectral_strain(strain)?;
        let mut positive_principal_strains = Vector::new(3);
        for k in 0..3 {
            positive_principal_strains[k] = split_trace(principal[k]).0;
        }

        // volumetric and deviatoric parts
        let etr = principal[0] + principal[1] + principal[2];
        let (etrpos, etrneg) = split_trace(etr);
        let mut dev = Tensor2::new(Mandel::Symmetric);
        eps.deviator(&mut dev);

        // σ0⁺ = Kb etr⁺ I + 2μ dev and σ0⁻ = Kb etr⁻ I
        let ii = Tensor2::identity(Mandel::Symmetric);
        let mut stress0_pos = Tensor2::new(Mandel::Symmetric);
        stress0_pos.set_tensor(2.0 * mu, &dev);
        stress0_pos.update(kb * etrpos, &ii);

        // σ = xfac σ0⁺ - σ0⁻
        let mut stress = Tensor2::new(Mandel::Symmetric);
        stress.set_tensor(self.degradation_factor(damage), &stress0_pos);
        stress.update(-kb * etrneg, &ii);

        // G0⁺ = Kb (etr⁺)²/2 + μ dev : dev
        let g0_pos = kb * etrpos * etrpos / 2.0 + mu * t2_ddot_t2(&dev, &dev);

        // ∂σ/∂c = -2 (1 - c) σ0⁺
        let mut dstress_ddamage = Tensor2::new(Mandel::Symmetric);
        dstress_ddamage.set_tensor(-2.0 * (1.0 - damage), &stress0_pos);

        let props = DamageProperties {
            dstress_ddamage,
            g0_pos,
            dg0_pos_dstrain: stress0_pos,
            positive_principal_strains,
        };
        Ok((stress, props))
    }
}

impl ConstitutiveModel for StrainSplitDamage {
    fn name(&self) -> &'static str {
        "StrainSplitDamage"
    }

    fn n_internal_values(&self) -> usize {
        0
    }

    fn initialize_internal_values(&self, _state: &mut LocalState) -> Result<(), StrError> {
        Ok(())
    }

    fn compute_stress_and_state(&self, input: &PointInput, _old: &LocalState) -> Result<Outcome, StrError> {
        let elasticity = match &input.elasticity {
            Some(dd) => dd,
            None => self.lin_elasticity.get_modulus(),
        };
        let (stress, props) = self.calc_stress(&input.strain, input.damage, elasticity)?;
        let mut state = LocalState::new(0);
        state.stress = stress;
        Ok(Outcome::Converged(PointUpdate {
            state,
            tangent: elasticity.clone(),
            derived: DerivedProperties::StrainSplitDamage(props),
        }))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
