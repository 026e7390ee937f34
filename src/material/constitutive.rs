use super::{CrystalPlasticity, GrainServices, LocalState, Outcome, PointInput, PolycrystalElasticity, StrainSplitDamage};
use crate::base::ParamMaterial;
use crate::StrError;

/// Specifies the essential functions of constitutive models evaluated at integration points
///
/// The evaluation takes `&self`; all scratch data lives in the call. Thus, a single model
/// may be shared by all points and evaluated concurrently.
pub trait ConstitutiveModel: Send + Sync {
    /// Returns the name of the model
    fn name(&self) -> &'static str;

    /// Returns the number of internal values
    fn n_internal_values(&self) -> usize;

    /// Initializes the internal values (and finite strain data) of a new state
    fn initialize_internal_values(&self, state: &mut LocalState) -> Result<(), StrError>;

    /// Computes the new stress and state given the input and the old (committed) state
    ///
    /// Returns `Outcome::Cutback` if the local solve does not converge. Errors are reserved for
    /// invalid input or configuration.
    fn compute_stress_and_state(&self, input: &PointInput, old: &LocalState) -> Result<Outcome, StrError>;
}

/// Holds the actual constitutive model implementation
pub struct Material {
    /// Holds the actual model implementation
    pub actual: Box<dyn ConstitutiveModel>,
}

impl Material {
    /// Allocates a new instance
    ///
    /// The grain services are required by the polycrystal interpolator only.
    pub fn new(param: &ParamMaterial, grains: Option<GrainServices>) -> Result<Self, StrError> {
        param.validate()?;
        let actual: Box<dyn ConstitutiveModel> = match param {
            // Polycrystal elasticity interpolator
            ParamMaterial::Polycrystal(p) => match grains {
                Some(services) => Box::new(PolycrystalElasticity::new(p, services)?),
                None => return Err("polycrystal model requires grain services"),
            },

            // Strain-split damage model
            ParamMaterial::StrainSplitDamage(p) => Box::new(StrainSplitDamage::new(p)?),

            // Crystal plasticity model
            ParamMaterial::CrystalPlasticity(p) => Box::new(CrystalPlasticity::new(p)?),
        };
        Ok(Material { actual })
    }

    /// Allocates a new state with initialized internal values
    pub fn new_state(&self) -> Result<LocalState, StrError> {
        let mut state = LocalState::new(self.actual.n_internal_values());
        self.actual.initialize_internal_values(&mut state)?;
        Ok(state)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Material;
    use crate::base::{EulerAngles, GrainTracker, ParamMaterial, ParamStrainSplitDamage, SampleParams};
    use crate::material::GrainServices;
    use russell_tensor::Tensor4;
    use std::sync::Arc;

    #[test]
    fn allocate_material_works() {
        let param = ParamMaterial::StrainSplitDamage(SampleParams::param_strain_split_damage());
        let material = Material::new(&param, None).unwrap();
        assert_eq!(material.actual.name(), "StrainSplitDamage");
        assert_eq!(material.new_state().unwrap().internal_values.dim(), 0);

        let param = ParamMaterial::CrystalPlasticity(SampleParams::param_crystal_plasticity_fcc());
        let material = Material::new(&param, None).unwrap();
        assert_eq!(material.actual.name(), "CrystalPlasticity");
        let state = material.new_state().unwrap();
        assert_eq!(state.internal_values.dim(), 3 + 12);
        assert_eq!(state.internal_values[3], 60.8);

        let param = ParamMaterial::Polycrystal(SampleParams::param_polycrystal(2));
        let grains = GrainServices {
            elasticity: Arc::new(GrainTracker::<Tensor4>::new()),
            orientation: Arc::new(GrainTracker::<EulerAngles>::new()),
        };
        let material = Material::new(&param, Some(grains)).unwrap();
        assert_eq!(material.actual.name(), "PolycrystalElasticity");
    }

    #[test]
    fn allocate_material_captures_errors() {
        let param = ParamMaterial::Polycrystal(SampleParams::param_polycrystal(2));
        assert_eq!(
            Material::new(&param, None).err(),
            Some("polycrystal model requires grain services")
        );
        let mut p = ParamStrainSplitDamage::new(1000.0, 0.25);
        p.kdamage = -1.0;
        let param = ParamMaterial::StrainSplitDamage(p);
        assert_eq!(Material::new(&param, None).err(), Some("kdamage must be > 0.0"));
    }
}
