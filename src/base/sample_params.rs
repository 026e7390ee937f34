use super::{
    ParamCrystalPlasticity, ParamCubicElasticity, ParamFlowRate, ParamHardening, ParamPolycrystal,
    ParamStrainSplitDamage,
};

/// Holds samples of material parameters
pub struct SampleParams {}

impl SampleParams {
    /// Returns sample elastic constants of copper (MPa)
    pub fn param_cubic_elasticity_copper() -> ParamCubicElasticity {
        ParamCubicElasticity {
            c11: 1.684e5, // MPa
            c12: 1.214e5, // MPa
            c44: 0.754e5, // MPa
        }
    }

    /// Returns sample parameters for the polycrystal elasticity interpolator
    pub fn param_polycrystal(n_order_parameter: usize) -> ParamPolycrystal {
        ParamPolycrystal::new(n_order_parameter)
    }

    /// Returns sample parameters for the strain-split damage model
    pub fn param_strain_split_damage() -> ParamStrainSplitDamage {
        ParamStrainSplitDamage::new(120.0, 0.3)
    }

    /// Returns sample parameters for crystal plasticity of FCC copper (MPa, s)
    pub fn param_crystal_plasticity_fcc() -> ParamCrystalPlasticity {
        let elasticity = SampleParams::param_cubic_elasticity_copper();
        let flow_rate = ParamFlowRate { a0: 0.001, xm: 0.1 };
        let hardening = ParamHardening {
            r: 1.0,
            h0: 541.5,     // MPa
            tau_sat: 109.8, // MPa
            a: 2.5,
        };
        ParamCrystalPlasticity::new_fcc(elasticity, flow_rate, 60.8, hardening)
    }
}
