use super::tensor_algebra::{t4_cubic, t4_rotate};
use super::{ConstitutiveModel, DerivedProperties, LocalState, Outcome, PointInput, PointUpdate, PolycrystalProperties};
use crate::base::{EulerAngles, GrainDataProvider, GrainId, GrainTracker, ParamCubicElasticity, ParamPolycrystal};
use crate::base::{INTERP_WEIGHT_TOL, JOULE_TO_EV};
use crate::StrError;
use russell_lab::math::PI;
use russell_tensor::{t4_add, t4_ddot_t2, Mandel, Tensor4};
use std::sync::Arc;

/// Holds the grain tracking services consumed by the polycrystal interpolator
#[derive(Clone)]
pub struct GrainServices {
    /// Provides the elasticity tensor of each grain (sample frame)
    pub elasticity: Arc<dyn GrainDataProvider<Tensor4>>,

    /// Provides the Euler angles of each grain
    pub orientation: Arc<dyn GrainDataProvider<EulerAngles>>,
}

/// Implements the polycrystal elasticity interpolator
///
/// The elasticity tensor and the crystal rotation at a point are interpolated from the
/// per-grain data using the order parameters (phase-field variables) as weights:
///
/// ```text
/// h(η) = (1 + sin(π (η - ½))) / 2
///
///      Σ hᵢ Cᵢ
/// C = ─────────────────
///     max(Σ hᵢ, tol)
/// ```
///
/// Order parameters not representing any grain in the element contribute nothing.
pub struct PolycrystalElasticity {
    /// Number of order parameters
    n_order_parameter: usize,

    /// Scale of the derivatives: JtoeV · l³ · p
    energy_scale: f64,

    /// Grain tracking services
    grains: GrainServices,
}

/// Calculates the interpolation weight h(η)
pub fn interpolation_weight(op: f64) -> f64 {
    (1.0 + f64::sin(PI * (op - 0.5))) / 2.0
}

/// Calculates the derivative of the interpolation weight dh/dη
pub fn interpolation_weight_deriv(op: f64) -> f64 {
    PI * f64::cos(PI * (op - 0.5)) / 2.0
}

impl PolycrystalElasticity {
    /// Allocates a new instance
    pub fn new(param: &ParamPolycrystal, grains: GrainServices) -> Result<Self, StrError> {
        param.validate()?;
        Ok(PolycrystalElasticity {
            n_order_parameter: param.n_order_parameter,
            energy_scale: JOULE_TO_EV * f64::powi(param.length_scale, 3) * param.pressure_scale,
            grains,
        })
    }

    /// Returns the per-grain elasticity tensors (sample frame) for the given orientations
    ///
    /// The cubic tensor defined in the crystal frame is rotated by crysrot = Rᵀ of each grain.
    pub fn elasticity_per_grain(
        param: &ParamCubicElasticity,
        orientations: &GrainTracker<EulerAngles>,
    ) -> Result<GrainTracker<Tensor4>, StrError> {
        param.validate()?;
        let cubic = t4_cubic(param.c11, param.c12, param.c44)?;
        orientations.map_data(|angles| t4_rotate(&cubic, &angles.crystal_rotation()?))
    }

    /// Returns the grain ids of an element, padded with `None` up to the number of order parameters
    fn feature_map(&self, features: Vec<Option<GrainId>>) -> Result<Vec<Option<GrainId>>, StrError> {
        if features.len() > self.n_order_parameter {
            return Err("feature map is longer than the number of order parameters");
        }
        let mut map = features;
        map.resize(self.n_order_parameter, None);
        Ok(map)
    }

    /// Interpolates the elasticity tensor and crystal rotation at a point
    ///
    /// Returns the elasticity tensor and the derived properties (derivatives and rotation).
    pub fn interpolate(
        &self,
        element_id: usize,
        order_parameters: &[f64],
    ) -> Result<(Tensor4, PolycrystalProperties), StrError> {
        if order_parameters.len() != self.n_order_parameter {
            return Err("number of order parameters is incorrect");
        }

        // weighted sum of grain tensors
        let features = self.feature_map(self.grains.elasticity.var_to_feature(element_id))?;
        let mut grain_tensors: Vec<Option<&Tensor4>> = vec![None; self.n_order_parameter];
        let mut sum_cc = Tensor4::new(Mandel::Symmetric);
        let mut sum_h = 0.0;
        for (i, id) in features.iter().enumerate() {
            if let Some(id) = id {
                let cc_i = self.grains.elasticity.grain_data(*id)?;
                let h = interpolation_weight(order_parameters[i]);
                sum_cc.update(h, cc_i);
                sum_h += h;
                grain_tensors[i] = Some(cc_i);
            }
        }
        let den = f64::max(sum_h, INTERP_WEIGHT_TOL);
        let mut cc = Tensor4::new(Mandel::Symmetric);
        cc.set_tensor(1.0 / den, &sum_cc);

        // weighted Euler angles
        let features = self.feature_map(self.grains.orientation.var_to_feature(element_id))?;
        let mut sum_angles = [0.0; 3];
        let mut sum_h_angles = 0.0;
        for (i, id) in features.iter().enumerate() {
            if let Some(id) = id {
                let angles = self.grains.orientation.grain_data(*id)?.as_array();
                let h = interpolation_weight(order_parameters[i]);
                for k in 0..3 {
                    sum_angles[k] += h * angles[k];
                }
                sum_h_angles += h;
            }
        }
        let den_angles = f64::max(sum_h_angles, INTERP_WEIGHT_TOL);
        let average = [
            sum_angles[0] / den_angles,
            sum_angles[1] / den_angles,
            sum_angles[2] / den_angles,
        ];
        let crystal_rotation = EulerAngles::from_array(&average).crystal_rotation()?;

        // derivatives: dC/dηᵢ = h'ᵢ (Cᵢ - C) / Σh
        let mut delasticity_dop = Vec::with_capacity(self.n_order_parameter);
        for i in 0..self.n_order_parameter {
            let mut dcc = Tensor4::new(Mandel::Symmetric);
            if let Some(cc_i) = grain_tensors[i] {
                let coef = interpolation_weight_deriv(order_parameters[i]) * self.energy_scale / den;
                t4_add(&mut dcc, coef, cc_i, -coef, &cc);
            }
            delasticity_dop.push(dcc);
        }

        let props = PolycrystalProperties {
            delasticity_dop,
            crystal_rotation,
            total_weight: sum_h,
        };
        Ok((cc, props))
    }
}

impl ConstitutiveModel for PolycrystalElasticity {
    fn name(&self) -> &'static str {
        "PolycrystalElasticity"
    }

    fn n_internal_values(&self) -> usize {
        0
    }

    fn initialize_internal_values(&self, _state: &mut LocalState) -> Result<(), StrError> {
        Ok(())
    }

    /// Computes the linear elastic stress σ = C : ε with the interpolated C
    fn compute_stress_and_state(&self, input: &PointInput, _old: &LocalState) -> Result<Outcome, StrError> {
        if input.strain.mandel() != Mandel::Symmetric {
            return Err("strain must use the symmetric representation");
        }
        let (cc, props) = self.interpolate(input.element_id, &input.order_parameters)?;
        let mut state = LocalState::new(0);
        t4_ddot_t2(&mut state.stress, 1.0, &cc, &input.strain);
        Ok(Outcome::Converged(PointUpdate {
            state,
            tangent: cc,
            derived: DerivedProperties::Polycrystal(props),
        }))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
