use super::{DerivedProperties, PointUpdate};
use russell_tensor::{Mandel, Tensor2, Tensor4};

/// Holds the input data of a material model at a Gauss (integration) point
///
/// The host fills this record before each evaluation. Models only read the
/// fields relevant to them:
///
/// * polycrystal elasticity: `element_id`, `order_parameters`, `strain`
/// * strain-split damage: `strain`, `damage`, `elasticity` (optional)
/// * crystal plasticity: `deformation_gradient`, `deformation_gradient_old`, `dt`,
///   `elasticity` (optional), `crystal_rotation` (optional)
#[derive(Clone, Debug)]
pub struct PointInput {
    /// Holds the id of the element containing the point
    pub element_id: usize,

    /// Holds the (small) mechanical strain tensor ε (symmetric)
    pub strain: Tensor2,

    /// Holds the deformation gradient F at the end of the step (general)
    pub deformation_gradient: Tensor2,

    /// Holds the deformation gradient at the beginning of the step (general)
    pub deformation_gradient_old: Tensor2,

    /// Holds the values of the order parameters (phase-field variables)
    pub order_parameters: Vec<f64>,

    /// Holds the damage (phase-field fracture) variable c ∈ [0, 1]
    pub damage: f64,

    /// Holds the time increment Δt
    pub dt: f64,

    /// Holds the elasticity tensor computed by another model (e.g., polycrystal interpolator)
    pub elasticity: Option<Tensor4>,

    /// Holds the crystal rotation computed by another model (e.g., polycrystal interpolator)
    pub crystal_rotation: Option<Tensor2>,
}

impl PointInput {
    /// Allocates a new instance with zero strain and F = I
    pub fn new() -> Self {
        PointInput {
            element_id: 0,
            strain: Tensor2::new(Mandel::Symmetric),
            deformation_gradient: Tensor2::identity(Mandel::General),
            deformation_gradient_old: Tensor2::identity(Mandel::General),
            order_parameters: Vec::new(),
            damage: 0.0,
            dt: 1.0,
            elasticity: None,
            crystal_rotation: None,
        }
    }

    /// Sets the element id
    pub fn set_element_id(&mut self, element_id: usize) -> &mut Self {
        self.element_id = element_id;
        self
    }

    /// Sets the strain tensor
    ///
    /// The representation is checked by the models, not here.
    pub fn set_strain(&mut self, strain: &Tensor2) -> &mut Self {
        self.strain = strain.clone();
        self
    }

    /// Sets the deformation gradients at the end and at the beginning of the step
    pub fn set_deformation_gradients(&mut self, ff: &Tensor2, ff_old: &Tensor2) -> &mut Self {
        self.deformation_gradient = ff.clone();
        self.deformation_gradient_old = ff_old.clone();
        self
    }

    /// Sets the order parameters
    pub fn set_order_parameters(&mut self, values: &[f64]) -> &mut Self {
        self.order_parameters = values.to_vec();
        self
    }

    /// Sets the damage variable
    pub fn set_damage(&mut self, damage: f64) -> &mut Self {
        self.damage = damage;
        self
    }

    /// Sets the time increment
    pub fn set_dt(&mut self, dt: f64) -> &mut Self {
        self.dt = dt;
        self
    }

    /// Sets the elasticity tensor and crystal rotation computed by the polycrystal interpolator
    ///
    /// Updates from other models only set the elasticity tensor (the tangent).
    pub fn set_coupling(&mut self, update: &PointUpdate) -> &mut Self {
        self.elasticity = Some(update.tangent.clone());
        if let DerivedProperties::Polycrystal(props) = &update.derived {
            self.crystal_rotation = Some(props.crystal_rotation.clone());
        }
        self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
