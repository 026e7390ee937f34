use russell_lab::Vector;
use russell_tensor::{Mandel, Tensor2};
use serde::{Deserialize, Serialize};

/// Holds the local state of a material at a Gauss (integration) point
///
/// The host keeps one old (committed) state and one current state per point (see [super::StateBuffer]).
/// Models read the old state and return a new current state; they never modify the old one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalState {
    /// Holds the internal values Z
    pub internal_values: Vector,

    /// Holds the (Cauchy) stress tensor σ
    pub stress: Tensor2,

    /// Holds the second Piola-Kirchhoff stress in the intermediate configuration (finite strain only)
    pub pk2: Option<Tensor2>,

    /// Holds the plastic deformation gradient Fp (finite strain only; general tensor)
    pub plastic_deformation_gradient: Option<Tensor2>,
}

impl LocalState {
    /// Allocates a new instance with zero stress and internal values
    pub fn new(n_internal_values: usize) -> Self {
        LocalState {
            internal_values: Vector::new(n_internal_values),
            stress: Tensor2::new(Mandel::Symmetric),
            pk2: None,
            plastic_deformation_gradient: None,
        }
    }

    /// Copies all data from another state
    pub fn mirror(&mut self, other: &LocalState) {
        self.internal_values = other.internal_values.clone();
        self.stress.set_tensor(1.0, &other.stress);
        self.pk2 = other.pk2.clone();
        self.plastic_deformation_gradient = other.plastic_deformation_gradient.clone();
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
