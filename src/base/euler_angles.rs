use crate::StrError;
use russell_lab::math::PI;
use russell_tensor::{Mandel, Tensor2};
use serde::{Deserialize, Serialize};

/// Holds the Bunge (Z-X-Z) Euler angles of a crystal orientation in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    /// First rotation about Z (degrees)
    pub phi1: f64,

    /// Rotation about the rotated X axis (degrees)
    pub phi: f64,

    /// Second rotation about the rotated Z axis (degrees)
    pub phi2: f64,
}

impl EulerAngles {
    /// Allocates a new instance
    pub fn new(phi1: f64, phi: f64, phi2: f64) -> Self {
        EulerAngles { phi1, phi, phi2 }
    }

    /// Allocates a new instance from the array (φ1, Φ, φ2)
    pub fn from_array(v: &[f64; 3]) -> Self {
        EulerAngles {
            phi1: v[0],
            phi: v[1],
            phi2: v[2],
        }
    }

    /// Returns the angles as the array (φ1, Φ, φ2)
    pub fn as_array(&self) -> [f64; 3] {
        [self.phi1, self.phi, self.phi2]
    }

    /// Calculates the rotation tensor R
    ///
    /// R maps the sample frame onto the crystal frame; thus, the crystal-to-sample
    /// rotation is Rᵀ (see [EulerAngles::crystal_rotation]).
    pub fn rotation_matrix(&self) -> [[f64; 3]; 3] {
        let (s1, c1) = f64::sin_cos(self.phi1 * PI / 180.0);
        let (s2, c2) = f64::sin_cos(self.phi * PI / 180.0);
        let (s3, c3) = f64::sin_cos(self.phi2 * PI / 180.0);
        [
            [c1 * c3 - c2 * s1 * s3, c3 * s1 + c1 * c2 * s3, s2 * s3],
            [-c1 * s3 - c2 * c3 * s1, c1 * c2 * c3 - s1 * s3, c3 * s2],
            [s1 * s2, -c1 * s2, c2],
        ]
    }

    /// Calculates the crystal rotation (crysrot = Rᵀ) as a general tensor
    pub fn crystal_rotation(&self) -> Result<Tensor2, StrError> {
        let r = Tensor2::from_matrix(&self.rotation_matrix(), Mandel::General)?;
        let mut crysrot = Tensor2::new(Mandel::General);
        r.transpose(&mut crysrot);
        Ok(crysrot)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
