use crate::StrError;
use russell_lab::{vec_inner, vec_norm, vec_norm_diff, vec_scale, Norm, Vector};
use russell_tensor::{t2_dot_vec, vec_dyad_vec, Mandel, Tensor2};

/// Tolerance to compare normals and to check orthogonality
const TOL: f64 = 1e-10;

/// Holds the slip systems of a crystal in the crystal frame
///
/// Each system is given by the slip plane normal n and the slip direction m. The
/// Schmid tensor is S = m ⊗ n. Systems sharing the same normal belong to the same
/// slip plane (used by the latent hardening matrix).
#[derive(Clone, Debug)]
pub struct SlipSystems {
    /// Holds the unit normals
    normals: Vec<Vector>,

    /// Holds the unit directions
    directions: Vec<Vector>,

    /// Holds the index of the slip plane of each system
    planes: Vec<usize>,
}

/// Returns the unit vector or an error if the vector is null
fn normalize(v: &[f64]) -> Result<Vector, StrError> {
    let mut u = Vector::from(&[v[0], v[1], v[2]]);
    let norm = vec_norm(&u, Norm::Euc);
    if norm < TOL {
        return Err("slip system vectors must not be null");
    }
    vec_scale(&mut u, 1.0 / norm);
    Ok(u)
}

impl SlipSystems {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `systems` -- rows with (n₀, n₁, n₂, m₀, m₁, m₂); the vectors need not be normalized
    pub fn new(systems: &[[f64; 6]]) -> Result<Self, StrError> {
        if systems.is_empty() {
            return Err("there must be at least one slip system");
        }
        let mut normals: Vec<Vector> = Vec::with_capacity(systems.len());
        let mut directions = Vec::with_capacity(systems.len());
        let mut planes = Vec::with_capacity(systems.len());
        let mut n_plane = 0;
        for row in systems {
            let n = normalize(&row[0..3])?;
            let m = normalize(&row[3..6])?;
            if f64::abs(vec_inner(&n, &m)) > TOL {
                return Err("slip direction must be orthogonal to the slip plane normal");
            }
            let same = normals.iter().position(|other| vec_norm_diff(other, &n, Norm::Max) < TOL);
            match same {
                Some(k) => planes.push(planes[k]),
                None => {
                    planes.push(n_plane);
                    n_plane += 1;
                }
            }
            normals.push(n);
            directions.push(m);
        }
        Ok(SlipSystems {
            normals,
            directions,
            planes,
        })
    }

    /// Returns the number of slip systems
    pub fn n_system(&self) -> usize {
        self.normals.len()
    }

    /// Returns the Schmid tensors S = m ⊗ n rotated to the sample frame (general tensors)
    ///
    /// The vectors are rotated by the crystal rotation (crysrot): n' = crysrot · n and m' = crysrot · m
    pub fn schmid_tensors(&self, crysrot: &Tensor2) -> Result<Vec<Tensor2>, StrError> {
        let mut nn = Vector::new(3);
        let mut mm = Vector::new(3);
        let mut schmid = Vec::with_capacity(self.n_system());
        for (n, m) in self.normals.iter().zip(&self.directions) {
            t2_dot_vec(&mut nn, 1.0, crysrot, n);
            t2_dot_vec(&mut mm, 1.0, crysrot, m);
            let mut ss = Tensor2::new(Mandel::General);
            vec_dyad_vec(&mut ss, 1.0, &mm, &nn)?;
            schmid.push(ss);
        }
        Ok(schmid)
    }

    /// Returns the latent hardening coefficient between two systems
    ///
    /// Returns 1 for systems on the same plane and r otherwise.
    pub fn latent_coefficient(&self, alpha: usize, beta: usize, r: f64) -> f64 {
        if self.planes[alpha] == self.planes[beta] {
            1.0
        } else {
            r
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
