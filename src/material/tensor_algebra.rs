//! Implements the fourth-order tensor operations not provided by russell_tensor
//!
//! General (non-symmetric) second-order tensors such as deformation gradients and rotations
//! use [Mandel::General]; symmetric ones and all fourth-order tensors use [Mandel::Symmetric].

use crate::StrError;
use russell_tensor::{Mandel, Tensor2, Tensor4};

/// Returns the symmetric part of a general tensor as a symmetric (Mandel) tensor
///
/// ```text
/// sym(a) = ½ (a + aᵀ)
/// ```
///
/// In the Mandel basis, the first six components of a general tensor hold its symmetric part.
pub fn t2_sym_part(a: &Tensor2) -> Tensor2 {
    let mut sym = Tensor2::new(Mandel::Symmetric);
    sym.set_mandel_vector(1.0, &a.vector().as_data()[..6]);
    sym
}

/// Returns a fourth-order tensor with minor symmetries from its components
///
/// The components are symmetrized with respect to the minor symmetries before conversion.
pub(crate) fn t4_from_array_sym(a: &[[[[f64; 3]; 3]; 3]; 3]) -> Result<Tensor4, StrError> {
    let mut sym = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    sym[i][j][k][l] = 0.25 * (a[i][j][k][l] + a[j][i][k][l] + a[i][j][l][k] + a[j][i][l][k]);
                }
            }
        }
    }
    Tensor4::from_array(&sym, Mandel::Symmetric)
}

/// Returns the elasticity tensor of a cubic crystal in the crystal frame
pub fn t4_cubic(c11: f64, c12: f64, c44: f64) -> Result<Tensor4, StrError> {
    let mut a = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            if i == j {
                a[i][i][i][i] = c11;
            } else {
                a[i][i][j][j] = c12;
                a[i][j][i][j] = c44;
                a[i][j][j][i] = c44;
            }
        }
    }
    t4_from_array_sym(&a)
}

/// Rotates a fourth-order tensor
///
/// ```text
/// C'ᵢⱼₖₗ = Rᵢₚ Rⱼq Rₖᵣ Rₗₛ Cₚqᵣₛ
/// ```
pub fn t4_rotate(dd: &Tensor4, r: &Tensor2) -> Result<Tensor4, StrError> {
    let mut b1 = [[[[0.0; 3]; 3]; 3]; 3];
    let mut b2 = [[[[0.0; 3]; 3]; 3]; 3];
    // contract one index at a time
    for i in 0..3 {
        for q in 0..3 {
            for t in 0..3 {
                for s in 0..3 {
                    for p in 0..3 {
                        b1[i][q][t][s] += r.get(i, p) * dd.get(p, q, t, s);
                    }
                }
            }
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            for t in 0..3 {
                for s in 0..3 {
                    for q in 0..3 {
                        b2[i][j][t][s] += r.get(j, q) * b1[i][q][t][s];
                    }
                }
            }
        }
    }
    b1 = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for s in 0..3 {
                    for t in 0..3 {
                        b1[i][j][k][s] += r.get(k, t) * b2[i][j][t][s];
                    }
                }
            }
        }
    }
    b2 = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    for s in 0..3 {
                        b2[i][j][k][l] += r.get(l, s) * b1[i][j][k][s];
                    }
                }
            }
        }
    }
    t4_from_array_sym(&b2)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::EulerAngles;
    use russell_lab::approx_eq;
    use russell_tensor::{t4_ddot_t2, LinElasticity};

    #[test]
    fn t2_sym_part_works() {
        let a = Tensor2::from_matrix(
            &[[1.0, 2.0, 0.0], [4.0, 5.0, 6.0], [0.0, 2.0, 9.0]],
            Mandel::General,
        )
        .unwrap();
        let sym = t2_sym_part(&a);
        assert_eq!(sym.mandel(), Mandel::Symmetric);
        approx_eq(sym.get(0, 0), 1.0, 1e-15);
        approx_eq(sym.get(0, 1), 3.0, 1e-15);
        approx_eq(sym.get(1, 0), 3.0, 1e-15);
        approx_eq(sym.get(1, 2), 4.0, 1e-15);
        approx_eq(sym.get(0, 2), 0.0, 1e-15);
        approx_eq(sym.get(2, 2), 9.0, 1e-15);
    }

    #[test]
    fn t4_cubic_reduces_to_isotropic() {
        // isotropic: c11 = λ + 2μ, c12 = λ, c44 = μ
        let young = 1000.0;
        let poisson = 0.25;
        let lam = young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
        let mu = young / (2.0 * (1.0 + poisson));
        let cubic = t4_cubic(lam + 2.0 * mu, lam, mu).unwrap();
        let ela = LinElasticity::new(young, poisson, false, false);
        let dd = ela.get_modulus();
        for m in 0..6 {
            for n in 0..6 {
                approx_eq(cubic.matrix().get(m, n), dd.matrix().get(m, n), 1e-12);
            }
        }
    }

    #[test]
    fn t4_rotate_works() {
        // isotropic tensors are invariant under rotation
        let ela = LinElasticity::new(1000.0, 0.25, false, false);
        let r = Tensor2::from_matrix(&EulerAngles::new(30.0, 45.0, 60.0).rotation_matrix(), Mandel::General).unwrap();
        let rotated = t4_rotate(ela.get_modulus(), &r).unwrap();
        for m in 0..6 {
            for n in 0..6 {
                approx_eq(rotated.matrix().get(m, n), ela.get_modulus().matrix().get(m, n), 1e-10);
            }
        }

        // rotating back recovers the cubic tensor
        let dd = t4_cubic(10.0, 2.0, 3.0).unwrap();
        let mut strain = Tensor2::new(Mandel::Symmetric);
        strain.sym_set(0, 0, 1.0);
        let mut stress = Tensor2::new(Mandel::Symmetric);
        t4_ddot_t2(&mut stress, 1.0, &dd, &strain);
        approx_eq(stress.get(0, 0), 10.0, 1e-14);
        approx_eq(stress.get(1, 1), 2.0, 1e-14);
        let r = Tensor2::from_matrix(&EulerAngles::new(45.0, 0.0, 0.0).rotation_matrix(), Mandel::General).unwrap();
        let mut rt = Tensor2::new(Mandel::General);
        r.transpose(&mut rt);
        let rotated = t4_rotate(&dd, &r).unwrap();
        let back = t4_rotate(&rotated, &rt).unwrap();
        for m in 0..6 {
            for n in 0..6 {
                approx_eq(back.matrix().get(m, n), dd.matrix().get(m, n), 1e-13);
            }
        }
    }
}
