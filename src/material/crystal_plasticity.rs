use super::tensor_algebra::{t2_sym_part, t4_cubic, t4_from_array_sym, t4_rotate};
use super::{ConstitutiveModel, Cutback, DerivedProperties, LocalSolverStats, LocalState, Outcome, PlasticityProperties};
use super::{PointInput, PointUpdate, SlipSystems};
use crate::base::{ParamCrystalPlasticity, ParamFlowRate, ParamHardening, ParamLocalSolver, TangentKind};
use crate::StrError;
use russell_lab::{mat_inverse, mat_vec_mul, vec_norm, vec_update, Matrix, Norm, Vector};
use russell_tensor::{t2_add, t2_ddot_t2, t2_dot_t2, t2_dyad_t2_update, t4_ddot_t2, Mandel, Tensor2, Tensor4};

/// Holds the index of the elastic energy density W0e in the internal values
pub const CP_W0E: usize = 0;

/// Holds the index of the plastic work density W0p in the internal values
pub const CP_W0P: usize = 1;

/// Holds the index of the accumulated slip in the internal values
pub const CP_ACC_SLIP: usize = 2;

/// Holds the index of the first slip system resistance in the internal values
pub const CP_GSS: usize = 3;

/// Defines the minimum absolute value of a determinant for inversion
const DET_TOL: f64 = 1e-14;

/// Implements finite-strain crystal plasticity with plastic work and artificial bulk viscosity
///
/// The deformation gradient is decomposed as F = Fe Fp. The plastic velocity gradient results from
/// the slip on each system (Schmid tensor S_α) following a power law:
///
/// ```text
/// Δγ_α = a0 |τ_α / g_α|^(1/xm) sign(τ_α) Δt     with   τ_α = PK2 : S_α
///
/// Fp⁻¹ = Fp_old⁻¹ (I - Σ Δγ_α S_α)
/// ```
///
/// The second Piola-Kirchhoff stress PK2 is found by a Newton method on the residual
///
/// ```text
/// R = PK2 - C : Ee - q I     with   Ee = ½ (Feᵀ Fe - I)
/// ```
///
/// where q is the artificial bulk viscosity pressure. An outer fixed-point loop updates the slip
/// system resistances g_α. If the local solve fails, the step is subdivided into 2, 4, ... substeps
/// and, if it still fails, a cutback is requested.
///
/// The flow rule is rate-dependent: slip occurs whenever τ_α ≠ 0, even under a zero strain increment.
///
/// The internal values are `[W0e, W0p, accumulated slip, g_1, ..., g_n]`.
pub struct CrystalPlasticity {
    /// Elasticity tensor in the crystal frame
    elasticity_crystal: Tensor4,

    /// Elasticity tensor rotated by the crystal rotation given by the Euler angles
    elasticity_default: Tensor4,

    /// Crystal rotation (crysrot = Rᵀ) given by the Euler angles
    rotation_default: Tensor2,

    /// Slip systems
    slip_systems: SlipSystems,

    /// Flow rule parameters
    flow_rate: ParamFlowRate,

    /// Initial slip system resistance
    gss_initial: f64,

    /// Hardening parameters
    hardening: ParamHardening,

    /// Quadratic bulk viscosity coefficient
    c0: f64,

    /// Linear bulk viscosity coefficient
    c1: f64,

    /// Local solver settings
    solver: ParamLocalSolver,
}

/// Holds the state at the beginning or end of a (sub)step
#[derive(Clone, Debug)]
struct StepState {
    /// Second Piola-Kirchhoff stress
    pk2: Tensor2,

    /// Inverse of the plastic deformation gradient
    fp_inv: Tensor2,

    /// Slip system resistances
    gss: Vec<f64>,

    /// Elastic energy density
    w0e: f64,

    /// Plastic work density
    w0p: f64,

    /// Accumulated slip
    acc_slip: f64,

    /// Derivative of W0e with respect to the strain
    dw0e_dstrain: Tensor2,

    /// Derivative of W0p with respect to the strain
    dw0p_dstrain: Tensor2,

    /// Elastic deformation gradient
    fe: Tensor2,

    /// Bulk viscosity pressure
    q: f64,
}

/// Holds the data computed with the residual and needed by the Jacobian
struct ResidualData {
    /// Residual vector (Mandel)
    resid: Vector,

    /// Resolved shear stresses
    tau: Vec<f64>,

    /// Slip increments
    slip: Vec<f64>,

    /// Derivatives of the slip increments with respect to the resolved shear stresses
    dslip_dtau: Vec<f64>,

    /// Inverse of the plastic deformation gradient
    fp_inv: Tensor2,

    /// Elastic deformation gradient
    fe: Tensor2,

    /// Elastic Green-Lagrange strain
    ee: Tensor2,

    /// Elastic part of the second Piola-Kirchhoff stress: C : Ee
    pk2_elastic: Tensor2,
}

/// Holds the data that remain constant during the local solve of one substep
struct SubstepData<'a> {
    /// Elasticity tensor (sample frame)
    cc: &'a Tensor4,

    /// Schmid tensors (sample frame; general)
    schmid: &'a [Tensor2],

    /// Symmetric parts of the Schmid tensors
    schmid_sym: &'a [Tensor2],

    /// Deformation gradient at the end of the substep
    ff: Tensor2,

    /// Time increment of the substep
    dt: f64,

    /// Bulk viscosity pressure
    q: f64,
}

/// Returns the Green-Lagrange strain E = ½ (Fᵀ F - I)
fn green_lagrange(ff: &Tensor2) -> Tensor2 {
    let mut fft = Tensor2::new(Mandel::General);
    let mut ftf = Tensor2::new(Mandel::General);
    ff.transpose(&mut fft);
    t2_dot_t2(&mut ftf, &fft, ff);
    let mut ee = Tensor2::new(Mandel::Symmetric);
    t2_add(&mut ee, 0.5, &t2_sym_part(&ftf), -0.5, &Tensor2::identity(Mandel::Symmetric));
    ee
}

/// Returns the inverse of a general tensor
fn inverse(a: &Tensor2, err: StrError) -> Result<Tensor2, StrError> {
    let mut ai = Tensor2::new(Mandel::General);
    a.inverse(&mut ai, DET_TOL).ok_or(err)?;
    Ok(ai)
}

impl CrystalPlasticity {
    /// Allocates a new instance
    pub fn new(param: &ParamCrystalPlasticity) -> Result<Self, StrError> {
        param.validate()?;
        let el = &param.elasticity;
        let elasticity_crystal = t4_cubic(el.c11, el.c12, el.c44)?;
        let rotation_default = param.euler_angles.crystal_rotation()?;
        let elasticity_default = t4_rotate(&elasticity_crystal, &rotation_default)?;
        Ok(CrystalPlasticity {
            elasticity_crystal,
            elasticity_default,
            rotation_default,
            slip_systems: SlipSystems::new(&param.slip_systems)?,
            flow_rate: param.flow_rate,
            gss_initial: param.gss_initial,
            hardening: param.hardening,
            c0: param.c0,
            c1: param.c1,
            solver: param.solver,
        })
    }

    /// Calculates the artificial bulk viscosity pressure
    ///
    /// ```text
    /// ε̇v = ln(J / J_prev) / Δt
    /// q = C0 ε̇v |ε̇v| + C1 ε̇v    if ε̇v < 0 (compression)
    /// q = 0                      otherwise
    /// ```
    pub fn bulk_viscosity(&self, jj: f64, jj_prev: f64, dt: f64) -> f64 {
        let rate = f64::ln(jj / jj_prev) / dt;
        if rate < 0.0 {
            self.c0 * rate * f64::abs(rate) + self.c1 * rate
        } else {
            0.0
        }
    }

    /// Calculates the slip increments and their derivatives
    fn get_slip_increments(&self, tau: &[f64], gss: &[f64], dt: f64) -> Result<(Vec<f64>, Vec<f64>), StrError> {
        let a0 = self.flow_rate.a0;
        let xm = self.flow_rate.xm;
        let mut slip = vec![0.0; tau.len()];
        let mut dslip_dtau = vec![0.0; tau.len()];
        for a in 0..tau.len() {
            let ratio = f64::abs(tau[a] / gss[a]);
            slip[a] = a0 * f64::powf(ratio, 1.0 / xm) * f64::signum(tau[a]) * dt;
            if tau[a] == 0.0 {
                slip[a] = 0.0;
            }
            if !slip[a].is_finite() || f64::abs(slip[a]) > self.solver.slip_incr_tol {
                return Err("slip increment exceeds tolerance");
            }
            dslip_dtau[a] = a0 / xm * f64::powf(ratio, 1.0 / xm - 1.0) / gss[a] * dt;
        }
        Ok((slip, dslip_dtau))
    }

    /// Calculates the residual of the stress equation
    fn calc_residual(
        &self,
        data: &SubstepData,
        pk2: &Tensor2,
        begin: &StepState,
        gss: &[f64],
    ) -> Result<ResidualData, StrError> {
        // resolved shear stresses
        let tau: Vec<f64> = data.schmid_sym.iter().map(|s| t2_ddot_t2(pk2, s)).collect();
        let (slip, dslip_dtau) = self.get_slip_increments(&tau, gss, data.dt)?;

        // Fp⁻¹ = Fp_old⁻¹ (I - Σ Δγ S)
        let mut aa = Tensor2::identity(Mandel::General);
        for (s, gamma) in data.schmid.iter().zip(&slip) {
            aa.update(-gamma, s);
        }
        let mut fp_inv = Tensor2::new(Mandel::General);
        t2_dot_t2(&mut fp_inv, &begin.fp_inv, &aa);

        // Fe = F Fp⁻¹
        let mut fe = Tensor2::new(Mandel::General);
        t2_dot_t2(&mut fe, &data.ff, &fp_inv);
        let ee = green_lagrange(&fe);

        // R = PK2 - C : Ee - q I
        let mut pk2_elastic = Tensor2::new(Mandel::Symmetric);
        t4_ddot_t2(&mut pk2_elastic, 1.0, data.cc, &ee);
        let mut resid = Tensor2::new(Mandel::Symmetric);
        t2_add(&mut resid, 1.0, pk2, -1.0, &pk2_elastic);
        resid.update(-data.q, &Tensor2::identity(Mandel::Symmetric));
        Ok(ResidualData {
            resid: resid.vector().clone(),
            tau,
            slip,
            dslip_dtau,
            fp_inv,
            fe,
            ee,
            pk2_elastic,
        })
    }

    /// Calculates the Jacobian of the residual with respect to PK2 (Mandel)
    ///
    /// ```text
    /// J = I - Σ_α (∂Δγ_α/∂τ_α) (C : ∂Ee/∂Δγ_α) ⊗ sym(S_α)
    ///
    /// ∂Ee/∂Δγ_α = ½ (dFeᵀ Fe + Feᵀ dFe)    with   dFe = -F Fp_old⁻¹ S_α
    /// ```
    fn calc_jacobian(&self, data: &SubstepData, rd: &ResidualData, begin: &StepState) -> Tensor4 {
        let mut jac = Tensor4::new(Mandel::Symmetric);
        for m in 0..6 {
            jac.matrix_mut().set(m, m, 1.0);
        }
        let mut ffp = Tensor2::new(Mandel::General);
        let mut fet = Tensor2::new(Mandel::General);
        let mut dfe = Tensor2::new(Mandel::General);
        let mut dfet = Tensor2::new(Mandel::General);
        let mut left = Tensor2::new(Mandel::General);
        let mut right = Tensor2::new(Mandel::General);
        let mut dee = Tensor2::new(Mandel::General);
        let mut dpk2 = Tensor2::new(Mandel::Symmetric);
        t2_dot_t2(&mut ffp, &data.ff, &begin.fp_inv);
        rd.fe.transpose(&mut fet);
        for (a, s) in data.schmid.iter().enumerate() {
            if rd.dslip_dtau[a] == 0.0 {
                continue;
            }
            // the minus sign of dFe goes into the sum below
            t2_dot_t2(&mut dfe, &ffp, s);
            dfe.transpose(&mut dfet);
            t2_dot_t2(&mut left, &dfet, &rd.fe);
            t2_dot_t2(&mut right, &fet, &dfe);
            t2_add(&mut dee, -0.5, &left, -0.5, &right);
            t4_ddot_t2(&mut dpk2, 1.0, data.cc, &t2_sym_part(&dee));
            t2_dyad_t2_update(&mut jac, -rd.dslip_dtau[a], &dpk2, &data.schmid_sym[a]);
        }
        jac
    }

    /// Solves the stress residual equation by Newton iterations
    fn solve_stress(
        &self,
        data: &SubstepData,
        begin: &StepState,
        gss: &[f64],
        pk2_guess: &Tensor2,
        stats: &mut LocalSolverStats,
    ) -> Result<(Tensor2, ResidualData), StrError> {
        let mut pk2 = pk2_guess.clone();
        let mut rd = self.calc_residual(data, &pk2, begin, gss)?;
        let rnorm0 = vec_norm(&rd.resid, Norm::Euc);
        let mut rnorm = rnorm0;
        let mut jac_inv = Matrix::new(6, 6);
        let mut dpk2 = Vector::new(6);
        let mut iter = 0;
        while rnorm > self.solver.rtol * rnorm0 && rnorm0 > self.solver.abs_tol && iter < self.solver.max_iter {
            // PK2 ← PK2 - J⁻¹ R
            let jac = self.calc_jacobian(data, &rd, begin);
            mat_inverse(&mut jac_inv, jac.matrix()).map_err(|_| "cannot invert the local Jacobian")?;
            mat_vec_mul(&mut dpk2, 1.0, &jac_inv, &rd.resid)?;
            vec_update(pk2.vector_mut(), -1.0, &dpk2)?;
            rd = self.calc_residual(data, &pk2, begin, gss)?;
            rnorm = vec_norm(&rd.resid, Norm::Euc);
            if !rnorm.is_finite() {
                return Err("stress residual is not finite");
            }
            iter += 1;
        }
        stats.n_iteration_stress += iter;
        stats.residual_norm = rnorm;
        if rnorm > self.solver.rtol * rnorm0 && rnorm0 > self.solver.abs_tol {
            return Err("stress residual did not converge");
        }
        Ok((pk2, rd))
    }

    /// Updates the slip system resistances given the slip increments
    ///
    /// ```text
    /// h_β = h0 |1 - g_β/τsat|^a sign(1 - g_β/τsat)
    /// g_α = g_α,old + Σ_β q_αβ h_β |Δγ_β|
    /// ```
    fn update_gss(&self, gss_begin: &[f64], gss: &[f64], slip: &[f64]) -> Vec<f64> {
        let p = &self.hardening;
        let hb: Vec<f64> = gss
            .iter()
            .map(|g| {
                let x = 1.0 - g / p.tau_sat;
                p.h0 * f64::powf(f64::abs(x), p.a) * f64::signum(x)
            })
            .collect();
        let n = gss.len();
        let mut gss_new = vec![0.0; n];
        for a in 0..n {
            gss_new[a] = gss_begin[a];
            for b in 0..n {
                let q = self.slip_systems.latent_coefficient(a, b, p.r);
                gss_new[a] += q * hb[b] * f64::abs(slip[b]);
            }
        }
        gss_new
    }

    /// Solves the state variables (stress and slip system resistances) of one substep
    fn solve_statevar(
        &self,
        data: &SubstepData,
        begin: &StepState,
        stats: &mut LocalSolverStats,
    ) -> Result<(Tensor2, ResidualData, Vec<f64>), StrError> {
        let mut gss = begin.gss.clone();
        let mut pk2_guess = begin.pk2.clone();
        for _ in 0..self.solver.max_iter_gss {
            stats.n_iteration_gss += 1;
            let (pk2, rd) = self.solve_stress(data, begin, &gss, &pk2_guess, stats)?;
            let gss_new = self.update_gss(&begin.gss, &gss, &rd.slip);
            let mut max_diff = 0.0;
            for a in 0..gss.len() {
                max_diff = f64::max(max_diff, f64::abs(gss_new[a] - gss[a]));
            }
            gss = gss_new;
            if max_diff <= self.solver.gtol {
                return Ok((pk2, rd, gss));
            }
            pk2_guess = pk2;
        }
        Err("slip system resistances did not converge")
    }

    /// Updates the energies at the end of a substep
    ///
    /// ```text
    /// W0e = ½ (C : Ee) : Ee
    /// W0p = W0p_old + Σ |τ_α Δγ_α|
    /// ∂W0e/∂ε = C : Ee
    /// ∂W0p/∂ε = Σ |Δγ_α| sign(τ_α) C : sym(S_α)
    /// ```
    fn update_energies(&self, data: &SubstepData, rd: &ResidualData, begin: &StepState) -> (f64, f64, Tensor2, Tensor2) {
        let w0e = 0.5 * t2_ddot_t2(&rd.pk2_elastic, &rd.ee);
        let mut w0p = begin.w0p;
        let mut sum = Tensor2::new(Mandel::Symmetric);
        for a in 0..rd.slip.len() {
            w0p += f64::abs(rd.tau[a] * rd.slip[a]);
            if rd.tau[a] != 0.0 {
                sum.update(f64::abs(rd.slip[a]) * f64::signum(rd.tau[a]), &data.schmid_sym[a]);
            }
        }
        let mut dw0p_dstrain = Tensor2::new(Mandel::Symmetric);
        t4_ddot_t2(&mut dw0p_dstrain, 1.0, data.cc, &sum);
        (w0e, w0p, rd.pk2_elastic.clone(), dw0p_dstrain)
    }

    /// Solves a step subdivided into n substeps
    fn solve_substeps(
        &self,
        input: &PointInput,
        cc: &Tensor4,
        schmid: &[Tensor2],
        schmid_sym: &[Tensor2],
        initial: &StepState,
        n_substep: usize,
        stats: &mut LocalSolverStats,
    ) -> Result<StepState, StrError> {
        let ff_begin = &input.deformation_gradient_old;
        let ff_end = &input.deformation_gradient;
        let dt = input.dt / (n_substep as f64);
        let mut state = initial.clone();
        let mut jj_prev = ff_begin.determinant();
        for k in 1..=n_substep {
            let t = (k as f64) / (n_substep as f64);
            let mut ff = Tensor2::new(Mandel::General);
            t2_add(&mut ff, 1.0 - t, ff_begin, t, ff_end);
            let jj = ff.determinant();
            let q = self.bulk_viscosity(jj, jj_prev, dt);
            let data = SubstepData {
                cc,
                schmid,
                schmid_sym,
                ff,
                dt,
                q,
            };
            let (pk2, rd, gss) = self.solve_statevar(&data, &state, stats)?;
            let (w0e, w0p, dw0e_dstrain, dw0p_dstrain) = self.update_energies(&data, &rd, &state);
            let slip_sum: f64 = rd.slip.iter().map(|s| f64::abs(*s)).sum();
            state = StepState {
                pk2,
                fp_inv: rd.fp_inv,
                gss,
                w0e,
                w0p,
                acc_slip: state.acc_slip + slip_sum,
                dw0e_dstrain,
                dw0p_dstrain,
                fe: rd.fe,
                q,
            };
            jj_prev = jj;
        }
        Ok(state)
    }

    /// Computes the tangent modulus dσ/dFe (symmetrized) with the slip increments held fixed
    ///
    /// ```text
    /// J dσᵢⱼ/dFeₖₗ = Feᵢₘ Feⱼₙ Cₘₙₚq ∂Eeₚq/∂Feₖₗ + δᵢₖ (PK2 Feᵀ)ₗⱼ + (Fe PK2)ᵢₗ δⱼₖ - J σᵢⱼ Fe⁻ᵀₖₗ
    /// ```
    fn exact_tangent(&self, cc: &Tensor4, fe: &Tensor2, pk2: &Tensor2, sigma: &Tensor2) -> Result<Tensor4, StrError> {
        let jj = fe.determinant();
        let fe_inv = inverse(fe, "cannot invert the elastic deformation gradient")?;
        let pk2_general = pk2.as_general();
        let mut fet = Tensor2::new(Mandel::General);
        let mut pk2fet = Tensor2::new(Mandel::General);
        let mut fepk2 = Tensor2::new(Mandel::General);
        fe.transpose(&mut fet);
        t2_dot_t2(&mut pk2fet, &pk2_general, &fet);
        t2_dot_t2(&mut fepk2, fe, &pk2_general);

        // A = (Fe ⊗ Fe) : C
        let mut aa = [[[[0.0; 3]; 3]; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for p in 0..3 {
                    for q in 0..3 {
                        for m in 0..3 {
                            for n in 0..3 {
                                aa[i][j][p][q] += fe.get(i, m) * fe.get(j, n) * cc.get(m, n, p, q);
                            }
                        }
                    }
                }
            }
        }

        // ∂Eeₚq/∂Feₖₗ = ½ (Feₖₚ δqₗ + Feₖq δₚₗ)
        let mut tan = [[[[0.0; 3]; 3]; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    for l in 0..3 {
                        let mut val = 0.0;
                        for p in 0..3 {
                            val += 0.5 * aa[i][j][p][l] * fe.get(k, p);
                            val += 0.5 * aa[i][j][l][p] * fe.get(k, p);
                        }
                        if i == k {
                            val += pk2fet.get(l, j);
                        }
                        if j == k {
                            val += fepk2.get(i, l);
                        }
                        tan[i][j][k][l] = val / jj - sigma.get(i, j) * fe_inv.get(l, k);
                    }
                }
            }
        }
        t4_from_array_sym(&tan)
    }

    /// Returns the elasticity tensor and crystal rotation for the given input
    fn elasticity_and_rotation(&self, input: &PointInput) -> Result<(Tensor4, Tensor2), StrError> {
        let crysrot = match &input.crystal_rotation {
            Some(r) => {
                if r.mandel() != Mandel::General {
                    return Err("crystal rotation must use the general representation");
                }
                r.clone()
            }
            None => self.rotation_default.clone(),
        };
        let cc = match (&input.elasticity, &input.crystal_rotation) {
            (Some(dd), _) => {
                if dd.mandel() != Mandel::Symmetric {
                    return Err("elasticity tensor must use the symmetric representation");
                }
                dd.clone()
            }
            (None, Some(r)) => t4_rotate(&self.elasticity_crystal, r)?,
            (None, None) => self.elasticity_default.clone(),
        };
        Ok((cc, crysrot))
    }

    /// Returns the state at the beginning of the step from the old (committed) state
    fn pre_solve_statevar(&self, old: &LocalState) -> Result<StepState, StrError> {
        let n = self.slip_systems.n_system();
        if old.internal_values.dim() != CP_GSS + n {
            return Err("number of internal values is incorrect");
        }
        let pk2 = match &old.pk2 {
            Some(t) => {
                if t.mandel() != Mandel::Symmetric {
                    return Err("second Piola-Kirchhoff stress must use the symmetric representation");
                }
                t.clone()
            }
            None => Tensor2::new(Mandel::Symmetric),
        };
        let fp_inv = match &old.plastic_deformation_gradient {
            Some(fp) => {
                if fp.mandel() != Mandel::General {
                    return Err("plastic deformation gradient must use the general representation");
                }
                inverse(fp, "cannot invert the plastic deformation gradient")?
            }
            None => Tensor2::identity(Mandel::General),
        };
        let gss = (0..n).map(|a| old.internal_values[CP_GSS + a]).collect();
        Ok(StepState {
            pk2,
            fp_inv,
            gss,
            w0e: old.internal_values[CP_W0E],
            w0p: old.internal_values[CP_W0P],
            acc_slip: old.internal_values[CP_ACC_SLIP],
            dw0e_dstrain: Tensor2::new(Mandel::Symmetric),
            dw0p_dstrain: Tensor2::new(Mandel::Symmetric),
            fe: Tensor2::identity(Mandel::General),
            q: 0.0,
        })
    }

    /// Returns the new local state, the tangent, and the derived properties after convergence
    fn post_solve_statevar(
        &self,
        end: &StepState,
        cc: &Tensor4,
        stats: LocalSolverStats,
    ) -> Result<PointUpdate, StrError> {
        // σ = Fe PK2 Feᵀ / det(Fe)
        let fe = &end.fe;
        let jj = fe.determinant();
        if jj <= 0.0 {
            return Err("elastic deformation gradient has non-positive determinant");
        }
        let mut fet = Tensor2::new(Mandel::General);
        let mut fepk2 = Tensor2::new(Mandel::General);
        let mut tt = Tensor2::new(Mandel::General);
        fe.transpose(&mut fet);
        t2_dot_t2(&mut fepk2, fe, &end.pk2.as_general());
        t2_dot_t2(&mut tt, &fepk2, &fet);
        let mut sigma = Tensor2::new(Mandel::Symmetric);
        sigma.set_tensor(1.0 / jj, &t2_sym_part(&tt));

        let mut state = LocalState::new(CP_GSS + end.gss.len());
        state.internal_values[CP_W0E] = end.w0e;
        state.internal_values[CP_W0P] = end.w0p;
        state.internal_values[CP_ACC_SLIP] = end.acc_slip;
        for (a, g) in end.gss.iter().enumerate() {
            state.internal_values[CP_GSS + a] = *g;
        }
        state.pk2 = Some(end.pk2.clone());
        state.plastic_deformation_gradient = Some(inverse(&end.fp_inv, "cannot invert the plastic deformation gradient")?);

        let tangent = match self.solver.tangent {
            TangentKind::Elastic => cc.clone(),
            TangentKind::Exact => self.exact_tangent(cc, fe, &end.pk2, &sigma)?,
        };
        state.stress = sigma;
        let derived = DerivedProperties::CrystalPlasticity(PlasticityProperties {
            w0e: end.w0e,
            w0p: end.w0p,
            dw0e_dstrain: end.dw0e_dstrain.clone(),
            dw0p_dstrain: end.dw0p_dstrain.clone(),
            viscous_pressure: end.q,
            stats,
        });
        Ok(PointUpdate {
            state,
            tangent,
            derived,
        })
    }
}

impl ConstitutiveModel for CrystalPlasticity {
    fn name(&self) -> &'static str {
        "CrystalPlasticity"
    }

    fn n_internal_values(&self) -> usize {
        CP_GSS + self.slip_systems.n_system() // [W0e, W0p, acc_slip, g...]
    }

    fn initialize_internal_values(&self, state: &mut LocalState) -> Result<(), StrError> {
        if state.internal_values.dim() != self.n_internal_values() {
            return Err("number of internal values is incorrect");
        }
        state.internal_values.fill(0.0);
        for a in 0..self.slip_systems.n_system() {
            state.internal_values[CP_GSS + a] = self.gss_initial;
        }
        state.pk2 = Some(Tensor2::new(Mandel::Symmetric));
        state.plastic_deformation_gradient = Some(Tensor2::identity(Mandel::General));
        Ok(())
    }

    fn compute_stress_and_state(&self, input: &PointInput, old: &LocalState) -> Result<Outcome, StrError> {
        if input.dt <= 0.0 {
            return Err("time increment must be positive");
        }
        if input.deformation_gradient.mandel() != Mandel::General
            || input.deformation_gradient_old.mandel() != Mandel::General
        {
            return Err("deformation gradients must use the general representation");
        }
        let (cc, crysrot) = self.elasticity_and_rotation(input)?;
        let schmid = self.slip_systems.schmid_tensors(&crysrot)?;
        let schmid_sym: Vec<Tensor2> = schmid.iter().map(t2_sym_part).collect();
        let initial = self.pre_solve_statevar(old)?;

        let mut stats = LocalSolverStats::default();
        let mut reason = "local solver did not converge";
        for level in 0..self.solver.max_substep_iter {
            let n_substep = 1 << level;
            stats.n_substep = n_substep;
            match self.solve_substeps(input, &cc, &schmid, &schmid_sym, &initial, n_substep, &mut stats) {
                Ok(end) => {
                    let update = self.post_solve_statevar(&end, &cc, stats)?;
                    return Ok(Outcome::Converged(update));
                }
                Err(e) => reason = e,
            }
        }
        Ok(Outcome::Cutback(Cutback { reason, stats }))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
