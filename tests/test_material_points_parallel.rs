use pfmat::prelude::*;
use pfmat::StrError;
use russell_lab::approx_eq;
use russell_tensor::{Mandel, Tensor2};

// Parallel update of many crystal plasticity points
//
// TEST GOAL
//
// Verifies that updating independent points in parallel gives the same results
// as the sequential update and that cutback requests are reported per point.
//
// POINTS
//
// * points 0 to 5 are stretched by small amounts and converge
// * points 6 and 7 are stretched by a large amount and request a cutback

const N_POINT: usize = 8;

fn inputs() -> Result<Vec<PointInput>, StrError> {
    (0..N_POINT)
        .map(|p| {
            let e = if p < 6 { 2e-5 * (p as f64) } else { 2e-3 };
            let ff = Tensor2::from_matrix(&[[1.0 + e, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], Mandel::General)?;
            let mut input = PointInput::new();
            input
                .set_element_id(p)
                .set_deformation_gradients(&ff, &Tensor2::identity(Mandel::General));
            Ok(input)
        })
        .collect()
}

#[test]
fn test_material_points_parallel() -> Result<(), StrError> {
    let mut param = SampleParams::param_crystal_plasticity_fcc();
    param.flow_rate.a0 = 1e-4;
    param.flow_rate.xm = 1.0;
    param.solver.slip_incr_tol = 2e-5;
    let material = Material::new(&ParamMaterial::CrystalPlasticity(param), None)?;

    // sequential
    let mut sequential = MaterialPoints::new(&material, inputs()?)?;
    let summary_seq = sequential.update()?;
    assert_eq!(summary_seq.n_converged, 6);
    assert_eq!(summary_seq.n_cutback, 2);
    assert!(summary_seq.first_cutback_reason.is_some());

    // parallel
    let mut parallel = MaterialPoints::new(&material, inputs()?)?;
    let summary_par = parallel.update_parallel()?;
    assert_eq!(summary_par, summary_seq);

    // same results
    for p in 0..N_POINT {
        let a = &sequential.all[p];
        let b = &parallel.all[p];
        assert_eq!(a.last.is_some(), b.last.is_some());
        for m in 0..6 {
            approx_eq(a.states.current.stress.vector()[m], b.states.current.stress.vector()[m], 1e-15);
        }
        for i in 0..a.states.current.internal_values.dim() {
            approx_eq(
                a.states.current.internal_values[i],
                b.states.current.internal_values[i],
                1e-15,
            );
        }
    }

    // points requesting a cutback keep the old state
    for p in 6..N_POINT {
        assert!(parallel.all[p].last.is_none());
        assert_eq!(parallel.all[p].states.current.stress.get(0, 0), 0.0);
    }
    assert!(parallel.all[5].states.current.stress.get(0, 0) > 0.0);

    // commit accepts the converged states
    parallel.commit();
    let s5 = parallel.all[5].states.current.stress.get(0, 0);
    assert_eq!(parallel.all[5].states.old.stress.get(0, 0), s5);
    Ok(())
}
