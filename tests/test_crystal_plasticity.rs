use pfmat::material::{CP_ACC_SLIP, CP_GSS, CP_W0P};
use pfmat::prelude::*;
use pfmat::StrError;
use russell_lab::approx_eq;
use russell_tensor::{Mandel, Tensor2};

// Crystal plasticity under monotonic stretch
//
// TEST GOAL
//
// Verifies the history variables of an FCC copper crystal driven through a
// sequence of stretch increments, with parameters read from a JSON file.
//
// LOADING
//
// * F = diag(1 + e, 1, 1) with e increasing linearly up to 2e-3
// * 10 increments with Δt = 1
//
// CONFIGURATION AND PARAMETERS
//
// * Cubic elasticity: C11 = 168.4 GPa, C12 = 121.4 GPa, C44 = 75.4 GPa
// * Linear viscous flow (xm = 1) with a0 = 1e-4
// * Exact tangent and up to 4 substep levels

const PARAM_FILE: &str = "data/params/crystal_plasticity_fcc.json";
const MAX_STRETCH: f64 = 2e-3;
const N_STEPS: usize = 10;

fn read_param() -> Result<ParamMaterial, StrError> {
    let contents = std::fs::read_to_string(PARAM_FILE).map_err(|_| "cannot open parameters file")?;
    serde_json::from_str(&contents).map_err(|_| "cannot parse parameters file")
}

#[test]
fn test_crystal_plasticity() -> Result<(), StrError> {
    // parameters
    let mut param = match read_param()? {
        ParamMaterial::CrystalPlasticity(p) => p,
        _ => return Err("parameters file must contain crystal plasticity parameters"),
    };
    assert_eq!(param.slip_systems.len(), 12);
    assert_eq!(param.solver.tangent, TangentKind::Exact);
    param.flow_rate.a0 = 1e-4;
    param.flow_rate.xm = 1.0;
    let material = Material::new(&ParamMaterial::CrystalPlasticity(param), None)?;

    // path
    let path = (1..=N_STEPS)
        .map(|i| {
            let e = MAX_STRETCH * (i as f64) / (N_STEPS as f64);
            Tensor2::from_matrix(&[[1.0 + e, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], Mandel::General)
        })
        .collect::<Result<Vec<_>, _>>()?;

    // run
    let driver = LoadingDriver::new(&material);
    let records = driver.run(&path, 1.0, &PointInput::new())?;
    assert_eq!(records.len(), N_STEPS);

    // history variables do not decrease
    let mut w0p_prev = 0.0;
    let mut acc_slip_prev = 0.0;
    for record in &records {
        assert_eq!(record.n_cutback, 0);
        let iv = &record.update.state.internal_values;
        assert!(iv[CP_W0P] >= w0p_prev);
        assert!(iv[CP_ACC_SLIP] >= acc_slip_prev);
        for a in 0..12 {
            assert!(iv[CP_GSS + a] >= 60.8);
        }
        let props = record.update.derived.plasticity()?;
        approx_eq(props.w0p, iv[CP_W0P], 1e-15);
        assert_eq!(props.viscous_pressure, 0.0);
        w0p_prev = iv[CP_W0P];
        acc_slip_prev = iv[CP_ACC_SLIP];
    }
    assert!(w0p_prev > 0.0);
    assert!(acc_slip_prev > 0.0);

    // plastic slip relaxes the stress below the elastic prediction
    let e = MAX_STRETCH;
    let elastic = 1.684e5 * (e + e * e / 2.0) * (1.0 + e);
    let last = &records[N_STEPS - 1];
    let sig00 = last.update.state.stress.get(0, 0);
    assert!(sig00 > 0.0);
    assert!(sig00 < elastic);

    // lateral stresses are equal under [100] loading
    approx_eq(last.update.state.stress.get(1, 1), last.update.state.stress.get(2, 2), 1e-6);
    Ok(())
}
