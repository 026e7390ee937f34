use pfmat::base::JOULE_TO_EV;
use pfmat::prelude::*;
use pfmat::StrError;
use russell_lab::{approx_eq, deriv1_central5};
use russell_tensor::{Mandel, Tensor2};
use std::sync::Arc;

// Polycrystal elasticity interpolation across a grain boundary
//
// TEST GOAL
//
// Verifies the interpolated elasticity tensor of a copper bicrystal and the
// derivatives with respect to the order parameters.
//
// GRAINS
//
// * grain 0: Euler angles (0, 0, 0)
// * grain 1: Euler angles (30, 45, 10)
// * element 0 holds both grains; element 7 only holds grain 1 (second order parameter)

fn bicrystal() -> Result<GrainServices, StrError> {
    let mut orientation = GrainTracker::new();
    orientation
        .set_default_features(&[Some(0), Some(1)])
        .set_element_features(7, &[None, Some(1)])
        .set_grain_data(0, EulerAngles::new(0.0, 0.0, 0.0))
        .set_grain_data(1, EulerAngles::new(30.0, 45.0, 10.0));
    let param = SampleParams::param_cubic_elasticity_copper();
    // the feature maps are copied from the orientation tracker
    let elasticity = PolycrystalElasticity::elasticity_per_grain(&param, &orientation)?;
    Ok(GrainServices {
        elasticity: Arc::new(elasticity),
        orientation: Arc::new(orientation),
    })
}

#[test]
fn test_polycrystal_elasticity() -> Result<(), StrError> {
    let grains = bicrystal()?;
    let param = SampleParams::param_polycrystal(2);
    let model = PolycrystalElasticity::new(&param, grains.clone())?;

    // inside grain 0 the tensor is the unrotated cubic tensor
    let (cc, props) = model.interpolate(0, &[1.0, 0.0])?;
    approx_eq(cc.matrix().get(0, 0), 1.684e5, 1e-9);
    approx_eq(cc.matrix().get(1, 2), 1.214e5, 1e-9);
    approx_eq(cc.matrix().get(5, 5), 2.0 * 0.754e5, 1e-9);
    approx_eq(props.total_weight, 1.0, 1e-15);
    for i in 0..3 {
        for j in 0..3 {
            approx_eq(props.crystal_rotation.get(i, j), if i == j { 1.0 } else { 0.0 }, 1e-15);
        }
    }

    // inside grain 1 the tensor and rotation are those of grain 1
    let c1 = grains.elasticity.grain_data(1)?;
    let r1 = grains.orientation.grain_data(1)?.crystal_rotation()?;
    let (cc, props) = model.interpolate(0, &[0.0, 1.0])?;
    for m in 0..6 {
        for n in 0..6 {
            approx_eq(cc.matrix().get(m, n), c1.matrix().get(m, n), 1e-9);
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            approx_eq(props.crystal_rotation.get(i, j), r1.get(i, j), 1e-14);
        }
    }

    // element 7 ignores the first order parameter
    let (cc, _) = model.interpolate(7, &[0.9, 0.6])?;
    for m in 0..6 {
        for n in 0..6 {
            approx_eq(cc.matrix().get(m, n), c1.matrix().get(m, n), 1e-9);
        }
    }

    // the interpolated tensor is symmetric
    let (cc, _) = model.interpolate(0, &[0.7, 0.4])?;
    for m in 0..6 {
        for n in 0..6 {
            approx_eq(cc.matrix().get(m, n), cc.matrix().get(n, m), 1e-9);
        }
    }
    Ok(())
}

#[test]
fn test_polycrystal_elasticity_derivatives() -> Result<(), StrError> {
    let param = SampleParams::param_polycrystal(2);
    let model = PolycrystalElasticity::new(&param, bicrystal()?)?;
    let scale = JOULE_TO_EV * f64::powi(param.length_scale, 3) * param.pressure_scale;
    let ops = [0.7, 0.4];
    let (_, props) = model.interpolate(0, &ops)?;

    struct Args {
        ops: [f64; 2],
        k: usize,
        m: usize,
        n: usize,
    }
    let mut args = Args {
        ops,
        k: 0,
        m: 0,
        n: 0,
    };
    for k in 0..2 {
        for (m, n) in [(0, 0), (0, 1), (1, 1), (3, 3), (0, 3), (4, 5)] {
            args.k = k;
            args.m = m;
            args.n = n;
            let num = deriv1_central5(ops[k], &mut args, |x, a| {
                let mut ops = a.ops;
                ops[a.k] = x;
                let (cc, _) = model.interpolate(0, &ops)?;
                Ok(cc.matrix().get(a.m, a.n))
            })?;
            approx_eq(props.delasticity_dop[k].matrix().get(m, n) / scale, num, 1e-3);
        }
    }
    Ok(())
}

#[test]
fn test_polycrystal_elasticity_stress() -> Result<(), StrError> {
    let param = ParamMaterial::Polycrystal(SampleParams::param_polycrystal(2));
    assert_eq!(
        Material::new(&param, None).err(),
        Some("polycrystal model requires grain services")
    );
    let material = Material::new(&param, Some(bicrystal()?))?;
    let state = material.new_state()?;
    let mut strain = Tensor2::new(Mandel::Symmetric);
    strain.sym_set(0, 0, 1e-4);
    let mut input = PointInput::new();
    input.set_order_parameters(&[1.0, 0.0]).set_strain(&strain);
    let update = material.actual.compute_stress_and_state(&input, &state)?.into_update()?;
    approx_eq(update.state.stress.get(0, 0), 1.684e5 * 1e-4, 1e-9);
    approx_eq(update.state.stress.get(1, 1), 1.214e5 * 1e-4, 1e-9);
    approx_eq(update.tangent.matrix().get(0, 0), 1.684e5, 1e-9);
    Ok(())
}
