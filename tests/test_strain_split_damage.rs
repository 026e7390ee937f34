use pfmat::prelude::*;
use pfmat::StrError;
use russell_lab::{approx_eq, deriv1_central5};
use russell_tensor::{Mandel, Tensor2};

// Strain-split damage under tension and compression
//
// TEST GOAL
//
// Verifies that only the tensile part of the stress is degraded by damage and that
// the derivative with respect to the damage variable is consistent.
//
// PARAMETERS
//
// * Young: E = 120, Poisson: ν = 0.3
// * Bulk modulus: Kb = E / (3 (1 - 2ν)) = 100
// * Shear modulus: μ = E / (2 (1 + ν))

const YOUNG: f64 = 120.0;
const POISSON: f64 = 0.3;
const KB: f64 = 100.0;

fn diagonal_strain(e0: f64, e1: f64, e2: f64) -> Tensor2 {
    let mut strain = Tensor2::new(Mandel::Symmetric);
    strain.sym_set(0, 0, e0);
    strain.sym_set(1, 1, e1);
    strain.sym_set(2, 2, e2);
    strain
}

fn mean_stress(stress: &Tensor2) -> f64 {
    (stress.get(0, 0) + stress.get(1, 1) + stress.get(2, 2)) / 3.0
}

#[test]
fn test_strain_split_damage() -> Result<(), StrError> {
    // model
    let param = ParamMaterial::StrainSplitDamage(ParamStrainSplitDamage::new(YOUNG, POISSON));
    let material = Material::new(&param, None)?;
    let state = material.new_state()?;
    let mu = YOUNG / (2.0 * (1.0 + POISSON));

    // compression: the volumetric stress is not affected by damage
    let strain = diagonal_strain(-1e-3, -2e-3, -3e-3);
    let mut input = PointInput::new();
    input.set_strain(&strain);
    for damage in [0.0, 0.5, 1.0] {
        input.set_damage(damage);
        let update = material.actual.compute_stress_and_state(&input, &state)?.into_update()?;
        approx_eq(mean_stress(&update.state.stress), KB * (-6e-3), 1e-12);
        let props = update.derived.damage()?;
        for k in 0..3 {
            assert_eq!(props.positive_principal_strains[k], 0.0);
        }
    }

    // fully damaged material keeps only the residual deviatoric stiffness
    input.set_damage(1.0);
    let update = material.actual.compute_stress_and_state(&input, &state)?.into_update()?;
    approx_eq(update.state.stress.get(0, 0), KB * (-6e-3) + 1e-6 * 2.0 * mu * 1e-3, 1e-12);

    // tension: the whole stress is degraded
    let strain = diagonal_strain(2e-3, 1e-3, 1.5e-3);
    input.set_strain(&strain).set_damage(0.0);
    let intact = material.actual.compute_stress_and_state(&input, &state)?.into_update()?;
    input.set_damage(0.5);
    let damaged = material.actual.compute_stress_and_state(&input, &state)?.into_update()?;
    let factor = 0.25 + 1e-6;
    for m in 0..6 {
        approx_eq(
            damaged.state.stress.vector()[m],
            factor * intact.state.stress.vector()[m] / (1.0 + 1e-6),
            1e-12,
        );
    }

    // positive energy: G0⁺ = Kb (tr ε)² / 2 + μ dev : dev
    let props = intact.derived.damage()?;
    let tr = 4.5e-3;
    let dev = [2e-3 - tr / 3.0, 1e-3 - tr / 3.0, 1.5e-3 - tr / 3.0];
    let dev_dev = dev[0] * dev[0] + dev[1] * dev[1] + dev[2] * dev[2];
    approx_eq(props.g0_pos, KB * tr * tr / 2.0 + mu * dev_dev, 1e-12);
    Ok(())
}

#[test]
fn test_strain_split_damage_derivative() -> Result<(), StrError> {
    let param = ParamMaterial::StrainSplitDamage(SampleParams::param_strain_split_damage());
    let material = Material::new(&param, None)?;
    let state = material.new_state()?;

    // mixed strain: one negative principal value
    let mut strain = diagonal_strain(2e-3, -0.5e-3, 0.3e-3);
    strain.sym_set(0, 1, 0.4e-3);
    let mut input = PointInput::new();
    input.set_strain(&strain).set_damage(0.3);
    let update = material.actual.compute_stress_and_state(&input, &state)?.into_update()?;
    let props = update.derived.damage()?;

    // ∂σ/∂c
    struct Args {
        input: PointInput,
        i: usize,
        j: usize,
    }
    let mut args = Args {
        input: input.clone(),
        i: 0,
        j: 0,
    };
    for (i, j) in [(0, 0), (1, 1), (2, 2), (0, 1)] {
        args.i = i;
        args.j = j;
        let num = deriv1_central5(0.3, &mut args, |c, a| {
            a.input.set_damage(c);
            let up = material.actual.compute_stress_and_state(&a.input, &state)?.into_update()?;
            Ok(up.state.stress.get(a.i, a.j))
        })?;
        approx_eq(props.dstress_ddamage.get(i, j), num, 1e-10);
    }
    Ok(())
}
