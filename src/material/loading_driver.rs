use super::tensor_algebra::t2_sym_part;
use super::{Material, Outcome, PointInput, PointUpdate, StateBuffer};
use crate::StrError;
use russell_tensor::{t2_add, Mandel, Tensor2};

/// Default maximum number of cutbacks per path segment
const DEFAULT_MAX_CUTBACKS: usize = 10;

/// Holds the results at the end of a path segment
#[derive(Clone, Debug)]
pub struct LoadingRecord {
    /// Holds the time at the end of the segment
    pub time: f64,

    /// Holds the deformation gradient at the end of the segment
    pub deformation_gradient: Tensor2,

    /// Holds the number of cutbacks within the segment
    pub n_cutback: usize,

    /// Holds the results of the last converged update
    pub update: PointUpdate,
}

/// Drives a single material point through a prescribed deformation path
///
/// Each segment of the path is first attempted in one increment. When the model requests
/// a cutback, the increment is halved and the trial state is discarded; converged increments
/// are committed.
///
/// The (small) strain given to the model is ε = sym(F) - I.
pub struct LoadingDriver<'a> {
    /// Holds the material model
    material: &'a Material,

    /// Holds the maximum number of cutbacks per segment
    max_cutbacks: usize,
}

impl<'a> LoadingDriver<'a> {
    /// Allocates a new instance
    pub fn new(material: &'a Material) -> Self {
        LoadingDriver {
            material,
            max_cutbacks: DEFAULT_MAX_CUTBACKS,
        }
    }

    /// Sets the maximum number of cutbacks per segment
    pub fn set_max_cutbacks(&mut self, value: usize) -> &mut Self {
        self.max_cutbacks = value;
        self
    }

    /// Runs the path
    ///
    /// # Input
    ///
    /// * `path` -- deformation gradients (general tensors) at the end of each segment
    /// * `dt` -- time increment of each segment
    /// * `template` -- input data used by all increments; its `deformation_gradient` is the starting point
    pub fn run(&self, path: &[Tensor2], dt: f64, template: &PointInput) -> Result<Vec<LoadingRecord>, StrError> {
        if dt <= 0.0 {
            return Err("dt must be positive");
        }
        if template.deformation_gradient.mandel() != Mandel::General || path.iter().any(|ff| ff.mandel() != Mandel::General) {
            return Err("deformation gradients must use the general representation");
        }
        let mut buffer = StateBuffer::new(self.material.new_state()?);
        let mut input = template.clone();
        let mut ff_current = template.deformation_gradient.clone();
        let ii = Tensor2::identity(Mandel::Symmetric);
        let mut ff = Tensor2::new(Mandel::General);
        let mut time = 0.0;
        let mut records = Vec::with_capacity(path.len());
        for ff_target in path {
            let ff_begin = ff_current.clone();
            let mut done = 0.0;
            let mut fraction = 1.0;
            let mut n_cutback = 0;
            let mut last = None;
            while done < 1.0 {
                let next = f64::min(done + fraction, 1.0);
                t2_add(&mut ff, 1.0 - next, &ff_begin, next, ff_target);
                let mut eps = t2_sym_part(&ff);
                eps.update(-1.0, &ii);
                input.set_deformation_gradients(&ff, &ff_current);
                input.set_strain(&eps);
                input.set_dt(dt * (next - done));
                match self.material.actual.compute_stress_and_state(&input, &buffer.old)? {
                    Outcome::Converged(update) => {
                        buffer.set_current(update.state.clone());
                        buffer.commit();
                        ff_current.set_tensor(1.0, &ff);
                        time += dt * (next - done);
                        done = next;
                        last = Some(update);
                    }
                    Outcome::Cutback(_) => {
                        buffer.reset();
                        n_cutback += 1;
                        if n_cutback > self.max_cutbacks {
                            return Err("maximum number of cutbacks reached");
                        }
                        fraction /= 2.0;
                    }
                }
            }
            match last {
                Some(update) => records.push(LoadingRecord {
                    time,
                    deformation_gradient: ff_current.clone(),
                    n_cutback,
                    update,
                }),
                None => return Err("path segment did not produce any update"),
            }
        }
        Ok(records)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::LoadingDriver;
    use crate::base::{ParamMaterial, SampleParams};
    use crate::material::{Material, PointInput, CP_W0P};
    use russell_lab::approx_eq;
    use russell_tensor::{Mandel, Tensor2};

    fn stretch_x(e: f64) -> Tensor2 {
        Tensor2::from_matrix(&[[1.0 + e, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], Mandel::General).unwrap()
    }

    #[test]
    fn run_works_for_small_strain_model() {
        let param = ParamMaterial::StrainSplitDamage(SampleParams::param_strain_split_damage());
        let material = Material::new(&param, None).unwrap();
        let driver = LoadingDriver::new(&material);
        let path = [stretch_x(0.001), stretch_x(0.002)];
        let records = driver.run(&path, 0.5, &PointInput::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].time, 1.0);
        assert_eq!(records[1].n_cutback, 0);
        let s0 = records[0].update.state.stress.get(0, 0);
        let s1 = records[1].update.state.stress.get(0, 0);
        assert!(s1 > s0 && s0 > 0.0);
    }

    #[test]
    fn run_cuts_the_step_back() {
        let mut p = SampleParams::param_crystal_plasticity_fcc();
        p.flow_rate.a0 = 1e-4;
        p.flow_rate.xm = 1.0;
        p.solver.slip_incr_tol = 2e-5;
        let param = ParamMaterial::CrystalPlasticity(p);
        let material = Material::new(&param, None).unwrap();
        let driver = LoadingDriver::new(&material);
        let records = driver.run(&[stretch_x(2e-3)], 1.0, &PointInput::new()).unwrap();
        assert!(records[0].n_cutback >= 1);
        assert!(records[0].update.state.internal_values[CP_W0P] > 0.0);
        approx_eq(records[0].deformation_gradient.get(0, 0), 1.002, 1e-15);

        let mut driver = LoadingDriver::new(&material);
        driver.set_max_cutbacks(0);
        assert_eq!(
            driver.run(&[stretch_x(2e-3)], 1.0, &PointInput::new()).err(),
            Some("maximum number of cutbacks reached")
        );
    }

    #[test]
    fn run_captures_errors() {
        let param = ParamMaterial::StrainSplitDamage(SampleParams::param_strain_split_damage());
        let material = Material::new(&param, None).unwrap();
        let driver = LoadingDriver::new(&material);
        assert_eq!(
            driver.run(&[stretch_x(0.001)], 0.0, &PointInput::new()).err(),
            Some("dt must be positive")
        );
        assert_eq!(
            driver
                .run(&[Tensor2::new(Mandel::Symmetric)], 1.0, &PointInput::new())
                .err(),
            Some("deformation gradients must use the general representation")
        );
    }
}
