use super::{Material, Outcome, PointInput, PointUpdate, StateBuffer};
use crate::StrError;
use rayon::prelude::*;

/// Holds the data of a single material point
pub struct MaterialPoint {
    /// Holds the input data (strain, deformation gradient, order parameters, ...)
    pub input: PointInput,

    /// Holds the old and current states
    pub states: StateBuffer,

    /// Holds the results of the last update (`None` after a cutback)
    pub last: Option<PointUpdate>,
}

/// Holds a summary of the update of all points
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateSummary {
    /// Number of points that converged
    pub n_converged: usize,

    /// Number of points that requested a cutback
    pub n_cutback: usize,

    /// Reason of the first cutback (lowest point index)
    pub first_cutback_reason: Option<StrError>,
}

/// Holds a collection of material points sharing the same model
///
/// The points are independent; thus, they may be updated in parallel. A cutback request
/// at one point does not stop the others; the host decides what to do from the summary.
pub struct MaterialPoints<'a> {
    /// Holds the material model
    material: &'a Material,

    /// Holds all points
    pub all: Vec<MaterialPoint>,
}

impl MaterialPoint {
    /// Updates the point and stores the new state as the current state
    ///
    /// Returns the cutback reason if the local solve did not converge.
    fn update(&mut self, material: &Material) -> Result<Option<StrError>, StrError> {
        match material.actual.compute_stress_and_state(&self.input, &self.states.old)? {
            Outcome::Converged(update) => {
                self.states.set_current(update.state.clone());
                self.last = Some(update);
                Ok(None)
            }
            Outcome::Cutback(cutback) => {
                self.states.reset();
                self.last = None;
                Ok(Some(cutback.reason))
            }
        }
    }
}

impl<'a> MaterialPoints<'a> {
    /// Allocates a new instance with one point per input
    pub fn new(material: &'a Material, inputs: Vec<PointInput>) -> Result<Self, StrError> {
        let res: Result<Vec<_>, _> = inputs
            .into_iter()
            .map(|input| {
                let state = material.new_state()?;
                Ok(MaterialPoint {
                    input,
                    states: StateBuffer::new(state),
                    last: None,
                })
            })
            .collect();
        Ok(MaterialPoints { material, all: res? })
    }

    /// Updates all points sequentially
    pub fn update(&mut self) -> Result<UpdateSummary, StrError> {
        let material = self.material;
        let results: Result<Vec<_>, _> = self.all.iter_mut().map(|p| p.update(material)).collect();
        Ok(summarize(results?))
    }

    /// Updates all points in parallel
    pub fn update_parallel(&mut self) -> Result<UpdateSummary, StrError> {
        let material = self.material;
        let results: Result<Vec<_>, _> = self.all.par_iter_mut().map(|p| p.update(material)).collect();
        Ok(summarize(results?))
    }

    /// Accepts the current states of all points
    pub fn commit(&mut self) {
        self.all.iter_mut().for_each(|p| p.states.commit());
    }
}

/// Counts the converged points and cutback requests
fn summarize(results: Vec<Option<StrError>>) -> UpdateSummary {
    let mut summary = UpdateSummary::default();
    for res in results {
        match res {
            None => summary.n_converged += 1,
            Some(reason) => {
                summary.n_cutback += 1;
                if summary.first_cutback_reason.is_none() {
                    summary.first_cutback_reason = Some(reason);
                }
            }
        }
    }
    summary
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
