//! Makes available common structures needed to evaluate the material models
//!
//! You may write `use pfmat::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{EulerAngles, GrainDataProvider, GrainId, GrainTracker, SampleParams};
pub use crate::base::{
    ParamCrystalPlasticity, ParamCubicElasticity, ParamFlowRate, ParamHardening, ParamLocalSolver, ParamMaterial,
    ParamPolycrystal, ParamStrainSplitDamage, TangentKind,
};
pub use crate::material::{ConstitutiveModel, CrystalPlasticity, Material, PolycrystalElasticity, StrainSplitDamage};
pub use crate::material::GrainServices;
pub use crate::material::{DerivedProperties, LocalState, Outcome, PointInput, PointUpdate};
pub use crate::material::{LoadingDriver, LoadingRecord, MaterialPoints, StateBuffer, UpdateSummary};
