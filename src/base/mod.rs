//! Implements the base structures: parameters, constants, and grain data services

mod constants;
mod euler_angles;
mod grain_tracker;
mod parameters;
mod sample_params;
pub use crate::base::constants::*;
pub use crate::base::euler_angles::*;
pub use crate::base::grain_tracker::*;
pub use crate::base::parameters::*;
pub use crate::base::sample_params::*;
