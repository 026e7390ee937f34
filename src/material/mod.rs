//! Implements material models

mod constitutive;
mod crystal_plasticity;
mod loading_driver;
mod local_state;
mod material_points;
mod outcome;
mod point_input;
mod polycrystal_elasticity;
mod slip_systems;
mod state_buffer;
mod strain_split_damage;
pub mod tensor_algebra;
pub use crate::material::constitutive::*;
pub use crate::material::crystal_plasticity::*;
pub use crate::material::loading_driver::*;
pub use crate::material::local_state::*;
pub use crate::material::material_points::*;
pub use crate::material::outcome::*;
pub use crate::material::point_input::*;
pub use crate::material::polycrystal_elasticity::*;
pub use crate::material::slip_systems::*;
pub use crate::material::state_buffer::*;
pub use crate::material::strain_split_damage::*;
