mod angle;
pub use angle::*;
mod animation;
pub use animation::*;
mod camera;
pub use camera::*;
mod config;
pub use config::*;
mod controller;
pub use controller::*;
mod direction;
pub use direction::*;
mod facing;
pub use facing::*;
mod host;
pub use host::*;
mod input;
pub use input::*;
mod state;
pub use state::*;
mod timing;
pub use timing::*;

mod character_controller;
pub use character_controller::*;
mod input_plugin;
pub use input_plugin::*;
