//! Bindings between the scene control panel and the renderer configuration.
//!
//! A [`BindingTable`] lists every control of the panel; [`bind`] validates it
//! against a [`ControlSurface`] and returns a [`ControlBinder`] that writes
//! control values into a shared [`ConfigStore`]. The renderer is kept outside
//! of the crate and reads the store through snapshots.

pub mod binder;
pub mod binding;
pub mod config;
pub mod store;
pub mod surface;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use binder::{bind, parse_number, BindError, ControlBinder, ControlEvent, Outcome, Rejection};
pub use binding::{
    Axis, BindingSpec, BindingTable, Channel, Coefficient, FieldPath, Guard, LightField,
    ModelField, Transform, Trigger,
};
pub use config::{LightConfig, ModelConfig, SceneConfig, SLOT_COUNT};
pub use store::ConfigStore;
pub use surface::{ControlSurface, MemorySurface};
