pub mod controller;
pub mod core;

pub use controller::{EngineController, SensorHandle};
pub use core::{DashboardSnapshot, Engine, EngineEvent, EngineState, SensorEvent};
