#![doc = include_str!("../README.md")]

extern crate self as signal_state;

pub mod core;
mod effect_fn;
mod signal;
#[path = "signal_state.rs"]
mod signal_state_impl;
mod state;
mod subscription;

pub use crate::core::{spawn_action, ActionContext, SignalContext};
pub use effect_fn::effect;
pub use signal::{Signal, SignalNode, ToSignal};
pub use signal_state_impl::{
    Connections, Field, FieldCells, FieldSet, Patch, Producers, Result, SignalState,
    SignalStateError, StateFields,
};
pub use signal_state_macros::StateFields;
pub use state::State;
pub use subscription::Subscription;
