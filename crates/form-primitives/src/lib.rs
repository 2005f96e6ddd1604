//! Interaction primitives the flow controller composes: text entry, option
//! selection and button clicks, each with bounded waits and settle pauses.

mod actor;
pub mod redact;

pub use actor::{ActorOpts, FormActor};
