//! Prompt functions: a fixed instruction bound to a loaded language model,
//! called like a function on varying input.

pub mod bootstrap;
pub mod chat;
pub mod config;
pub mod demos;
pub mod error;
pub mod model;
pub mod prompt;
pub mod template;
pub mod timing;
pub mod util;

pub use error::{BootstrapError, PromptError, Result};
pub use model::{InferParams, LlmBackend, PromptParts};
pub use prompt::{PromptConfig, PromptFunction};
pub use template::{SlotOrder, Template};
pub use timing::{timed, timer, LatencySummary, Timer};
