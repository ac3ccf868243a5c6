//! Prompt functions: an instruction fixed at construction, applied to a new
//! input on every call.

use crate::error::{PromptError, Result};
use crate::model::{InferParams, LlmBackend, PromptParts};
use crate::template::{SlotOrder, Template};
use crate::util::normalize_output;
use std::path::PathBuf;
use tracing::debug;

#[cfg(feature = "llama")]
use crate::model::llama::{LlamaBackend, LoadParams};

pub const DEFAULT_MAX_TOKENS: i32 = 2;
pub const DEFAULT_STOP: &[&str] = &["\n", "<|endoftext|>"];
const WARM_UP_TOKENS: i32 = 1;

#[derive(Clone, Debug)]
pub struct PromptConfig {
    pub models_dir: PathBuf,
    pub slot_order: SlotOrder,
    pub max_tokens: i32,
    pub temperature: f32,
    pub stop: Vec<String>,
    #[cfg(feature = "llama")]
    pub load: LoadParams,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("."),
            slot_order: SlotOrder::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            stop: DEFAULT_STOP.iter().map(|s| s.to_string()).collect(),
            #[cfg(feature = "llama")]
            load: LoadParams::default(),
        }
    }
}

impl PromptConfig {
    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_slot_order(mut self, order: SlotOrder) -> Self {
        self.slot_order = order;
        self
    }
}

/// Maps an input string to the model's answer for one fixed instruction.
///
/// The backend is owned; each instance holds its own loaded model.
pub struct PromptFunction<B> {
    instruction: String,
    template: Template,
    params: InferParams,
    backend: B,
}

/// Load catalog model `selector` from `config.models_dir`. The file must
/// already be on disk.
#[cfg(feature = "llama")]
pub fn load_catalog_model(selector: usize, config: &PromptConfig) -> Result<LlamaBackend> {
    let entry = crate::model::catalog::by_index(selector)?;
    let path = entry.path_in(&config.models_dir);
    LlamaBackend::load(&path, &config.load).map_err(|source| PromptError::ModelLoad { path, source })
}

#[cfg(feature = "llama")]
impl PromptFunction<LlamaBackend> {
    /// Bind `instruction` to catalog model `selector`, see [`load_catalog_model`].
    pub fn load(instruction: &str, selector: usize, config: &PromptConfig) -> Result<Self> {
        let backend = load_catalog_model(selector, config)?;
        Self::with_backend(instruction, backend, config)
    }

    /// Like [`PromptFunction::load`], fetching the model first if it is missing.
    pub fn bootstrap_and_load(
        instruction: &str,
        selector: usize,
        config: &PromptConfig,
        fetcher: &dyn crate::bootstrap::Fetcher,
    ) -> Result<Self> {
        let entry = crate::model::catalog::by_index(selector)?;
        crate::bootstrap::ensure_model_present(&config.models_dir, entry, fetcher)?;
        Self::load(instruction, selector, config)
    }
}

impl<B: LlmBackend> PromptFunction<B> {
    pub fn with_backend(instruction: &str, backend: B, config: &PromptConfig) -> Result<Self> {
        if config.max_tokens <= 0 {
            return Err(PromptError::InvalidBudget(config.max_tokens));
        }
        let instruction = instruction.trim().to_string();
        let template = Template::new(config.slot_order, &instruction);
        let params = InferParams {
            max_tokens: config.max_tokens,
            temp: config.temperature,
            top_p: None,
            top_k: None,
            stop: config.stop.clone(),
        };
        let f = Self { instruction, template, params, backend };

        if f.backend.warms_up() {
            let warm = InferParams { max_tokens: WARM_UP_TOKENS, ..f.params.clone() };
            f.backend
                .generate(&f.parts(""), &warm)
                .map_err(PromptError::Generation)?;
        }
        Ok(f)
    }

    fn parts(&self, input: &str) -> PromptParts {
        PromptParts {
            system: self.instruction.clone(),
            user: input.to_string(),
            rendered: self.template.render(input),
        }
    }

    pub fn invoke(&self, input: &str) -> Result<String> {
        let parts = self.parts(input.trim());
        debug!(prompt = %parts.rendered, "invoke");
        let raw = self
            .backend
            .generate(&parts, &self.params)
            .map_err(PromptError::Generation)?;
        Ok(normalize_output(&raw, &self.params.stop))
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn params(&self) -> &InferParams {
        &self.params
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
