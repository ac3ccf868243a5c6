use crate::error::{PromptError, Result};
use crate::model::{InferParams, LlmBackend, PromptParts};
use crate::template::{Template, CHAT_TURN};

#[derive(Clone, Debug, PartialEq)]
pub struct ChatParams {
    pub max_tokens: i32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self { max_tokens: 1024, temperature: 0.7, top_p: 0.9, top_k: 40 }
    }
}

/// One-shot questions to a model, no fixed instruction. Replies keep their
/// case; each call starts from an empty context.
pub struct Chat<B> {
    template: Template,
    params: InferParams,
    backend: B,
}

impl<B: LlmBackend> Chat<B> {
    pub fn new(backend: B, params: ChatParams) -> Self {
        let template = match Template::from_layout(CHAT_TURN, "") {
            Ok(t) => t,
            Err(_) => unreachable!("chat layout has one input slot"),
        };
        Self {
            template,
            params: InferParams {
                max_tokens: params.max_tokens,
                temp: params.temperature,
                top_p: Some(params.top_p),
                top_k: Some(params.top_k),
                stop: vec!["<|im_end|>".to_string(), "<|endoftext|>".to_string()],
            },
            backend,
        }
    }

    pub fn ask(&self, prompt: &str) -> Result<String> {
        let parts = PromptParts {
            system: String::new(),
            user: prompt.to_string(),
            rendered: self.template.render(prompt),
        };
        let raw = self
            .backend
            .generate(&parts, &self.params)
            .map_err(PromptError::Generation)?;
        Ok(crate::util::truncate_at_stop(&raw, &self.params.stop).trim().to_string())
    }
}
