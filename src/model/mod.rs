use anyhow::Result;


#[derive(Clone, Debug, PartialEq)]
pub struct InferParams {
pub max_tokens: i32,
pub temp: f32,
pub top_p: Option<f32>,
pub top_k: Option<i32>,
pub stop: Vec<String>,
}


/// The pieces of one request. `rendered` is the full templated prompt for
/// raw-completion backends; chat backends use `system` and `user` directly.
#[derive(Clone, Debug)]
pub struct PromptParts {
pub system: String,
pub user: String,
pub rendered: String,
}


pub trait LlmBackend {
fn generate(&self, prompt: &PromptParts, params: &InferParams) -> Result<String>;

/// Whether a throwaway call after construction is worth making.
fn warms_up(&self) -> bool {
true
}
}


impl<B: LlmBackend + ?Sized> LlmBackend for Box<B> {
fn generate(&self, prompt: &PromptParts, params: &InferParams) -> Result<String> {
(**self).generate(prompt, params)
}

fn warms_up(&self) -> bool {
(**self).warms_up()
}
}


pub mod catalog;
#[cfg(feature = "llama")]
pub mod llama;
pub mod openai;
