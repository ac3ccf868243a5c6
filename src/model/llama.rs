use super::{InferParams, LlmBackend, PromptParts};
use crate::util::{decode_token_into, stop_offset};
use anyhow::{anyhow, Context, Result};
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend as LLBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::{ggml_time_us, send_logs_to_tracing, LogOptions};
use once_cell::sync::OnceCell;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

// llama.cpp refuses a second backend init per process; every model shares this one.
static BACKEND: OnceCell<LLBackend> = OnceCell::new();

/// Settings for loading a model and creating its per-request contexts.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadParams {
    pub n_ctx: u32,
    /// 0 means all cores.
    pub n_threads: i32,
    pub n_gpu_layers: u32,
    /// Forward llama.cpp's own log lines into tracing.
    pub verbose: bool,
    pub seed: Option<u32>,
}

impl Default for LoadParams {
    fn default() -> Self {
        Self { n_ctx: 256, n_threads: 2, n_gpu_layers: 0, verbose: false, seed: None }
    }
}

fn shared_backend(verbose: bool) -> Result<&'static LLBackend> {
    BACKEND.get_or_try_init(|| {
        // the log callback is process-wide, so the first load decides verbosity
        send_logs_to_tracing(LogOptions::default().with_logs_enabled(verbose));
        LLBackend::init().context("init llama backend")
    })
}

pub struct LlamaBackend {
    backend: &'static LLBackend,
    model: LlamaModel,
    n_ctx: u32,
    n_threads: i32,
    seed: u32,
}

impl LlamaBackend {
    pub fn load(model_path: &Path, params: &LoadParams) -> Result<Self> {
        if !model_path.is_file() {
            return Err(anyhow!("model file {} not found", model_path.display()));
        }
        let backend = shared_backend(params.verbose)?;

        let mut model_params = LlamaModelParams::default();
        if params.n_gpu_layers > 0 {
            model_params = model_params.with_n_gpu_layers(params.n_gpu_layers);
        }

        let t0 = ggml_time_us();
        let model = LlamaModel::load_from_file(backend, model_path, &model_params)
            .with_context(|| format!("load GGUF model {}", model_path.display()))?;
        info!(
            path = %model_path.display(),
            ms = (ggml_time_us() - t0) / 1000,
            "model loaded"
        );

        let n_threads = if params.n_threads > 0 { params.n_threads } else { num_cpus::get() as i32 };

        Ok(Self {
            backend,
            model,
            n_ctx: params.n_ctx,
            n_threads,
            seed: params.seed.unwrap_or_else(rand::random),
        })
    }

    fn sampler(&self, p: &InferParams) -> LlamaSampler {
        if p.temp <= 0.0 {
            return LlamaSampler::greedy();
        }
        let mut samplers = Vec::with_capacity(4);
        if let Some(k) = p.top_k {
            samplers.push(LlamaSampler::top_k(k));
        }
        if let Some(top_p) = p.top_p {
            samplers.push(LlamaSampler::top_p(top_p, 1));
        }
        samplers.push(LlamaSampler::temp(p.temp));
        samplers.push(LlamaSampler::dist(self.seed));
        LlamaSampler::chain_simple(samplers)
    }
}

impl LlmBackend for LlamaBackend {
    fn generate(&self, prompt: &PromptParts, p: &InferParams) -> Result<String> {
        if p.max_tokens <= 0 {
            return Err(anyhow!("token budget must be positive, got {}", p.max_tokens));
        }

        // Fresh context per request: no state carries over between calls.
        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(self.n_ctx))
            .with_n_threads(self.n_threads)
            .with_n_threads_batch(self.n_threads);

        let mut ctx = self
            .model
            .new_context(self.backend, ctx_params)
            .context("create llama context")?;

        let tokens_list = self
            .model
            .str_to_token(&prompt.rendered, AddBos::Always)
            .with_context(|| format!("tokenize prompt: {:?}", prompt.rendered))?;

        let n_ctx = ctx.n_ctx() as i32;
        let n_prompt = tokens_list.len() as i32;
        let max_new = p.max_tokens.min(n_ctx - n_prompt);
        if max_new <= 0 {
            return Err(anyhow!(
                "prompt of {} tokens leaves no room in a {} token context",
                n_prompt,
                n_ctx
            ));
        }

        let mut batch = LlamaBatch::new(n_ctx as usize, 1);
        let last_index = n_prompt - 1;
        for (i, token) in (0_i32..).zip(tokens_list.into_iter()) {
            batch.add(token, i, &[0], i == last_index)?;
        }
        ctx.decode(&mut batch).context("decode prompt")?;

        let mut sampler = self.sampler(p);

        let mut n_cur = batch.n_tokens();
        let mut n_decode = 0;
        let t_main_start = ggml_time_us();

        let mut out = String::new();
        let mut decoder = encoding_rs::UTF_8.new_decoder();

        while n_decode < max_new {
            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            sampler.accept(token);

            if self.model.is_eog_token(token) {
                break;
            }

            let output_bytes = self.model.token_to_bytes(token, Special::Tokenize)?;
            decode_token_into(&mut decoder, &output_bytes, &mut out);
            n_decode += 1;

            if let Some(i) = stop_offset(&out, &p.stop) {
                out.truncate(i);
                break;
            }
            if n_decode >= max_new {
                break;
            }

            batch.clear();
            batch.add(token, n_cur, &[0], true)?;
            n_cur += 1;
            ctx.decode(&mut batch).context("decode step")?;
        }

        let duration = Duration::from_micros((ggml_time_us() - t_main_start) as u64);
        debug!(tokens = n_decode, ?duration, "generated");

        Ok(out)
    }
}
