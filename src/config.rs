use crate::bootstrap::CommandFetcher;
use crate::model::openai::{OpenAiBackend, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::model::LlmBackend;
use crate::prompt::PromptConfig;
use crate::template::SlotOrder;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "prompt-fn", version, about = "Prompt functions over local GGUF models")]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,
    /// Directory holding the GGUF files
    #[arg(long, env, default_value = ".", global = true)]
    pub models_dir: PathBuf,
    /// Place the input before the instruction in every prompt
    #[arg(long, env = "PROMPT_INPUT_FIRST", global = true)]
    pub input_first: bool,
    #[arg(long, env, default_value_t = 256, global = true)]
    pub n_ctx: u32,
    /// 0 uses every core
    #[arg(long, env, default_value_t = 2, global = true)]
    pub n_threads: i32,
    #[arg(long, env, default_value_t = 0, global = true)]
    pub n_gpu_layers: u32,
    /// Let llama.cpp log through tracing
    #[arg(long, env, global = true)]
    pub verbose_model: bool,
    #[arg(long, env, global = true)]
    pub seed: Option<u32>,
    /// Download program, called with wget's flags
    #[arg(long, env, default_value = "wget", global = true)]
    pub fetch_tool: String,
    #[arg(long, env = "PROMPT_BACKEND", value_enum, default_value_t = BackendKind::Local, global = true)]
    pub backend: BackendKind,
    #[arg(long, env, default_value = DEFAULT_MODEL, global = true)]
    pub openai_model: String,
    #[arg(long, env, default_value = DEFAULT_BASE_URL, global = true)]
    pub openai_base_url: String,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Download any missing catalog model
    Fetch,
    /// Which country each city is in
    Countries {
        #[arg(default_value_t = 0)]
        model: usize,
    },
    /// Categorise merchant names
    Categories {
        #[arg(default_value_t = 0)]
        model: usize,
    },
    /// Pull a person's name and a date out of sentences
    Extract {
        #[arg(default_value_t = 0)]
        model: usize,
    },
    /// Free-form questions, natural vs structured phrasing
    Chat {
        #[arg(default_value_t = 0)]
        model: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Openai,
}

impl Config {
    pub fn slot_order(&self) -> SlotOrder {
        if self.input_first {
            SlotOrder::InputFirst
        } else {
            SlotOrder::InstructionFirst
        }
    }

    pub fn prompt_config(&self) -> PromptConfig {
        PromptConfig {
            models_dir: self.models_dir.clone(),
            slot_order: self.slot_order(),
            #[cfg(feature = "llama")]
            load: crate::model::llama::LoadParams {
                n_ctx: self.n_ctx,
                n_threads: self.n_threads,
                n_gpu_layers: self.n_gpu_layers,
                verbose: self.verbose_model,
                seed: self.seed,
            },
            ..PromptConfig::default()
        }
    }

    pub fn fetcher(&self) -> CommandFetcher {
        CommandFetcher::named(self.fetch_tool.clone())
    }

    /// Open the configured backend. For the local backend `selector` picks
    /// the catalog model, which must already be on disk.
    pub fn open_backend(&self, selector: usize, config: &PromptConfig) -> Result<Box<dyn LlmBackend>> {
        match self.backend {
            BackendKind::Local => self.open_local(selector, config),
            BackendKind::Openai => {
                let key = self
                    .openai_api_key
                    .clone()
                    .context("OPENAI_API_KEY is not set")?;
                Ok(Box::new(OpenAiBackend::new(
                    key,
                    self.openai_model.clone(),
                    self.openai_base_url.clone(),
                )?))
            }
        }
    }

    #[cfg(feature = "llama")]
    fn open_local(&self, selector: usize, config: &PromptConfig) -> Result<Box<dyn LlmBackend>> {
        Ok(Box::new(crate::prompt::load_catalog_model(selector, config)?))
    }

    #[cfg(not(feature = "llama"))]
    fn open_local(&self, _selector: usize, _config: &PromptConfig) -> Result<Box<dyn LlmBackend>> {
        anyhow::bail!("built without the `llama` feature; use --backend openai")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_index_defaults_to_zero() {
        let cfg = Config::try_parse_from(["prompt-fn", "categories"]).unwrap();
        assert_eq!(cfg.command, Command::Categories { model: 0 });
        let cfg = Config::try_parse_from(["prompt-fn", "extract", "2"]).unwrap();
        assert_eq!(cfg.command, Command::Extract { model: 2 });
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cfg = Config::try_parse_from([
            "prompt-fn",
            "countries",
            "1",
            "--input-first",
            "--models-dir",
            "/tmp/models",
        ])
        .unwrap();
        assert_eq!(cfg.slot_order(), SlotOrder::InputFirst);
        let pc = cfg.prompt_config();
        assert_eq!(pc.models_dir, PathBuf::from("/tmp/models"));
        assert_eq!(pc.slot_order, SlotOrder::InputFirst);
        assert_eq!(pc.max_tokens, 2);
    }

    #[test]
    fn rejects_non_numeric_selector() {
        assert!(Config::try_parse_from(["prompt-fn", "chat", "big"]).is_err());
    }

    #[cfg(feature = "llama")]
    #[test]
    fn local_backend_reports_model_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let models_dir = dir.path().to_str().unwrap();
        let cfg = Config::try_parse_from(["prompt-fn", "countries", "--backend", "local", "--models-dir", models_dir])
            .unwrap();
        let err = cfg.open_backend(0, &cfg.prompt_config()).err().unwrap();
        assert!(
            matches!(err.downcast_ref::<crate::PromptError>(), Some(crate::PromptError::ModelLoad { .. })),
            "{err:#}"
        );
    }

    #[test]
    fn openai_backend_needs_key() {
        let mut cfg = Config::try_parse_from(["prompt-fn", "countries", "--backend", "openai"]).unwrap();
        cfg.openai_api_key = None;
        let err = cfg.open_backend(0, &cfg.prompt_config()).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
