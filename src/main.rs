use dotenvy::dotenv;
use prompt_fn::bootstrap::ensure_models_present;
use prompt_fn::config::{BackendKind, Command, Config};
use prompt_fn::{demos, LatencySummary, PromptFunction};
use std::io::{self, Write};
use tracing_subscriber::{fmt, EnvFilter};


fn main() -> anyhow::Result<()> {
dotenv().ok();
let cfg = <Config as clap::Parser>::parse();


// logs go to stderr, tables to stdout
let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
fmt().with_env_filter(filter).with_writer(io::stderr).init();


// every demo needs the model files before anything loads
if cfg.command == Command::Fetch || cfg.backend == BackendKind::Local {
let report = ensure_models_present(&cfg.models_dir, &cfg.fetcher())?;
tracing::info!(fetched = report.fetched.len(), "bootstrap done");
}


let base = cfg.prompt_config();
let stdout = io::stdout();
let mut out = stdout.lock();
let make = |instruction: &str, config: &prompt_fn::PromptConfig, selector: usize| -> anyhow::Result<_> {
let backend = cfg.open_backend(selector, config)?;
Ok(PromptFunction::with_backend(instruction, backend, config)?)
};


let summary = match cfg.command {
Command::Fetch => return Ok(()),
Command::Countries { model } => demos::countries(|i, c| make(i, c, model), &base, &mut out)?,
Command::Categories { model } => demos::categories(|i, c| make(i, c, model), &base, &mut out)?,
Command::Extract { model } => demos::extract(|i, c| make(i, c, model), &base, &mut out)?,
Command::Chat { model } => demos::chat(|| cfg.open_backend(model, &base), &mut out)?,
};
report(&summary, &mut out)?;
Ok(())
}


fn report(summary: &LatencySummary, out: &mut dyn Write) -> io::Result<()> {
writeln!(out)?;
writeln!(out, "Latency: {}", summary)
}
