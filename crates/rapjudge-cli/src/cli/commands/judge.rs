use std::sync::Arc;

use anyhow::Context;
use rapjudge_core::{
    load_config, Engine, EngineConfig, FakeScorer, HttpScorer, MemoryRecordStore, Scorer,
    TranscriptBuffer, TranscriptEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::output;
use crate::cli::args::{Cli, OutputFormat};
use crate::exit_codes;

pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    if cli.list_judges {
        print!("{}", output::render_judges(&config));
        return Ok(exit_codes::SUCCESS);
    }

    let text = match read_input(&cli).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("input error: {e:#}");
            return Ok(exit_codes::EVALUATION_FAILED);
        }
    };
    if text.is_empty() {
        eprintln!("nothing to judge: input is empty");
        return Ok(exit_codes::EVALUATION_FAILED);
    }

    let scorer: Arc<dyn Scorer> = if cli.offline {
        Arc::new(FakeScorer::offline())
    } else {
        Arc::new(HttpScorer::new().context("failed to build HTTP client")?)
    };
    info!(
        judges = config.judges.len(),
        offline = cli.offline,
        chars = text.len(),
        "judging verse"
    );
    let engine = Engine::new(config, scorer);

    let (saved, evaluation) = if cli.record {
        let store = MemoryRecordStore::new();
        match engine.evaluate_and_record(&text, &store).await {
            Ok((saved, evaluation)) => (Some(saved), evaluation),
            Err(e) => {
                eprintln!("evaluation failed: {e}");
                return Ok(exit_codes::EVALUATION_FAILED);
            }
        }
    } else {
        match engine.evaluate(&text).await {
            Ok(evaluation) => (None, evaluation),
            Err(e) => {
                eprintln!("evaluation failed: {e}");
                return Ok(exit_codes::EVALUATION_FAILED);
            }
        }
    };

    match cli.format {
        OutputFormat::Text => print!("{}", output::render_text(&evaluation, saved.as_ref())),
        OutputFormat::Json => println!("{}", output::render_json(&evaluation, saved.as_ref())?),
    }
    Ok(exit_codes::SUCCESS)
}

fn resolve_config(cli: &Cli) -> Result<EngineConfig, rapjudge_core::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading panel config");
            load_config(path)?
        }
        None => EngineConfig::from_env()?,
    };
    if let Some(secs) = cli.timeout {
        config = config.with_timeout_secs(secs);
    }
    if let Some(retries) = cli.retries {
        config = config.with_retries(retries);
    }
    Ok(config)
}

async fn read_input(cli: &Cli) -> anyhow::Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.trim().to_string());
    }
    if let Some(path) = &cli.file {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(transcript_from_lines(raw.lines()));
    }

    let mut buffer = TranscriptBuffer::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if !line.is_empty() {
            buffer.apply(TranscriptEvent::Committed(line.to_string()));
        }
    }
    Ok(buffer.committed().to_string())
}

/// Each non-blank line is one committed transcript segment.
fn transcript_from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut buffer = TranscriptBuffer::new();
    for line in lines.map(str::trim).filter(|l| !l.is_empty()) {
        buffer.apply(TranscriptEvent::Committed(line.to_string()));
    }
    buffer.committed().to_string()
}
