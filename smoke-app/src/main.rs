use anyhow::Result;
use smoke_common::observability::{LogConfig, LogFormat, init_logging_or_stderr};
use smoke_config::{DEFAULT_CONFIG_FILE, SmokeConfig, SmokeConfigLoader, credential_hints};
use smoke_probes::ProbeSuite;
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<()> {
    // A broken log directory only loses the file sink; the probes still run.
    let log_path = init_logging_or_stderr(LogConfig {
        format: LogFormat::parse(&std::env::var("SMOKE_LOG_FORMAT").unwrap_or_default()),
        ..LogConfig::default()
    });

    // Env wins over smoke.yaml; both are optional.
    let cfg: SmokeConfig = SmokeConfigLoader::new()
        .with_file(DEFAULT_CONFIG_FILE)
        .load()?;
    tracing::info!(
        log_path = ?log_path,
        env_file = %cfg.env_file.display(),
        timeout_secs = cfg.timeout_secs,
        credentials = ?cfg.credentials,
        "smoke.start"
    );

    let suite = ProbeSuite::from_config(&cfg);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = suite.run(&mut out).await?;
    summary.render(
        &mut out,
        &credential_hints(),
        &cfg.env_file.display().to_string(),
    )?;
    out.flush()?;

    // Outcome is reported in text only; the exit status stays 0.
    Ok(())
}
