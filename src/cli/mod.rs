//! CLI argument parsing and run orchestration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use docbench_client::{ClientConfig, HttpProcessClient, SubmitMode};
use docbench_core::{DurationPolicy, LoadControllerBuilder, LoadTestConfig, RunReport};
use docbench_corpus::{prepare_staging_area, SyntheticCorpus};
use docbench_report::{ConsoleSummary, CsvExporter, JsonExporter, RunParameters};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

/// docbench - load generator for document-processing services
#[derive(Parser, Debug)]
#[command(name = "docbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the service under test
    #[arg(short, long, env = "DOCBENCH_URL", default_value = "http://localhost:8080")]
    pub url: String,

    /// Concurrent sessions [default: 5]
    #[arg(short, long, env = "DOCBENCH_CONCURRENT")]
    pub concurrent: Option<usize>,

    /// Batches per session [default: 10]
    #[arg(short, long, env = "DOCBENCH_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Test duration, bare seconds or humantime ("90s", "2m") [default: 60s]
    #[arg(short, long, env = "DOCBENCH_DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Stop the run once the duration elapses
    #[arg(long, env = "DOCBENCH_ENFORCE_DURATION")]
    pub enforce_duration: bool,

    /// Times the corpus is repeated inside each batch [default: 2]
    #[arg(long, env = "DOCBENCH_REPEAT")]
    pub repeat: Option<usize>,

    /// Document size classes in KB
    #[arg(long, env = "DOCBENCH_SIZES", value_delimiter = ',', default_value = "1,5,10,25,50")]
    pub sizes: Vec<u32>,

    /// Maximum requests in flight across all sessions [default: 1024]
    #[arg(long, env = "DOCBENCH_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Run-wide request rate limit (requests/second)
    #[arg(long, env = "DOCBENCH_RATE_LIMIT")]
    pub rate_limit: Option<f64>,

    /// How documents are submitted (multipart, file-content, file-path)
    #[arg(long, env = "DOCBENCH_SUBMIT_MODE", default_value = "multipart")]
    pub submit_mode: SubmitMode,

    /// Directory test documents are staged in
    #[arg(long, env = "DOCBENCH_STAGING_DIR", default_value = "data")]
    pub staging_dir: PathBuf,

    /// Directory results are written to
    #[arg(long, env = "DOCBENCH_OUTPUT_DIR", default_value = "data")]
    pub output_dir: PathBuf,

    /// Seed for reproducible documents
    #[arg(long, env = "DOCBENCH_SEED")]
    pub seed: Option<u64>,

    /// Per-request timeout
    #[arg(long, env = "DOCBENCH_REQUEST_TIMEOUT", value_parser = parse_duration, default_value = "300s")]
    pub request_timeout: Duration,

    /// Also write the summary statistics as JSON
    #[arg(long, env = "DOCBENCH_JSON")]
    pub json: bool,

    /// Skip the pre-flight health check
    #[arg(long, env = "DOCBENCH_SKIP_HEALTH_CHECK")]
    pub skip_health_check: bool,

    /// Base load test configuration (JSON); flags override its values
    #[arg(long, env = "DOCBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse bare seconds or a humantime duration
fn parse_duration(value: &str) -> Result<Duration, String> {
    if let Ok(secs) = value.trim().parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Resolve the load test configuration: config file first, then flags
    pub fn load_config(&self) -> Result<LoadTestConfig> {
        let mut config = match &self.config {
            Some(path) => LoadTestConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => LoadTestConfig::default(),
        };

        if let Some(sessions) = self.concurrent {
            config.num_concurrent = sessions;
        }
        if let Some(batches) = self.batch_size {
            config.batches_per_session = batches;
        }
        if let Some(repeat) = self.repeat {
            config.corpus_repeat = repeat;
        }
        if let Some(max) = self.max_in_flight {
            config.max_in_flight = max;
        }
        if let Some(rps) = self.rate_limit {
            config.rate_limit = Some(rps);
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if self.enforce_duration {
            config.duration_policy = DurationPolicy::Enforced;
        }

        config
            .validate()
            .context("Invalid load test configuration")?;
        Ok(config)
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.url.clone())
            .with_submit_mode(self.submit_mode)
            .with_request_timeout(self.request_timeout)
    }

    fn corpus(&self) -> SyntheticCorpus {
        let corpus = SyntheticCorpus::new(&self.staging_dir).with_size_classes(self.sizes.clone());
        match self.seed {
            Some(seed) => corpus.with_seed(seed),
            None => corpus,
        }
    }

    /// Run the load test
    ///
    /// Setup failures (bad configuration, staging area, health check) are
    /// returned as errors. A run in which every request failed still
    /// succeeds and reports that no data was collected.
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        let client = HttpProcessClient::new(self.client_config())
            .context("Invalid client configuration")?;

        prepare_staging_area(&self.staging_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create staging area: {}",
                    self.staging_dir.display()
                )
            })?;

        self.print_banner(&config);
        let params = RunParameters::from_config(&config, self.sizes.len());

        let progress = progress_bar(config.total_requests(self.sizes.len()));
        let controller = LoadControllerBuilder::new()
            .config(config)
            .client(Arc::new(client))
            .corpus(Arc::new(self.corpus()))
            .progress(progress)
            .build()
            .context("Failed to set up load test")?;

        if self.skip_health_check {
            warn!("Skipping pre-flight health check");
        } else {
            controller.preflight().await?;
        }

        let report = controller
            .run_with_signal_handling()
            .await
            .context("Load test failed")?;

        if report.interrupted {
            warn!("Run was interrupted; reporting partial results");
        }

        self.export(&report, &params)
    }

    fn export(&self, report: &RunReport, params: &RunParameters) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        let csv_path = CsvExporter::export_new(report.records(), &self.output_dir)
            .with_context(|| {
                format!("Failed to export CSV into: {}", self.output_dir.display())
            })?;

        let totals = report.totals();
        match report.summary() {
            Ok(summary) => {
                ConsoleSummary::print(&summary, &totals, params);
                if self.json {
                    let json_path = csv_path.with_extension("json");
                    JsonExporter::export_summary(&summary, &totals, &json_path).with_context(
                        || format!("Failed to export JSON to: {}", json_path.display()),
                    )?;
                }
            }
            Err(e) if e.is_no_data() => {
                warn!(failed = totals.failed, "No data collected");
                ConsoleSummary::print_no_data(&totals, params);
            }
            Err(e) => return Err(e.into()),
        }

        println!("Results saved to: {}", csv_path.display());
        Ok(())
    }

    fn print_banner(&self, config: &LoadTestConfig) {
        info!("Starting document processing load test");
        println!("\n{}", "=".repeat(60));
        println!("   docbench - document processing load test");
        println!("{}", "=".repeat(60));
        println!("  Target:        {}", self.url);
        println!("  Sessions:      {}", config.num_concurrent);
        println!("  Batches:       {}", config.batches_per_session);
        println!("  Sizes (KB):    {:?}", self.sizes);
        println!("  Repeat:        {}", config.corpus_repeat);
        println!(
            "  Duration:      {:?} ({:?})",
            config.duration, config.duration_policy
        );
        println!("  Submit mode:   {}", self.submit_mode);
        println!(
            "  Requests:      {}",
            config.total_requests(self.sizes.len())
        );
        println!("{}\n", "=".repeat(60));
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}
