use clap::Parser;

/// Interactive scenario editor for the SPE analysis service.
///
/// Places agents and accounts by coordinate, edits their schedules and
/// sends the scenario to the analysis service for embedding, simulation,
/// heatmaps and similarity search.
#[derive(Parser, Debug)]
#[command(name = "spe-cli", about = "Interactive SPE scenario editor")]
pub struct CliArgs {
    /// Analysis service base URL (overrides SPE_API_URL)
    #[arg(long)]
    pub server: Option<String>,

    /// Config profile; keys are read as {PROFILE}_{KEY} before {KEY}
    #[arg(long, env = "SPE_PROFILE")]
    pub profile: Option<String>,

    /// Per-request timeout in milliseconds (overrides SPE_REQUEST_TIMEOUT_MS)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Name carried on outbound scenarios (overrides SPE_SCENARIO_NAME)
    #[arg(long)]
    pub scenario_name: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
