use clap::Parser;
use std::path::PathBuf;

// CLI argument structure - every flag can also come from the environment (or .env)
#[derive(Parser, Debug, Clone)]
#[command(name = "portfolio-gateway")]
#[command(about = "Rate-limited \"ask about me\" completion gateway for a portfolio site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // OpenAI-compatible API base url
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub provider_url: String,

    // Chat model to ask
    #[arg(short, long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    // Provider credential. Unset -> every request answers "Service temporarily unavailable."
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // File holding the system instruction, read once at startup
    #[arg(short, long, env = "SYSTEM_PROMPT_PATH", default_value = "prompts/system_prompt.txt")]
    pub system_prompt: PathBuf,

    // Upstream completion timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 20)]
    pub upstream_timeout: u64,

    // How often stale rate limit records are swept, in seconds
    #[arg(long, env = "RATE_LIMIT_SWEEP_SECS", default_value_t = 60)]
    pub sweep_interval: u64,
}
