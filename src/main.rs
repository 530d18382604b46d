use clap::Parser;
use serde_json::json;
use std::time::Duration;
use scoped_context::{demo, read, Overrides};

/// Replays nested scoped-override call chains and checks every observation.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Override applied to the outer scope, as JSON (e.g. '{"a":1,"s":"hello"}')
    #[arg(long, default_value = r#"{"a":1,"s":"hello"}"#)]
    base: String,
    /// Also run two interleaved async scopes
    #[arg(long)]
    async_demo: bool,
    /// Suspension of the slower async scope, in milliseconds
    #[arg(long, default_value_t = 30)]
    long_ms: u64,
    /// Suspension of the faster async scope, in milliseconds
    #[arg(long, default_value_t = 10)]
    short_ms: u64,
    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_subscriber(&args.log_level);

    let base = match Overrides::from_json(&args.base) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Invalid --base: {e}");
            std::process::exit(2);
        }
    };

    let results = match demo::run_chain(base) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut out = json!({ "results": results });

    if args.async_demo {
        let long = Duration::from_millis(args.long_ms);
        let short = Duration::from_millis(args.short_ms);
        match demo::interleaved(long, short).await {
            Ok((slow, fast)) => out["async"] = json!({ "slow": slow, "fast": fast }),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    out["final"] = json!(read());
    match serde_json::to_string_pretty(&out) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Failed to render output: {e}");
            std::process::exit(1);
        }
    }
}
