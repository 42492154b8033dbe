use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cinebook-server")]
#[command(about = "Movie catalog, booking and review server", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "cinebook-server.yaml")]
    config: String,

    /// YAML file with movies, theaters, subscriptions and tokens to import at startup
    #[arg(short, long)]
    seed: Option<String>,

    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "cinebook_rs=debug,tower_http=debug"
    } else {
        "cinebook_rs=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(args.json_logs.then(|| fmt::layer().json()))
        .with((!args.json_logs).then(|| fmt::layer()))
        .init();

    if let Err(e) = cinebook_rs::run(&args.config, args.seed.as_deref(), args.debug).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
