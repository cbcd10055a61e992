//! AYAMAI console.
//!
//! Remembers concepts and feelings, dreams over them, and composes resonant
//! stories, one line-oriented command at a time.
//!
//! ```bash
//! cargo run -p ayamai -- --mood awe --entropy 0.85 --steps 5
//! ```

mod headless;

use ayamai_core::ResonantSession;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "ayamai=info,ayamai_core=info,textgen=warn";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = match headless::parse_config_from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    let session = match &config.load {
        Some(path) => ResonantSession::load(path, config.resonance.clone()).await?,
        None => {
            let mut session = ResonantSession::new(config.resonance.clone());
            headless::seed_demo_memory(&mut session);
            session
        }
    };
    let session = headless::attach_generator(session, config.offline);

    headless::run_headless(session, config).await?;
    Ok(())
}

fn print_help() {
    println!("AYAMAI - a dreaming, feeling memory engine");
    println!();
    println!("USAGE:");
    println!("  ayamai [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  --mood <feeling>     Dream mood (default: random among curiosity, joy, awe)");
    println!("  --affect <feeling>   Initial affective state (default: curiosity)");
    println!("  --entropy <0..1>     Remix surrealism (default: 0.7)");
    println!("  --steps <n>          Fragments per dream (default: 5)");
    println!("  --depth <n>          Concept traversal depth (default: 2)");
    println!("  --seed <n>           Seed the random source for reproducible runs");
    println!("  --load <path>        Start from a saved memory snapshot");
    println!("  --offline            Never call the text generator");
    println!("  -h, --help           Print this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  GEMINI_API_KEY       Gemini API key (falls back to GOOGLE_API_KEY)");
    println!("  AYAMAI_MODEL         Model name (default: gemini-1.5-flash-latest)");
    println!("  AYAMAI_API_BASE      API root override");
    println!("  RUST_LOG             Log filter (default: {DEFAULT_LOG_FILTER})");
}
