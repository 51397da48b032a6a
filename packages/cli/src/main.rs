use clap::Parser;
use tracing_subscriber::EnvFilter;

use rtdb_cli::Args;

fn main() {
    let args = Args::parse();
    init_tracing();

    let result = rtdb_cli::connect(&args).and_then(|root| {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        rtdb_cli::run(&root, &args.command, &mut out)
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
