// src/main.rs

use taskdag::{RunStatus, cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(status) => status.exit_code(),
        Err(err) => {
            eprintln!("taskdag error: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run_main() -> anyhow::Result<RunStatus> {
    let args = cli::parse()?;
    logging::init_logging(args.log_level)?;
    run(args).await
}
