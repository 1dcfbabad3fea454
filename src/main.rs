// src/main.rs

use monodev::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("monodev error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
