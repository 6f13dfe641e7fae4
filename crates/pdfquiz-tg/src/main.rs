use futures::prelude::*;
use pdfquiz_tg::tracing_err;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    if dotenvy::dotenv().is_err() {
        eprintln!("Dotenv config was not found, using only the process environment");
    }

    let logging_task = pdfquiz_tg::init_logging();

    pdfquiz_tg::init_metrics();

    // Ctrl+C is handled by the dispatcher itself, which stops gracefully
    let exit_code = AssertUnwindSafe(try_main())
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            error!("Exiting due to a panic...");
            Ok(ExitCode::FAILURE)
        })
        .unwrap_or_else(|err| {
            error!(err = tracing_err(&err), "Exiting with an error...");
            ExitCode::FAILURE
        });

    logging_task.shutdown().await;

    exit_code
}

async fn try_main() -> pdfquiz_tg::Result<ExitCode> {
    let config = pdfquiz_tg::Config::load_or_panic();
    pdfquiz_tg::run(config).await?;
    Ok(ExitCode::SUCCESS)
}
