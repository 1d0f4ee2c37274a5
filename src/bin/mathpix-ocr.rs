use std::process::ExitCode;

use anyhow::Result;
use mathpix_ocr::{Cli, Invocation, OcrError};
use tracing_subscriber::EnvFilter;

async fn try_main() -> Result<ExitCode> {
    let cli = match Cli::parse_lenient(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too, on stdout.
            err.print()?;
            return Ok(if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    let invocation = Invocation::try_from(cli)?;

    let workdir = std::env::current_dir()?;
    if let Some(output) = mathpix_ocr::run(&invocation, &workdir).await? {
        println!("{output}");
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "mathpix_ocr=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match try_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            let code = err.downcast_ref::<OcrError>().map_or(1, OcrError::exit_code);
            ExitCode::from(code)
        }
    }
}
