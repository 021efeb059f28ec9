use {
    asa_tool::{Status, arguments::Arguments},
    clap::Parser,
    std::process::ExitCode,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Arguments::parse();
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::info!("running asa-tool with validated arguments:\n{}", args);
    match asa_tool::run(&args, &mut std::io::stdout()).await {
        Ok(Status::Valid) => ExitCode::SUCCESS,
        Ok(Status::Invalid) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(?err, "command failed");
            ExitCode::from(2)
        }
    }
}
