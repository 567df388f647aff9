use std::{process::ExitCode, sync::Arc};

use clap::Parser;

use aura_client::{
    classifier::{Connectivity, ErrorClassifier, StaticConnectivity, TcpConnectivity},
    client::{HttpClient, NetworkClient},
    config::Args,
    engine::FixtureApi,
    repository::Repository,
    session::{Session, SessionError},
};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("could not open log file: {0}")]
    LogFile(#[from] std::io::Error),
    #[error("could not install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("could not build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("could not read script: {0}")]
    Script(#[from] csv::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

fn setup_logger(args: &Args) -> Result<(), AppError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(args.log_level)
        .chain(fern::log_file(&args.log_file)?)
        .apply()?;
    Ok(())
}

fn build_repository(args: &Args) -> Result<Repository, AppError> {
    let (client, connectivity): (Arc<dyn NetworkClient>, Arc<dyn Connectivity>) = if args.fixture
    {
        let api = FixtureApi::seeded();
        api.set_offline(args.offline);
        (Arc::new(api), Arc::new(StaticConnectivity(!args.offline)))
    } else {
        log::info!("using api at {}", args.base_url);
        (
            Arc::new(HttpClient::new(args.base_url.clone(), args.timeout())?),
            Arc::new(TcpConnectivity::new(
                args.connectivity_addr,
                args.connectivity_timeout(),
            )),
        )
    };
    Ok(Repository::new(client, ErrorClassifier::new(connectivity)))
}

async fn run(args: Args) -> Result<(), AppError> {
    let repository = build_repository(&args)?;

    // read actions
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&args.script)?;

    // replay them, report to stdout
    let mut writer = csv::WriterBuilder::new().from_writer(std::io::stdout());
    let mut session = Session::new(repository, args.events_capacity);
    let count = session.replay(&mut reader, &mut writer).await?;
    log::info!("replayed {} actions from {}", count, args.script.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = setup_logger(&args) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
