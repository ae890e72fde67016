use std::{future::IntoFuture as _, io, process::ExitCode, sync::OnceLock};

use dashboard::{args::Action, config, Args, Config, Service};
use futures::{future, TryFutureExt as _};
use service::{
    command::{self, Command as _},
    infra::{postgres, Postgres},
    task,
};
use tokio::net::TcpListener;
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::MakeWriter,
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
};

/// Most verbose [`log::Level`] being emitted, known once the [`Config`] is
/// loaded.
static MAX_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(output(io::stdout, false))
        .with(output(io::stderr, true))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

/// Creates a compact log output into the provided `writer`, accepting either
/// only warnings and errors, or everything else.
fn output<S, W>(writer: W, alerts: bool) -> impl Layer<S>
where
    S: log::Subscriber + for<'s> LookupSpan<'s>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_filter(filter_fn(move |meta| {
            let level = *meta.level();
            let max = MAX_LEVEL.get().copied().unwrap_or(log::Level::INFO);
            meta.is_span()
                || ((level <= log::Level::WARN) == alerts && level <= max)
        }))
}

/// Runs the [`Action`] requested in the command line.
async fn run() -> Result<(), ()> {
    let Args { config, action } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;
    let config = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;
    MAX_LEVEL
        .set(config.log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres = connect(config.postgres).await?;
    let (service, background) = Service::new(config.service.into(), postgres);

    match action.unwrap_or_default() {
        Action::Seed => seed(&service).await,
        Action::Serve => serve(service, background, config.server).await,
    }
}

/// Connects to [`Postgres`] and brings its schema up to date.
async fn connect(config: config::Postgres) -> Result<Postgres, ()> {
    let mut postgres = Postgres::new(&config.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    let report = migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;
    for m in report.applied_migrations() {
        log::info!("applied `{m}` migration");
    }

    Ok(postgres)
}

/// Replaces all the stored users with the sample ones.
async fn seed(service: &Service) -> Result<(), ()> {
    let count = service.execute(command::SeedUsers).await.map_err(|e| {
        log::error!("failed to seed users: {e}");
    })?;
    log::info!("seeded {count} users");
    Ok(())
}

/// Serves the GraphQL API until either the server or any of the
/// [`task::Background`] tasks fails.
async fn serve(
    service: Service,
    background: task::Background,
    config: config::Server,
) -> Result<(), ()> {
    let config::Server { host, port, cors } = config;

    let app = dashboard::router(service, &cors.origins).map_err(|e| {
        log::error!("failed to build HTTP router: {e}");
    })?;
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| log::error!("failed to listen on `{host}:{port}`: {e}"))?;
    log::info!("listening on `{host}:{port}`");

    let server = axum::serve(listener, app)
        .into_future()
        .map_err(|e| log::error!("HTTP server failed: {e}"));
    let tasks = background
        .into_future()
        .map_err(|e| log::error!("background task failed: {e}"));

    future::try_join(server, tasks).await.map(drop)
}
