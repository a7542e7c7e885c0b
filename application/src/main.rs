use std::{
    future::IntoFuture as _,
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, args::Command, graphql, health, Args, Config};
use axum::{
    extract::MatchedPath,
    routing::{get, on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use futures::TryFutureExt as _;
use rust_decimal::Decimal;
use service::{
    command::{self, Command as _},
    domain::user,
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::writer::MakeWriterExt as _,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(
                    io::stderr
                        .with_max_level(log::Level::WARN)
                        .or_else(io::stdout),
                )
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO)
                            >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config, command } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    let report = migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;
    log::info!(
        "applied {} database migrations",
        report.applied_migrations().len(),
    );

    let service = Service::new(service.into(), postgres);

    match command.unwrap_or_default() {
        Command::Migrate => Ok(()),
        Command::Seed => seed(&service).await,
        Command::Serve => serve(service, server).await,
    }
}

async fn serve(
    service: application::Service,
    server: application::config::Server,
) -> Result<(), ()> {
    let schema = api::schema();

    let mut cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([http::header::CONTENT_TYPE]);
    for origin in server.cors.origins {
        cors = cors.allow_origin(
            origin.parse::<http::header::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not a valid CORS origin: {e}");
            })?,
        );
    }

    let app = Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route("/health", get(health))
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    tracing::info_span!(
                        "HTTP request",
                        http.client_ip = InsecureClientIp::from(
                            r.headers(),
                            r.extensions()
                        )
                            .map(|ip| ip.0.to_string())
                            .ok(),
                        http.flavor = ?r.version(),
                        http.host = r.uri().host(),
                        http.method = r.method().as_str(),
                        http.route = r
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str),
                        http.scheme = r
                            .uri()
                            .scheme()
                            .map(http::uri::Scheme::as_str),
                        http.target = r
                            .uri()
                            .path_and_query()
                            .map(http::uri::PathAndQuery::as_str),
                        http.user_agent = r
                            .headers()
                            .get("User-Agent")
                            .and_then(|h| h.to_str().ok()),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |r: &http::Response<_>,
                     dur: time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(r.status().as_u16()),
                        );

                        if r.status().is_server_error()
                            || r.status().is_client_error()
                        {
                            tracing::error!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        } else {
                            tracing::info!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        }
                    },
                ),
        );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .into_future()
        .map_err(|e| log::error!("webserver failed: {e}"))
        .await
}

/// Fills the database with sample users, skipping the already existing ones.
async fn seed(service: &application::Service) -> Result<(), ()> {
    const SAMPLES: &[(&str, &str, i32, &str, i64)] = &[
        ("John Doe", "john.doe@example.com", 30, "Engineering", 75_000),
        ("Jane Smith", "jane.smith@example.com", 28, "Marketing", 65_000),
        ("Mike Johnson", "mike.johnson@example.com", 35, "Engineering", 85_000),
        ("Sarah Wilson", "sarah.wilson@example.com", 32, "HR", 55_000),
        ("David Brown", "david.brown@example.com", 29, "Sales", 60_000),
        ("Lisa Davis", "lisa.davis@example.com", 27, "Marketing", 58_000),
        ("Robert Miller", "robert.miller@example.com", 40, "Engineering", 95_000),
        ("Emily Garcia", "emily.garcia@example.com", 26, "Design", 62_000),
    ];

    for &(name, email, age, department, salary) in SAMPLES {
        let cmd = command::CreateUser {
            name: user::Name::new(name).expect("valid sample `Name`"),
            email: user::Email::new(email).expect("valid sample `Email`"),
            age: user::Age::new(age),
            department: user::Department::new(department),
            salary: user::Salary::new(Decimal::from(salary)),
        };
        match service.execute(cmd).await {
            Ok(u) => log::info!("created `User(id: {})` <{}>", u.id, u.email),
            Err(e) => match e.as_ref() {
                command::create_user::ExecutionError::EmailOccupied(email) => {
                    log::warn!("`User` <{email}> already exists, skipping");
                }
                command::create_user::ExecutionError::Db(_) => {
                    log::error!("failed to create `User` <{email}>: {e}");
                    return Err(());
                }
            },
        }
    }

    log::info!("seeding completed");
    Ok(())
}
