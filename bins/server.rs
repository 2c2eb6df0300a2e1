use std::process::ExitCode;
use std::str::FromStr;

use dotenvy::dotenv;
use server::ServiceKind;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // .env first so RUST_LOG applies
    dotenv().ok();
    common::utils::logging::init_logging_default();
    info!(service = "server", event = "logger_init", "tracing subscriber initialized");
}

/// `server <users|orders|products>`, or `SERVICE=<kind>` when no argument is given.
fn service_kind() -> Result<ServiceKind, String> {
    let raw = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SERVICE").ok())
        .ok_or_else(|| "usage: server <users|orders|products> (or set SERVICE)".to_string())?;
    ServiceKind::from_str(&raw).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let kind = match service_kind() {
        Ok(kind) => kind,
        Err(e) => {
            error!(service = "server", event = "bad_arguments", error = %e, "cannot determine which service to run");
            return ExitCode::FAILURE;
        }
    };

    let cfg = match configs::AppConfig::load_or_env(kind.default_port()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = kind.name(), event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = kind.name(), event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = kind.name(),
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        port = cfg.server.port,
        "microservice starting"
    );

    // run() returns once the shutdown signal has drained in-flight requests
    match rt.block_on(server::run(kind, cfg)) {
        Ok(()) => {
            info!(service = kind.name(), event = "stop", %service_id, pid, "microservice stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = kind.name(), event = "run_failed", error = %e, "microservice exited with error");
            ExitCode::FAILURE
        }
    }
}
