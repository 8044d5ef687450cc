//! # Lotto backend
//!
//! Numbers-lottery service over flat JSON files: users buy 6-of-49 tickets,
//! an admin executes draws that sweep up all pending tickets, and users read
//! back their own match results.
//!
//!
//!
//! # Storage
//!
//! No database. Each logical store is one pretty-printed JSON document on
//! disk, re-read in full per operation and committed by full overwrite. A
//! per-store write serializer queues mutating operations so concurrent
//! requests cannot clobber each other's commits; each writer re-loads and
//! re-validates inside its slot. Single process only.
//!
//!
//!
//! # Auth
//!
//! Authentication lives upstream. Requests arrive with the resolved caller in
//! `x-user-id` / `x-user-role` / `x-user-email` headers; this service only
//! applies the admin policy (explicit role, or legacy admin-domain email) to
//! gate draw execution.
//!
//!
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=info cargo run
//! ```
//!
//! Configuration is env-driven, see [`config::Config`].
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod error;
pub mod lottery;
pub mod routes;
pub mod serializer;
pub mod state;
pub mod store;

use routes::{
    draw_execute_handler, draw_results_handler, draws_list_handler, ticket_create_handler,
    tickets_list_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/tickets", post(ticket_create_handler).get(tickets_list_handler))
        .route("/draws", post(draw_execute_handler).get(draws_list_handler))
        .route("/draws/{id}/results", get(draw_results_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
