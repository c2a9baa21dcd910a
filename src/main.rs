// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use std::fs;
use std::panic::set_hook;
use std::panic::take_hook;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use tracing::Level;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use self::config::Config;
use crate::chat::TelegramClient;
use crate::dispatch::Dispatcher;
use crate::store::SqliteStore;

use clap::Parser;
use tokio::select;
use tokio::signal::*;

mod chat;
mod config;
mod dispatch;
mod events;
mod format;
mod handlers;
mod http;
mod notification;
mod otel;
mod store;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to data directory
    #[arg(short, long, default_value = "data")]
    data: String,
}

fn init_logger(config: &Config) -> Result<()> {
    otel::init_meters(config);
    let package_name = env!("CARGO_PKG_NAME").replace('-', "_");

    let console_layer = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_target(true)
        .with_writer(std::io::stdout)
        .with_filter(
            Targets::default()
                .with_default(tracing::Level::WARN)
                .with_target(&package_name, config.log_level),
        );

    let tracer_layer = otel::tracer_provider(config).map(|provider| {
        let filter = Targets::default()
            .with_default(Level::WARN)
            .with_target(&package_name, config.log_level);

        OpenTelemetryLayer::new(provider.tracer(package_name.clone())).with_filter(filter)
    });

    let logger_layer = otel::logger_provider(config)
        .as_ref()
        .map(OpenTelemetryTracingBridge::new)
        .with_filter(
            Targets::default()
                .with_default(Level::WARN)
                .with_target(&package_name, config.log_level),
        );

    tracing_subscriber::registry()
        .with(console_layer)
        .with(tracer_layer)
        .with(logger_layer)
        .try_init()?;
    Ok(())
}

fn init_panic_hook() {
    let original_hook = take_hook();
    set_hook(Box::new(move |panic_info| {
        // intentionally ignore errors here since we're already in a panic
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!("{}, {:#?}", panic_info, backtrace);
        original_hook(panic_info);
        std::process::exit(1);
    }));
}

#[cfg(unix)]
async fn wait_interrupt() -> Result<()> {
    let mut term = unix::signal(unix::SignalKind::terminate())?;
    let mut int = unix::signal(unix::SignalKind::interrupt())?;
    let mut quit = unix::signal(unix::SignalKind::quit())?;

    select! {
        _ = term.recv() => {
            tracing::info!("Received SIGTERM");
        }

        _ = int.recv() => {
            tracing::info!("Received SIGINT");
        }

        _ = quit.recv() => {
            tracing::info!("Received SIGQUIT");
        }
    };

    Ok(())
}

#[cfg(windows)]
async fn wait_interrupt() -> Result<()> {
    let mut term = windows::ctrl_close()?;
    let mut int = windows::ctrl_c()?;
    let mut quit = windows::ctrl_shutdown()?;

    select! {
        _ = term.recv() => {
            tracing::info!("Received CTRL+CLOSE");
        }

        _ = int.recv() => {
            tracing::info!("Received CTRL+C");
        }

        _ = quit.recv() => {
            tracing::info!("Received Shutdown");
        }
    };

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_panic_hook();
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            println!("Error: Failed to load config");
            return Err(e);
        }
    };

    init_logger(&config)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Started");

    let data_dir = Path::new(&args.data);
    if !data_dir.exists() {
        fs::create_dir_all(data_dir)?;
    }

    let store = SqliteStore::new(&args.data).await?;
    let chat_client = TelegramClient::new(&config)?;
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(store),
        Arc::new(chat_client),
        config.broadcast_role,
    ));

    let (http_server, http_server_handle) = http::server(&config, dispatcher)?;

    select! {
        _ = wait_interrupt() => {
        }

        res = http_server => {
            if let Err(e) = res {
                tracing::error!("Http server error: {:?}", e);
            }
            tracing::info!("Http server terminated");
        }
    }

    tracing::debug!("Shutting down");
    http_server_handle.stop(true).await;
    Ok(())
}
