// Copyright © 2025 Huly Labs. Use of this source code is governed by the MIT license.

use std::sync::Arc;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, dev::ServerHandle, middleware, web};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;

use crate::{config::Config, dispatch::Dispatcher};

#[derive(Clone)]
struct WebhookSecret(SecretString);

pub fn server(
    config: &Config,
    dispatcher: Arc<Dispatcher>,
) -> Result<(JoinHandle<Result<(), std::io::Error>>, ServerHandle)> {
    let socket = std::net::SocketAddr::new(
        config.http_api.bind_host.as_str().parse()?,
        config.http_api.bind_port,
    );

    tracing::info!(bind = ?socket, "Starting http server");

    let webhook_secret = WebhookSecret(config.gitlab.webhook_secret.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(dispatcher.clone()))
            .app_data(web::Data::new(webhook_secret.clone()))
            .wrap(middleware::Logger::default())
            .route("/webhook/gitlab", web::post().to(gitlab_webhook))
            .route("/", web::get().to(async || "ok"))
            .route(
                "/status",
                web::get().to(async || {
                    format!(
                        "OK {}/{}",
                        env!("CARGO_PKG_NAME"),
                        env!("CARGO_PKG_VERSION")
                    )
                }),
            )
    })
    .disable_signals()
    .bind(socket)?
    .run();

    let server_handle = server.handle();
    let server = tokio::spawn(server);

    Ok((server, server_handle))
}

async fn gitlab_webhook(
    request: HttpRequest,
    body: web::Bytes,
    dispatcher: web::Data<Arc<Dispatcher>>,
    secret: web::Data<WebhookSecret>,
) -> HttpResponse {
    let token = header_value(&request, "X-Gitlab-Token");
    if token != Some(secret.0.expose_secret()) {
        tracing::warn!("Got webhook request with incorrect or empty token");
        return HttpResponse::Unauthorized().finish();
    }

    let label = header_value(&request, "X-Gitlab-Event").unwrap_or_default();
    tracing::info!(event = label, "Got GitLab webhook");

    // dispatch never fails; GitLab only needs to know we accepted the call
    dispatcher.dispatch(label, &body).await;
    HttpResponse::Ok().finish()
}

fn header_value<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}
