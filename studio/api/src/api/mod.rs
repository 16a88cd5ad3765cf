use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::http::{error_body, RouteError};
use common::make_response;
use common::prelude::FutureTimeout;
use hyper::server::conn::Http;
use hyper::{Body, Request, Response, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use tokio::net::TcpSocket;
use tokio::select;

use self::error::{ApiError, Result};
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod admin;
pub mod auth;
pub mod error;
pub mod ext;
pub mod health;
pub mod jwt;
pub mod middleware;
pub mod request_context;
pub mod session;
pub mod streams;
pub mod studios;

async fn preflight(_: Request<Body>) -> Result<Response<Body>> {
	Ok(Response::builder()
		.status(StatusCode::NO_CONTENT)
		.body(Body::empty())
		.map_err(|_| "failed to build response")?)
}

async fn not_found(_: Request<Body>) -> Result<Response<Body>> {
	Ok(make_response!(StatusCode::NOT_FOUND, error_body("Not Found")))
}

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> anyhow::Result<Router<Body, RouteError<ApiError>>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		.err_handler_with_info(common::http::error_handler::<ApiError>)
		// The CORS middleware adds the CORS headers to every response, errors included
		.middleware(middleware::cors::cors_middleware(global))
		// The auth middleware resolves the bearer token into the request context, it never
		// fails the request on a bad token by itself
		.middleware(middleware::auth::auth_middleware(global))
		.options("/*", preflight)
		.scope("/api", health::routes(global)?)
		.scope("/api", session::routes(global)?)
		.scope("/api", studios::routes(global)?)
		.scope("/api", streams::routes(global)?)
		.scope("/api", admin::routes(global)?)
		.any(not_found)
		.build()
		.map_err(|err| anyhow::anyhow!("failed to build router: {err}"))
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();
	tracing::info!("API listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.set_reuseport(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	let tls_acceptor = if let Some(tls) = &config.tls {
		tracing::info!("TLS enabled");
		let cert = tokio::fs::read(&tls.cert).await.context("failed to read api ssl cert")?;
		let key = tokio::fs::read(&tls.key).await.context("failed to read api ssl private key")?;

		let key = rustls::PrivateKey(
			rustls_pemfile::pkcs8_private_keys(&mut io::BufReader::new(io::Cursor::new(key)))?
				.into_iter()
				.next()
				.context("no private key found in api ssl private key file")?,
		);

		let certs = rustls_pemfile::certs(&mut io::BufReader::new(io::Cursor::new(cert)))?
			.into_iter()
			.map(rustls::Certificate)
			.collect();

		Some(Arc::new(tokio_rustls::TlsAcceptor::from(Arc::new(
			rustls::ServerConfig::builder()
				.with_safe_defaults()
				.with_no_client_auth()
				.with_single_cert(certs, key)?,
		))))
	} else {
		None
	};

	// The router only holds a Weak reference to the global state, so open
	// keep-alive connections do not keep it alive past shutdown.
	let request_service = RequestServiceBuilder::new(routes(&global)?)
		.map_err(|err| anyhow::anyhow!("failed to build request service: {err}"))?;

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let tls_acceptor = tls_acceptor.clone();
				let service = request_service.build(addr);

				tracing::debug!("Accepted connection from {}", addr);

				tokio::spawn(async move {
					if let Some(tls_acceptor) = tls_acceptor {
						let Ok(Ok(socket)) = tls_acceptor.accept(socket).timeout(Duration::from_secs(5)).await else {
							return;
						};
						tracing::debug!("TLS handshake complete");
						Http::new().serve_connection(
							socket,
							service,
						).with_upgrades().await.ok();
					} else {
						Http::new().serve_connection(
							socket,
							service,
						).with_upgrades().await.ok();
					}
				});
			},
		}
	}
}
