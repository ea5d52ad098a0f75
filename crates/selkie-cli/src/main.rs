// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Selkie: ephemeral browser sessions on Kubernetes.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use selkie_config::{LogFormat, SelkieConfig};
use selkie_k8s::KubeClient;
use selkie_provisioner::{Provisioner, RequestId, SessionHandle, SessionRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod settings;
mod version;

/// Selkie - start and stop browser sessions as Kubernetes pods.
#[derive(Parser, Debug)]
#[command(name = "selkie", about = "Ephemeral browser sessions on Kubernetes", version)]
struct Args {
	/// Config file (defaults to /etc/selkie/selkie.toml when present)
	#[arg(long, global = true, env = "SELKIE_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Start a session and print its addresses as JSON
	Start {
		/// Session request as JSON; `-` reads standard input
		#[arg(long, default_value = "-")]
		request: String,

		/// Keep the session until interrupted, then tear it down
		#[arg(long)]
		hold: bool,

		/// Remove whatever a failed start created
		#[arg(long)]
		cleanup_on_failure: bool,
	},
	/// Delete a session's pod and service
	Cancel {
		#[arg(long)]
		request_id: String,

		#[arg(long)]
		namespace: Option<String>,

		#[arg(long)]
		pod: String,

		/// Defaults to the pod name
		#[arg(long)]
		service: Option<String>,
	},
	/// Check configuration and that the default namespace exists
	Check,
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => selkie_config::load_config_with_file(path),
		None => selkie_config::load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config);

	let client = Arc::new(
		KubeClient::new()
			.await
			.context("failed to initialize Kubernetes client")?,
	);
	let provisioner = Provisioner::new(client, settings::provisioner_config(&config.browser));

	match args.command {
		Command::Start {
			request,
			hold,
			cleanup_on_failure,
		} => start(&provisioner, &request, hold, cleanup_on_failure).await,
		Command::Cancel {
			request_id,
			namespace,
			pod,
			service,
		} => {
			let namespace = namespace.unwrap_or_else(|| provisioner.namespace().to_string());
			let service = service.unwrap_or_else(|| pod.clone());
			provisioner
				.cancel(&parse_request_id(&request_id), &namespace, &pod, &service)
				.await
				.with_context(|| format!("failed to cancel session {pod}"))?;
			tracing::info!(%pod, %namespace, "Session cancelled");
			Ok(())
		}
		Command::Check => {
			provisioner.validate_namespace().await?;
			println!("configuration ok, namespace {} exists", provisioner.namespace());
			Ok(())
		}
		Command::Version => Ok(()),
	}
}

fn init_tracing(config: &SelkieConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());

	let (text, json) = match config.logging.format {
		LogFormat::Text => (
			Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
			None,
		),
		LogFormat::Json => (
			None,
			Some(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			),
		),
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(text)
		.with(json)
		.init();
}

fn read_request(source: &str) -> anyhow::Result<SessionRequest> {
	let raw = if source == "-" {
		let mut buf = String::new();
		std::io::stdin()
			.read_to_string(&mut buf)
			.context("failed to read session request from stdin")?;
		buf
	} else {
		std::fs::read_to_string(source)
			.with_context(|| format!("failed to read session request {source}"))?
	};
	serde_json::from_str(&raw).context("invalid session request")
}

fn parse_request_id(raw: &str) -> RequestId {
	match raw.parse::<u64>() {
		Ok(id) => RequestId::Numeric(id),
		Err(_) => RequestId::Text(raw.to_string()),
	}
}

fn describe(session: &SessionHandle) -> serde_json::Value {
	serde_json::json!({
		"sessionId": session.session_id,
		"url": session.url.as_str(),
		"origin": session.origin,
		"namespace": session.namespace,
		"pod": session.pod_name,
		"service": session.service_name,
		"container": session.container,
		"hostPort": session.host_port,
	})
}

async fn start(
	provisioner: &Provisioner,
	request: &str,
	hold: bool,
	cleanup_on_failure: bool,
) -> anyhow::Result<()> {
	let req = read_request(request)?;

	let session = match provisioner.start(&req).await {
		Ok(session) => session,
		Err(err) => {
			if cleanup_on_failure && err.has_leftovers() {
				tracing::warn!(created = ?err.created, "Removing resources of failed start");
				if let Err(e) = provisioner.cleanup(&err.created).await {
					tracing::error!(error = %e, "Cleanup after failed start did not complete");
				}
			} else if err.has_leftovers() {
				tracing::warn!(created = ?err.created, "Failed start left resources behind");
			}
			return Err(err.into());
		}
	};

	println!("{}", serde_json::to_string_pretty(&describe(&session))?);

	if hold {
		tracing::info!(pod = %session.pod_name, "Holding session, press Ctrl-C to tear down");
		tokio::signal::ctrl_c()
			.await
			.context("failed to listen for interrupt")?;
		session.teardown.run().await;
	}

	Ok(())
}
