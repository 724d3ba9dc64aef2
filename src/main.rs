use std::{path::PathBuf, sync::Arc};

use clap::Parser as _;
use dmsgate::{
	bridge,
	config::{Config, UserConfig},
	logger,
	soap::{HyperTransport, Params, Scalar, Session},
	state::SharedState,
};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
	/// Path to configuration file (`.json`, `.json5` or `.jsonc`).
	#[arg(long, short, global = true)]
	config: Option<PathBuf>,

	/// SOAP endpoint URL, overrides the configuration file.
	#[arg(long, global = true)]
	endpoint: Option<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
	/// Invoke a remote method and print its result as JSON.
	Call {
		/// Remote method name, e.g. `GetDocuments`.
		method: String,

		/// A `key=value` parameter, may be repeated.
		#[arg(long = "param", short = 'p', value_parser = parse_param)]
		params: Vec<(String, Scalar)>,

		/// Skip the `doConnection` call even if connection
		/// parameters are configured.
		#[arg(long)]
		no_connect: bool,
	},

	/// Run the local HTTP/JSON bridge.
	Serve {
		/// Port to listen on, overrides the configuration file.
		#[arg(long)]
		port: Option<u16>,
	},
}

fn parse_param(arg: &str) -> Result<(String, Scalar), String> {
	let (key, value) = arg
		.split_once('=')
		.ok_or_else(|| format!("expected `key=value`, got `{}`", arg))?;

	Ok((key.to_string(), Scalar::parse_lossy(value)))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
	let _logger = logger::setup_logger()?;

	let args = Args::parse();
	log::debug!("{:?}", args);

	let user_config = UserConfig::load(args.config.as_deref())?;
	log::debug!("{:?}", user_config);

	let port_override = match &args.command {
		Command::Serve { port } => *port,
		Command::Call { .. } => None,
	};

	let config = Config::resolve(&user_config, args.endpoint, port_override)?;
	let shutdown_token = tokio_util::sync::CancellationToken::new();
	let state = Arc::new(SharedState::new(
		config,
		HyperTransport::new(),
		shutdown_token.clone(),
	));

	match args.command {
		Command::Call {
			method,
			params,
			no_connect,
		} => {
			let params: Params = params.into_iter().collect();

			let session = if no_connect {
				Session::anonymous()
			} else {
				state.session.clone()
			};

			let result = state.gateway.invoke(&session, &method, &params).await?;

			println!("{}", serde_json::to_string_pretty(&result)?);
		}

		Command::Serve { .. } => {
			let shutdown_token_clone = shutdown_token.clone();
			tokio::spawn(async move {
				if let Err(e) = tokio::signal::ctrl_c().await {
					log::error!("Failed to listen for Ctrl-C: {}", e);
				}

				log::info!("🛑 Sending shutdown signal (PID {})", std::process::id());
				shutdown_token_clone.cancel();
			});

			bridge::server::run(state).await?;
			log::debug!("✨ Clean exit");
		}
	}

	Ok(())
}
