//! Command-line entry point of the raffle client.
//!
//! Lists supported networks, pre-approves prize tokens, creates raffles from
//! form files and browses deployed raffles on the configured chain.

use clap::{Parser, Subcommand};
use raffle_types::{RaffleState, TokenStandard};
use std::path::PathBuf;

mod commands;

/// Command-line arguments for the raffle client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/example.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Chain to use instead of the configured one
	#[arg(long, env = "RAFFLE_CHAIN_ID")]
	chain_id: Option<u64>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the supported networks and their configured contracts
	Networks,
	/// Approve the raffle deployer to move a prize token
	Approve {
		/// erc20, erc721 or erc1155
		#[arg(long)]
		standard: TokenStandard,
		/// Token or collection address
		#[arg(long)]
		token: String,
		/// Amount in whole tokens (ERC-20)
		#[arg(long)]
		amount: Option<String>,
		/// Token id (ERC-721, ERC-1155)
		#[arg(long)]
		token_id: Option<String>,
	},
	/// Create a raffle from a TOML or JSON form
	Create {
		#[arg(long)]
		form: PathBuf,
	},
	/// List raffles in a lifecycle state
	List {
		#[arg(long, default_value = "active")]
		state: RaffleState,
		/// Print JSON instead of a table
		#[arg(long)]
		json: bool,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	if let Err(err) = run(args).await {
		// One readable line; the details are in the log.
		eprintln!("{}", err);
		std::process::exit(1);
	}
	Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
	match args.command {
		Command::Networks => commands::networks(&args.config, args.chain_id).await,
		Command::Approve {
			standard,
			token,
			amount,
			token_id,
		} => {
			let client = commands::load_client(&args.config, args.chain_id).await?;
			commands::approve(&client, standard, &token, amount, token_id).await
		},
		Command::Create { form } => {
			let client = commands::load_client(&args.config, args.chain_id).await?;
			commands::create(&client, &form).await
		},
		Command::List { state, json } => {
			let client = commands::load_client(&args.config, args.chain_id).await?;
			commands::list(&client, state, json).await
		},
	}
}
