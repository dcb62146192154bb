//! Subcommand implementations.

use alloy_primitives::Address;
use raffle_config::Config;
use raffle_core::{RaffleClient, RaffleForm};
use raffle_types::{
	format_token_amount, parse_address, truncate_id, NetworkRegistry, PrizeSpec, RaffleState,
	RaffleSummary, TokenStandard, ETH_DECIMALS,
};
use std::error::Error;
use std::path::Path;

/// Loads the configuration, applying a command-line chain override.
pub async fn load_config(path: &Path, chain_id: Option<u64>) -> Result<Config, Box<dyn Error>> {
	let path_str = path
		.to_str()
		.ok_or_else(|| format!("Invalid configuration path: {}", path.display()))?;
	let mut config = Config::from_file(path_str).await?;
	if let Some(chain_id) = chain_id {
		config.client.chain_id = chain_id;
	}
	tracing::info!(chain_id = config.client.chain_id, "Loaded configuration");
	Ok(config)
}

pub async fn load_client(path: &Path, chain_id: Option<u64>) -> Result<RaffleClient, Box<dyn Error>> {
	let config = load_config(path, chain_id).await?;
	Ok(RaffleClient::from_config(&config)?)
}

/// Prints every known network, marking the selected one.
///
/// Works without a configuration file, in which case only the built-in
/// networks are shown.
pub async fn networks(path: &Path, chain_id: Option<u64>) -> Result<(), Box<dyn Error>> {
	let (registry, selected) = if path.exists() {
		let config = load_config(path, chain_id).await?;
		(config.registry()?, Some(config.client.chain_id))
	} else {
		tracing::warn!(path = %path.display(), "No configuration file, showing built-in networks");
		(NetworkRegistry::builtin(), chain_id)
	};

	let mut chains: Vec<_> = registry.iter().collect();
	chains.sort_by_key(|(id, _)| *id);

	for (id, network) in chains {
		let marker = if Some(id) == selected { '*' } else { ' ' };
		println!("{} {:>9}  {:<20} {}", marker, id, network.name, network.rpc_url);
		for (role, address) in network.contracts.iter() {
			println!("{:13}{:<16} {}", "", role.to_string(), address);
		}
	}
	Ok(())
}

/// Builds the prize an approval is requested for.
fn approval_prize(
	standard: TokenStandard,
	token: Address,
	amount: Option<String>,
	token_id: Option<String>,
) -> Result<PrizeSpec, String> {
	match standard {
		TokenStandard::Erc20 => Ok(PrizeSpec::Erc20 {
			token,
			amount: amount.unwrap_or_default(),
		}),
		TokenStandard::Erc721 => Ok(PrizeSpec::Erc721 {
			collection: token,
			token_id: token_id.unwrap_or_default(),
		}),
		// Operator approval covers every id of the collection.
		TokenStandard::Erc1155 => Ok(PrizeSpec::Erc1155 {
			collection: token,
			token_id: token_id.unwrap_or_else(|| "0".to_string()),
		}),
		TokenStandard::Eth | TokenStandard::None => {
			Err(format!("{} prizes do not need an approval", standard))
		},
	}
}

pub async fn approve(
	client: &RaffleClient,
	standard: TokenStandard,
	token: &str,
	amount: Option<String>,
	token_id: Option<String>,
) -> Result<(), Box<dyn Error>> {
	let token = parse_address(token)?;
	let prize = approval_prize(standard, token, amount, token_id)?;
	let deployer = client.deployer()?;
	let owner = client.creator().await?;
	tracing::info!(owner = %owner, spender = %deployer, standard = %standard, "Approving prize token");

	let result = client.approvals().ensure_approved(&prize, deployer).await;
	if !result.success {
		let message = result
			.error_message
			.unwrap_or_else(|| "Approval failed.".to_string());
		return Err(message.into());
	}

	if result.already_approved {
		println!("Token already approved.");
	} else {
		println!("Approval successful!");
		if let (Some(receipt), Some(network)) = (&result.transaction_receipt, client.network()) {
			println!("Transaction: {}", network.tx_url(&receipt.hash.to_string()));
		}
	}
	Ok(())
}

/// Reads a raffle form; `.json` files are JSON, anything else TOML.
pub async fn load_form(path: &Path) -> Result<RaffleForm, Box<dyn Error>> {
	let contents = tokio::fs::read_to_string(path)
		.await
		.map_err(|e| format!("Cannot read form {}: {}", path.display(), e))?;

	let form = match path.extension().and_then(|ext| ext.to_str()) {
		Some("json") => serde_json::from_str(&contents)
			.map_err(|e| format!("Invalid form {}: {}", path.display(), e))?,
		_ => toml::from_str(&contents).map_err(|e| format!("Invalid form {}: {}", path.display(), e))?,
	};
	Ok(form)
}

pub async fn create(client: &RaffleClient, form_path: &Path) -> Result<(), Box<dyn Error>> {
	let form = load_form(form_path).await?;
	let creator = client.creator().await?;
	tracing::info!(creator = %creator, chain_id = client.chain_id(), "Creating raffle");
	let created = client.submitter().create_raffle(&form).await?;

	println!("Raffle created successfully!");
	match created.explorer_url {
		Some(url) => println!("Transaction: {}", url),
		None => println!("Transaction: {}", created.transaction_hash),
	}
	Ok(())
}

pub async fn list(client: &RaffleClient, state: RaffleState, json: bool) -> Result<(), Box<dyn Error>> {
	let raffles = client.browser().list_by_state(state).await?;

	if json {
		println!("{}", serde_json::to_string_pretty(&raffles)?);
		return Ok(());
	}

	if raffles.is_empty() {
		println!("No {} raffles.", state);
		return Ok(());
	}

	println!(
		"{:<14} {:<24} {:>9} {:>14}  {}",
		"ADDRESS", "NAME", "SOLD", "PRICE (ETH)", "ENDS"
	);
	for raffle in &raffles {
		println!("{}", table_row(raffle));
	}
	Ok(())
}

fn table_row(raffle: &RaffleSummary) -> String {
	let ends = i64::try_from(raffle.end_time())
		.ok()
		.and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
		.map(|time| time.format("%Y-%m-%d %H:%M UTC").to_string())
		.unwrap_or_else(|| "-".to_string());

	format!(
		"{:<14} {:<24} {:>9} {:>14}  {}",
		truncate_id(&raffle.address.to_string()),
		raffle.name,
		format!("{}/{}", raffle.tickets_sold, raffle.ticket_limit),
		format_token_amount(&raffle.ticket_price.to_string(), ETH_DECIMALS),
		ends
	)
}
