//! Fetch command - read an archived battle back from IPFS
//!
//! Usage:
//! ```bash
//! arena fetch bafybeig...
//! arena fetch bafybeig... --gateway https://ipfs.io --raw
//! ```

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use arena_anchor::{ContentStore, PinataStore, PINATA_API_URL, PINATA_GATEWAY_URL};
use arena_core::BattleResult;
use arena_llm::ArenaConfig;

use crate::render;

/// Arguments for the fetch command
#[derive(Args)]
pub struct FetchArgs {
    /// Content identifier of the archived battle
    cid: String,

    /// IPFS gateway to read from
    #[arg(long, default_value = PINATA_GATEWAY_URL)]
    gateway: String,

    /// Print the stored JSON as is
    #[arg(long)]
    raw: bool,
}

/// Run the fetch command
pub async fn run(args: FetchArgs, config: ArenaConfig) -> Result<()> {
    // reads go through the public gateway, the token only matters for pinning
    let jwt = config.pinata_jwt.unwrap_or_default();
    let store = PinataStore::with_endpoints(jwt, PINATA_API_URL, &args.gateway);

    let Some(doc) = store
        .get(&args.cid)
        .await
        .with_context(|| format!("Failed to fetch {}", args.cid))?
    else {
        bail!("Nothing stored under {}", args.cid);
    };

    match serde_json::from_value::<BattleResult>(doc.clone()) {
        Ok(result) if !args.raw => show(&result),
        _ => println!("{}", serde_json::to_string_pretty(&doc)?),
    }
    println!("\n  {} {}\n", "🌐".bold(), store.link(&args.cid).cyan().underline());
    Ok(())
}

fn show(result: &BattleResult) {
    println!(
        "\n  {} {}",
        "Battle".bold(),
        format!("{} ({})", result.id, result.timestamp.format("%Y-%m-%d %H:%M UTC")).bright_black()
    );
    render::battle_header(result.agents, &result.prompt);
    for reply in &result.responses {
        render::response(reply);
    }
    render::verdict(&result.verdict, result.agents, "The judge");
    if let Some(tx) = &result.tx_hash {
        println!("  {} {}", "Ledger tx:".bold(), tx.bright_black());
    }
}
