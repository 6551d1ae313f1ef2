//! Agents command - show the roster
//!
//! Usage:
//! ```bash
//! arena agents
//! arena agents --json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use arena_core::AgentName;

use crate::render;

/// Arguments for the agents command
#[derive(Args)]
pub struct AgentsArgs {
    /// Print the roster as JSON
    #[arg(long)]
    json: bool,
}

fn roster_json() -> serde_json::Value {
    let agents: Vec<serde_json::Value> = AgentName::ALL
        .iter()
        .map(|name| {
            let profile = name.profile();
            serde_json::json!({
                "name": name.as_str(),
                "display_name": profile.display_name,
                "model": profile.model,
                "fallback_model": profile.fallback_model,
                "color": profile.color,
            })
        })
        .collect();
    serde_json::Value::Array(agents)
}

/// Run the agents command
pub fn run(args: AgentsArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&roster_json())?);
        return Ok(());
    }

    println!("\n{}\n", "🤖 ROSTER".cyan().bold());
    println!("{}", render::roster_table());
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_json() {
        let roster = roster_json();
        let agents = roster.as_array().unwrap();
        assert_eq!(agents.len(), 8);
        assert_eq!(agents[0]["name"], "claude");
        assert!(agents.iter().all(|a| a["model"].as_str().is_some_and(|m| m.contains('/'))));
    }
}
