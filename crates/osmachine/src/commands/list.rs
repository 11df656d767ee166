use super::ConfigSource;
use colored::Colorize;
use std::collections::BTreeMap;

pub async fn handle(source: &ConfigSource, json: bool) -> anyhow::Result<()> {
    let executor = source.executor()?;
    let machines = executor.list_machines().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&machines)?);
    } else {
        print_table(&machines);
    }
    Ok(())
}

fn print_table(machines: &BTreeMap<String, String>) {
    if machines.is_empty() {
        println!("{}", "マシンが見つかりません".yellow());
        return;
    }

    let width = machines.values().map(|n| n.len()).max().unwrap_or(0).max(4);
    println!("{:<width$}  {}", "NAME".bold(), "PROVIDER ID".bold(), width = width);
    for (provider_id, name) in machines {
        println!("{:<width$}  {}", name.cyan(), provider_id, width = width);
    }
}
