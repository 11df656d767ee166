use super::ConfigSource;
use colored::Colorize;

pub async fn handle(
    source: &ConfigSource,
    name: &str,
    provider_id: Option<&str>,
) -> anyhow::Result<()> {
    let executor = source.executor()?;

    eprintln!("{} {}", "マシンを削除中:".blue(), name.cyan());
    executor.delete_machine(name, provider_id).await?;

    println!("{} マシン {} を削除しました", "✓".green().bold(), name.cyan());
    Ok(())
}
