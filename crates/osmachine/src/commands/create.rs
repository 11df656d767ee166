use super::ConfigSource;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

pub async fn handle(source: &ConfigSource, name: &str, user_data: Option<&Path>) -> anyhow::Result<()> {
    let executor = source.executor()?;

    let user_data = match user_data {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("ユーザーデータを読み込めません: {}", path.display()))?,
        None => Vec::new(),
    };

    eprintln!("{} {}", "マシンを作成中:".blue(), name.cyan());
    let provider_id = executor.create_machine(name, &user_data).await?;

    eprintln!("{} {}", "✓".green().bold(), "マシンの準備が完了しました".green());
    println!("{}", provider_id);
    Ok(())
}
