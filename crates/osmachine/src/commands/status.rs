use super::ConfigSource;

pub async fn handle(source: &ConfigSource, name: &str) -> anyhow::Result<()> {
    let executor = source.executor()?;

    let provider_id = executor.get_machine_status(name).await?;
    println!("{}", provider_id);
    Ok(())
}
