use super::{ConfigSource, print_validation_errors};
use colored::Colorize;

pub fn handle(source: &ConfigSource) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let (path, config) = source.load()?;
    println!("設定ファイル: {}", path.display().to_string().cyan());

    let errors = config.validate();
    if !errors.is_empty() {
        eprintln!();
        print_validation_errors(&path, &errors);
        std::process::exit(1);
    }

    println!("{}", "✓ 設定は正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  リージョン: {}", config.region.cyan());
    println!("  フレーバー: {}", config.flavor_name);
    match config.image_id() {
        Some(id) => println!("  イメージ: {} (ID)", id),
        None => println!("  イメージ: {}", config.image_name),
    }
    if let Some(size) = config.root_volume_size() {
        println!("  ルートボリューム: {} GiB", size);
    }
    if let (Some(cluster), Some(role)) = (config.cluster_tag_key(), config.role_tag_key()) {
        println!("  タグ: {}, {}", cluster, role);
    }
    Ok(())
}
