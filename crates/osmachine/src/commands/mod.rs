pub mod create;
pub mod delete;
pub mod list;
pub mod status;
pub mod validate;

use anyhow::{Context, bail};
use colored::Colorize;
use osmachine_config::{MachineProviderConfig, ValidationError};
use osmachine_core::Executor;
use osmachine_openstack::{OpenStackCli, OpenStackProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 設定ファイルと認証情報の取得元
pub struct ConfigSource {
    pub path: Option<PathBuf>,
    pub os_cloud: Option<String>,
}

impl ConfigSource {
    /// `--config` または既定の検索パスから設定を読み込む
    pub fn load(&self) -> anyhow::Result<(PathBuf, MachineProviderConfig)> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => osmachine_config::find_config_file()?,
        };
        tracing::debug!(path = %path.display(), "loading configuration");

        let config = osmachine_config::load(&path)
            .with_context(|| format!("設定ファイルを読み込めません: {}", path.display()))?;
        Ok((path, config))
    }

    /// 設定を読み込んで検証し、Executor を構築する
    pub fn executor(&self) -> anyhow::Result<Executor> {
        let (path, config) = self.load()?;

        let errors = config.validate();
        if !errors.is_empty() {
            print_validation_errors(&path, &errors);
            bail!("設定に{}件のエラーがあります", errors.len());
        }

        let mut cli = OpenStackCli::new(&config.region);
        if let Some(cloud) = &self.os_cloud {
            cli = cli.with_cloud(cloud);
        }
        let provider = Arc::new(OpenStackProvider::new(cli));

        Ok(Executor::new(provider.clone(), provider, config))
    }
}

pub fn print_validation_errors(path: &Path, errors: &[ValidationError]) {
    eprintln!(
        "{} {}",
        "✗ 設定エラー:".red().bold(),
        path.display()
    );
    for error in errors {
        eprintln!("  - {}", error);
    }
}
