mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "osmachine")]
#[command(about = "OpenStack 上のクラスタマシンを作成・削除・一覧する", long_about = None)]
#[command(version)]
struct Cli {
    /// マシン設定ファイル (YAML)
    #[arg(short, long, global = true, env = "OSMACHINE_CONFIG")]
    config: Option<PathBuf>,

    /// 認証に使う clouds.yaml のエントリ名
    #[arg(long, global = true, env = "OS_CLOUD")]
    os_cloud: Option<String>,

    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// サーバーを作成し、準備完了まで待機
    Create {
        /// マシン名
        name: String,
        /// ユーザーデータとして渡すファイル
        #[arg(short, long)]
        user_data: Option<PathBuf>,
    },
    /// サーバーを削除（既に存在しない場合も成功）
    Delete {
        /// マシン名
        name: String,
        /// create が返したプロバイダーID（省略時は名前で検索）
        #[arg(short, long)]
        provider_id: Option<String>,
    },
    /// 稼働中マシンのプロバイダーIDを表示
    Status {
        /// マシン名
        name: String,
    },
    /// 設定されたクラスタ・ロールのマシン一覧を表示
    List {
        /// 表ではなくJSONで出力
        #[arg(long)]
        json: bool,
    },
    /// 設定を検証
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderr、コマンドの出力はstdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = commands::ConfigSource {
        path: cli.config,
        os_cloud: cli.os_cloud,
    };

    match cli.command {
        Commands::Validate => commands::validate::handle(&source),
        Commands::Create { name, user_data } => {
            commands::create::handle(&source, &name, user_data.as_deref()).await
        }
        Commands::Delete { name, provider_id } => {
            commands::delete::handle(&source, &name, provider_id.as_deref()).await
        }
        Commands::Status { name } => commands::status::handle(&source, &name).await,
        Commands::List { json } => commands::list::handle(&source, json).await,
    }
}
