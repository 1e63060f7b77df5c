//! # imgate CLI
//!
//! Gatewayを使って画像をアップロード・参照するコマンドラインクライアント。
//!
//! ## サブコマンド
//! - `upload` — 署名付きURLを取得し、ストレージへ直接PUT
//! - `proxy-upload` — Gatewayの /upload-image 経由でアップロード
//! - `list` — アップロード済みオブジェクトの一覧
//! - `url` — 署名付きダウンロードURLの取得

mod client;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use client::GatewayClient;

#[derive(Parser, Debug)]
#[command(name = "imgate", version, about = "imgate Gateway client")]
struct Cli {
    /// GatewayのベースURL
    #[arg(
        long,
        global = true,
        env = "IMGATE_GATEWAY",
        default_value = "http://localhost:3000"
    )]
    gateway: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 署名付きURLを取得してストレージへ直接アップロード
    Upload(UploadArgs),
    /// Gateway経由でアップロード（multipart `image` フィールド）
    ProxyUpload(UploadArgs),
    /// アップロード済みオブジェクトの一覧
    List,
    /// 署名付きダウンロードURLを取得
    Url {
        /// オブジェクトキー（例: uploads/1700000000000_cat.png）
        key: String,
    },
}

#[derive(clap::Args, Debug)]
struct UploadArgs {
    /// アップロードするファイル
    file: PathBuf,
    /// キーに使うファイル名（省略時はファイルのベース名）
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value = "application/octet-stream")]
    content_type: String,
}

impl UploadArgs {
    fn file_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| base_name(&self.file))
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("ファイルの読み込みに失敗: {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = GatewayClient::new(&cli.gateway)?;

    match cli.command {
        Command::Upload(args) => {
            let bytes = read_file(&args.file).await?;
            let key = client
                .upload_direct(&args.file_name(), bytes, &args.content_type)
                .await?;
            println!("{key}");
        }
        Command::ProxyUpload(args) => {
            let bytes = read_file(&args.file).await?;
            let response = client
                .upload_image(&args.file_name(), bytes, &args.content_type)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::List => {
            for image in client.images().await? {
                println!("{}\t{}", image.key, image.url);
            }
        }
        Command::Url { key } => {
            println!("{}", client.image_url(&key).await?);
        }
    }

    Ok(())
}
