use clap::{Parser, Subcommand};
use foodseg_common::GalleryMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foodseg")]
#[command(about = "食品画像セグメンテーション ダッシュボード", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// APIのベースアドレス（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 選択可能なモデルを一覧表示
    Models,

    /// 画像をアップロードしてセグメンテーション
    Segment {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// モデルID（省略時は設定の既定モデル）
        #[arg(short, long)]
        model: Option<String>,
    },

    /// サンプルギャラリーを表示・実行
    Gallery {
        /// curated / history
        #[arg(long)]
        mode: Option<GalleryMode>,

        /// 指定したギャラリー画像で実行
        #[arg(long)]
        run: Option<String>,

        /// モデルID
        #[arg(short, long)]
        model: Option<String>,
    },

    /// ログ履歴を表示
    Logs {
        /// ページ番号（1始まり）
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// ログのエントリを記録時のモデルで再実行
    Replay {
        /// ログID
        #[arg(required = true)]
        id: u64,

        /// エントリが載っているページ
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// 設定を表示/編集
    Config {
        /// APIベースアドレスを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// APIベースアドレスを削除
        #[arg(long)]
        clear_api_url: bool,

        /// 既定モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 対話式ダッシュボード
    Dashboard,
}
