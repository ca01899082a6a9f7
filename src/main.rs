use clap::Parser;
use foodseg_dashboard::{cli, config, dashboard, error, logging, session};
use cli::{Cli, Commands};
use config::Config;
use error::{DashboardError, Result};
use foodseg_common::catalog;
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    config.override_api_url(cli.api_url.clone());

    match cli.command {
        Commands::Models => {
            dashboard::print_models(&config.default_model);
        }

        Commands::Segment { image, model } => {
            let mut session = Session::from_config(&config);
            if let Some(model) = model {
                session.select_model(&model);
            }

            let pb = dashboard::spinner("セグメンテーション中...");
            session.upload(&image).await;
            pb.finish_and_clear();

            dashboard::print_result(&session.result_view());
        }

        Commands::Gallery { mode, run, model } => {
            let mut session = Session::from_config(&config);
            if let Some(model) = model {
                session.select_model(&model);
            }
            session.load_gallery().await;
            if let Some(mode) = mode {
                session.set_gallery_mode(mode).await;
            }

            match run {
                Some(file) => {
                    let pb = dashboard::spinner("セグメンテーション中...");
                    session.run_gallery(&file).await;
                    pb.finish_and_clear();
                    dashboard::print_result(&session.result_view());
                }
                None => dashboard::print_gallery(&session),
            }
        }

        Commands::Logs { page } => {
            let mut session = Session::from_config(&config);
            let pb = dashboard::spinner("ログ取得中...");
            session.open_page(page).await;
            pb.finish_and_clear();
            dashboard::print_logs(&session);
        }

        Commands::Replay { id, page } => {
            config.api_url()?;
            let mut session = Session::from_config(&config);
            let pb = dashboard::spinner("ログ取得中...");
            session.open_page(page).await;
            pb.finish_and_clear();

            if !session.open_log(id) {
                return Err(DashboardError::UnknownLog(id));
            }
            let model = session
                .history()
                .detail()
                .map(|d| d.entry().model_id.clone())
                .unwrap_or_default();
            println!("🔁 #{} を {} で再実行", id, catalog::label_for(&model));

            let pb = dashboard::spinner("再実行中...");
            session.replay().await;
            pb.finish_and_clear();

            dashboard::print_result(&session.result_view());
            dashboard::print_detail(&session);
        }

        Commands::Config { set_api_url, clear_api_url, set_model, show } => {
            // 環境変数・引数の上書きを保存しないよう、ファイルの内容から編集する
            let mut stored = Config::load_from(&Config::config_path()?)?;
            let mut changed = false;

            if let Some(url) = set_api_url {
                stored.override_api_url(Some(url));
                changed = true;
                println!("✔ APIベースアドレスを設定しました");
            }
            if clear_api_url {
                stored.api_url = None;
                changed = true;
                println!("✔ APIベースアドレスを削除しました");
            }
            if let Some(model) = set_model {
                if !catalog::contains(&model) {
                    println!("⚠ カタログに無いモデルです: {}", model);
                }
                stored.default_model = model;
                changed = true;
                println!("✔ 既定モデルを設定しました");
            }
            if changed {
                stored.save()?;
            }

            if show {
                let effective = if changed { &stored } else { &config };
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  APIベースアドレス: {}", effective.base().unwrap_or("未設定"));
                println!("  既定モデル: {}", effective.default_model);
                println!("  同梱画像: {}", effective.assets_dir.display());
                println!("  ギャラリー: {}", effective.gallery_mode.title());
            }
        }

        Commands::Dashboard => {
            let mut session = Session::from_config(&config);
            dashboard::run_interactive(&mut session).await?;
        }
    }

    Ok(())
}
