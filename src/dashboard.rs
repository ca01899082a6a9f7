//! 端末用ダッシュボード
//!
//! 結果パネル・ログ表・ギャラリーの描画と、dialoguer による対話メニュー。

use crate::api::SegmentBackend;
use crate::error::Result;
use crate::session::Session;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use foodseg_common::render::{self, LogRow};
use foodseg_common::{catalog, GalleryMode, PageNav, ResultView};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// 通信中のスピナー
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_models(selected: &str) {
    println!("モデル一覧:");
    for option in catalog::list() {
        let mark = if option.id == selected { "*" } else { " " };
        println!(" {} {:<34} {}", mark, option.id, option.label);
    }
}

pub fn print_result(view: &ResultView) {
    println!("\n== Segmentation Results ==");
    match view {
        ResultView::Error(message) => println!("✖ {}", message),
        ResultView::Prompt => println!("⚠ {}", render::UPLOAD_PROMPT),
        ResultView::Ranked { banner, lines, alt, image_url } => {
            println!("✔ {}", banner);
            for line in lines {
                println!("  {}", line);
            }
            if let Some(url) = image_url {
                println!("  画像: {} ({})", url, alt);
            }
        }
    }
}

pub fn print_logs<B: SegmentBackend>(session: &Session<B>) {
    let history = session.history();
    println!("\n== Logs ==");
    if let Some(notice) = session.logs_notice() {
        println!("⚠ {}", notice);
    }

    if history.is_empty() {
        println!("  {}", render::NO_LOGS);
    } else {
        println!(
            "  {:>5}  {:<28} {:<24} {:<16} {:>10}  {}",
            "ID", "Image", "Model", "Best Prediction", "Confidence", "Date"
        );
        for entry in history.entries() {
            let row = LogRow::from(entry);
            println!(
                "  {:>5}  {:<28} {:<24} {:<16} {:>10}  {}",
                row.id, row.image, row.model, row.prediction, row.confidence, row.date
            );
        }
    }

    let pagination = history.pagination();
    println!(
        "  {}  |  {}",
        render::page_caption(pagination),
        render::total_caption(pagination)
    );
}

pub fn print_gallery<B: SegmentBackend>(session: &Session<B>) {
    let gallery = session.gallery();
    println!("\n== {} ==", gallery.mode().title());
    if gallery.items().is_empty() {
        println!("  {}", gallery.mode().empty_message());
        return;
    }
    for item in gallery.items() {
        println!("  [{}] {}", item.id, item.image_ref);
    }
}

pub fn print_detail<B: SegmentBackend>(session: &Session<B>) {
    let Some(detail) = session.history().detail() else {
        return;
    };
    let entry = detail.entry();
    println!("\n== Log #{} ==", entry.id);
    if let Some(url) = session.log_image_url() {
        println!("  {}: {}", detail.variant().label(), url);
    }
    for (label, value) in render::detail_fields(entry) {
        println!("  {:<20} {}", label, value);
    }
    if !detail.can_toggle() {
        println!("  (segmented image not available)");
    }
}

#[derive(Clone, Copy)]
enum MenuAction {
    Upload,
    ChooseModel,
    Gallery,
    SwitchGallery,
    ToggleResultImage,
    Page(PageNav),
    ReloadLogs,
    OpenLog,
    ToggleLogImage,
    RunAgain,
    CloseLog,
    Quit,
}

fn menu<B: SegmentBackend>(session: &Session<B>) -> Vec<(MenuAction, String)> {
    let history = session.history();
    let mut actions = vec![
        (MenuAction::Upload, "画像をアップロード".to_string()),
        (
            MenuAction::ChooseModel,
            format!("モデルを選択 ({})", catalog::label_for(session.selected_model())),
        ),
        (MenuAction::Gallery, format!("{}から選ぶ", session.gallery().mode().title())),
        (MenuAction::SwitchGallery, "ギャラリー切替 (Curated/History)".to_string()),
    ];

    if matches!(session.result_view(), ResultView::Ranked { .. }) {
        actions.push((MenuAction::ToggleResultImage, "結果画像の切替 (Original/Segmented)".to_string()));
    }

    for (nav, label) in [
        (PageNav::Previous, "Previous"),
        (PageNav::Next, "Next"),
        (PageNav::First, "First"),
        (PageNav::Last, "Last"),
    ] {
        if history.can_navigate(nav) {
            actions.push((MenuAction::Page(nav), format!("ログ: {}", label)));
        }
    }
    actions.push((MenuAction::ReloadLogs, "ログ: Reload".to_string()));

    if !history.entries().is_empty() {
        actions.push((MenuAction::OpenLog, "ログの詳細を開く".to_string()));
    }
    if let Some(detail) = history.detail() {
        if detail.can_toggle() {
            actions.push((MenuAction::ToggleLogImage, "詳細画像の切替".to_string()));
        }
        actions.push((MenuAction::RunAgain, format!("Run again (#{})", detail.entry().id)));
        actions.push((MenuAction::CloseLog, "詳細を閉じる".to_string()));
    }

    actions.push((MenuAction::Quit, "終了".to_string()));
    actions
}

/// 対話式ダッシュボードを実行
pub async fn run_interactive<B: SegmentBackend>(session: &mut Session<B>) -> Result<()> {
    let theme = ColorfulTheme::default();

    let pb = spinner("読み込み中...");
    session.start().await;
    pb.finish_and_clear();

    loop {
        print_result(&session.result_view());
        print_logs(session);
        print_detail(session);

        let actions = menu(session);
        let labels: Vec<&str> = actions.iter().map(|(_, label)| label.as_str()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("操作")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice].0 {
            MenuAction::Upload => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("画像ファイルのパス")
                    .interact_text()?;
                let pb = spinner("セグメンテーション中...");
                session.upload(&PathBuf::from(path.trim())).await;
                pb.finish_and_clear();
            }
            MenuAction::ChooseModel => {
                let options = catalog::list();
                let labels: Vec<&str> = options.iter().map(|o| o.label).collect();
                let current = options
                    .iter()
                    .position(|o| o.id == session.selected_model())
                    .unwrap_or(0);
                let idx = Select::with_theme(&theme)
                    .with_prompt("モデル")
                    .items(&labels)
                    .default(current)
                    .interact()?;
                session.select_model(options[idx].id);
            }
            MenuAction::Gallery => {
                print_gallery(session);
                let items: Vec<String> = session
                    .gallery()
                    .items()
                    .iter()
                    .map(|item| item.image_ref.clone())
                    .collect();
                if items.is_empty() {
                    continue;
                }
                let idx = Select::with_theme(&theme)
                    .with_prompt(format!("Run with {}", session.selected_model()))
                    .items(&items)
                    .default(0)
                    .interact()?;
                let pb = spinner("セグメンテーション中...");
                session.run_gallery(&items[idx]).await;
                pb.finish_and_clear();
            }
            MenuAction::SwitchGallery => {
                let next = match session.gallery().mode() {
                    GalleryMode::Curated => GalleryMode::History,
                    GalleryMode::History => GalleryMode::Curated,
                };
                session.set_gallery_mode(next).await;
                print_gallery(session);
            }
            MenuAction::ToggleResultImage => session.toggle_result_image(),
            MenuAction::Page(nav) => {
                let pb = spinner("ログ取得中...");
                session.navigate(nav).await;
                pb.finish_and_clear();
            }
            MenuAction::ReloadLogs => {
                let pb = spinner("ログ取得中...");
                session.reload_logs().await;
                pb.finish_and_clear();
            }
            MenuAction::OpenLog => {
                let entries: Vec<(u64, String)> = session
                    .history()
                    .entries()
                    .iter()
                    .map(|e| (e.id, format!("#{} {} ({})", e.id, e.image_ref, e.model_id)))
                    .collect();
                let labels: Vec<&str> = entries.iter().map(|(_, label)| label.as_str()).collect();
                let idx = Select::with_theme(&theme)
                    .with_prompt("ログ")
                    .items(&labels)
                    .default(0)
                    .interact()?;
                session.open_log(entries[idx].0);
            }
            MenuAction::ToggleLogImage => {
                session.toggle_log_image();
            }
            MenuAction::RunAgain => {
                let pb = spinner("再実行中...");
                session.replay().await;
                pb.finish_and_clear();
            }
            MenuAction::CloseLog => session.close_log(),
            MenuAction::Quit => break,
        }
    }

    Ok(())
}
