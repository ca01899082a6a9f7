//! セッションの結合テスト
//!
//! 偽のバックエンドで、送信 → 結果 → 履歴の再取得 → 再実行の流れを検証

use foodseg_common::{GalleryMode, ImagePayload, ImageVariant, LogEntry, LogPage, PageNav, ResultView, SegmentResponse, Prediction};
use foodseg_dashboard::api::SegmentBackend;
use foodseg_dashboard::config::Config;
use foodseg_dashboard::error::{DashboardError, Result};
use foodseg_dashboard::session::Session;
use std::sync::Mutex;
use tempfile::tempdir;

const BASE: &str = "http://fake";

#[derive(Default)]
struct FakeBackend {
    entries: Vec<LogEntry>,
    fail_segment: bool,
    fail_logs: bool,
    segments: Mutex<Vec<(String, String)>>,
    log_calls: Mutex<Vec<(u32, u32)>>,
    fetches: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn with_entries(count: u64) -> Self {
        Self {
            entries: (1..=count).map(entry).collect(),
            ..Default::default()
        }
    }

    fn segments(&self) -> Vec<(String, String)> {
        self.segments.lock().unwrap().clone()
    }

    fn log_calls(&self) -> Vec<(u32, u32)> {
        self.log_calls.lock().unwrap().clone()
    }

    fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.log_calls.lock().unwrap().clear();
    }
}

impl SegmentBackend for FakeBackend {
    fn base(&self) -> &str {
        BASE
    }

    async fn segment(&self, payload: &ImagePayload, model: &str) -> Result<SegmentResponse> {
        self.segments
            .lock()
            .unwrap()
            .push((payload.file_name.clone(), model.to_string()));
        if self.fail_segment {
            return Err(DashboardError::Status {
                url: format!("{}/segment", BASE),
                status: 500,
            });
        }
        Ok(SegmentResponse {
            results: vec![Prediction { label: "rice".into(), confidence: 91.234 }],
            image: Some(payload.file_name.clone()),
            resized_image: None,
            model: Some(model.to_string()),
            error: None,
        })
    }

    async fn logs(&self, page: u32, page_size: u32) -> Result<LogPage> {
        self.log_calls.lock().unwrap().push((page, page_size));
        if self.fail_logs {
            return Err(DashboardError::Status {
                url: format!("{}/logs", BASE),
                status: 503,
            });
        }
        let start = ((page.max(1) - 1) * page_size) as usize;
        let items = self
            .entries
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok(LogPage {
            items,
            total: self.entries.len() as u64,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetches.lock().unwrap().push(url.to_string());
        Ok(b"fake image".to_vec())
    }
}

fn entry(id: u64) -> LogEntry {
    LogEntry {
        id,
        image_ref: format!("plate{}.jpg", id),
        model_id: "v2.1-Ultralytics-Hub".into(),
        best_prediction: Some("rice".into()),
        confidence: Some(88.5),
        detection_count: Some(2),
        timestamp: "2024-05-01 12:00:00".into(),
    }
}

fn session(backend: FakeBackend) -> Session<FakeBackend> {
    Session::new(Some(backend), &Config::default())
}

fn write_image(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\xFF\xD8 jpeg").unwrap();
    path
}

/// アップロードは選んだモデルIDをそのまま送り、成功で履歴1ページ目を再取得する
#[tokio::test]
async fn test_upload_sends_model_and_refreshes_logs() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_image(dir.path(), "lunch.jpg");

    let mut session = session(FakeBackend::with_entries(3));
    session.start().await;
    session.backend().unwrap().clear_calls();
    let before = session.reload_token();

    session.select_model("yolov8n-seg");
    let result = session.upload(&image).await;
    assert!(result.is_success());
    assert_eq!(result.model_used.as_deref(), Some("yolov8n-seg"));
    assert_eq!(result.processed_image_ref.as_deref(), Some("segmented_lunch.jpg"));

    let backend = session.backend().unwrap();
    assert_eq!(backend.segments(), vec![("lunch.jpg".to_string(), "yolov8n-seg".to_string())]);
    assert_eq!(backend.log_calls(), vec![(1, 5)]);
    assert_eq!(session.reload_token().value(), before.value() + 1);

    match session.result_view() {
        ResultView::Ranked { banner, lines, image_url, .. } => {
            assert_eq!(banner, "Model Used: yolov8n-seg");
            assert_eq!(lines, vec!["1. rice: 91.23%".to_string()]);
            assert_eq!(
                image_url.as_deref(),
                Some("http://fake/uploads/models/segmented_lunch.jpg")
            );
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

/// 失敗した送信はトークンを進めず、発生元タグ付きのエラーになる
#[tokio::test]
async fn test_failed_upload_keeps_token() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_image(dir.path(), "lunch.jpg");

    let mut session = session(FakeBackend {
        fail_segment: true,
        ..FakeBackend::with_entries(3)
    });
    session.start().await;
    session.backend().unwrap().clear_calls();
    let before = session.reload_token();

    let result = session.upload(&image).await;
    assert!(!result.is_success());
    let message = result.error.as_ref().unwrap().to_string();
    assert!(message.ends_with("[http://fake]"), "{}", message);

    assert_eq!(session.reload_token(), before);
    assert!(session.backend().unwrap().log_calls().is_empty());
    assert!(matches!(session.result_view(), ResultView::Error(_)));
}

/// 存在しないファイルは送信せずにエラー
#[tokio::test]
async fn test_upload_missing_file() {
    let mut session = session(FakeBackend::with_entries(1));
    let result = session.upload(std::path::Path::new("/nonexistent/foodseg/x.jpg")).await;
    assert!(!result.is_success());
    assert!(session.backend().unwrap().segments().is_empty());
}

/// 再実行は選択中のモデルではなくエントリのモデルを使う
#[tokio::test]
async fn test_replay_uses_entry_model() {
    let mut session = session(FakeBackend::with_entries(3));
    session.start().await;
    session.select_model("yolov8n-seg");

    assert!(session.open_log(2));
    assert_eq!(session.history().detail().unwrap().variant(), ImageVariant::Original);
    assert!(session.replay().await);

    let backend = session.backend().unwrap();
    assert_eq!(
        backend.segments(),
        vec![("plate2.jpg".to_string(), "v2.1-Ultralytics-Hub".to_string())]
    );
    assert_eq!(backend.fetches(), vec!["http://fake/uploads/plate2.jpg".to_string()]);

    let detail = session.history().detail().unwrap();
    assert_eq!(detail.variant(), ImageVariant::Segmented);
    assert!(!session.history().is_replaying());
    let url = session.log_image_url().unwrap();
    assert!(url.starts_with("http://fake/uploads/models/segmented_plate2.jpg?t="), "{}", url);
    assert_eq!(session.result().model_used.as_deref(), Some("v2.1-Ultralytics-Hub"));
}

/// 再実行の失敗は Logs タグ付き
#[tokio::test]
async fn test_replay_failure_tagged_logs() {
    let mut session = session(FakeBackend {
        fail_segment: true,
        ..FakeBackend::with_entries(3)
    });
    session.start().await;
    assert!(session.open_log(1));
    assert!(session.replay().await);

    let message = session.result().error.as_ref().unwrap().to_string();
    assert!(message.ends_with("[Logs]"), "{}", message);
    let detail = session.history().detail().unwrap();
    assert_eq!(detail.variant(), ImageVariant::Original);
    assert!(!session.history().is_replaying());
}

/// 1ページ目でのトークン変化は1回だけ取得し、ページはそのまま
#[tokio::test]
async fn test_token_change_on_first_page_fetches_once() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_image(dir.path(), "lunch.jpg");

    let mut session = session(FakeBackend::with_entries(12));
    session.start().await;
    session.backend().unwrap().clear_calls();

    session.upload(&image).await;
    assert_eq!(session.backend().unwrap().log_calls(), vec![(1, 5)]);
    assert_eq!(session.history().pagination().page(), 1);
}

/// 2ページ目でのトークン変化は1ページ目へ戻る
#[tokio::test]
async fn test_token_change_on_later_page_jumps_to_first() {
    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_image(dir.path(), "lunch.jpg");

    let mut session = session(FakeBackend::with_entries(12));
    session.start().await;
    assert!(session.navigate(PageNav::Next).await);
    assert_eq!(session.history().pagination().page(), 2);
    assert_eq!(session.history().entries()[0].id, 6);
    session.backend().unwrap().clear_calls();

    session.upload(&image).await;
    assert_eq!(session.backend().unwrap().log_calls(), vec![(1, 5)]);
    assert_eq!(session.history().pagination().page(), 1);
    assert_eq!(session.history().entries()[0].id, 1);
}

/// 最終ページで Next は何も要求しない
#[tokio::test]
async fn test_next_on_last_page_is_noop() {
    let mut session = session(FakeBackend::with_entries(12));
    session.start().await;
    assert!(session.navigate(PageNav::Last).await);
    assert_eq!(session.history().pagination().page(), 3);
    assert_eq!(session.history().entries().len(), 2);
    session.backend().unwrap().clear_calls();

    assert!(!session.navigate(PageNav::Next).await);
    assert!(session.backend().unwrap().log_calls().is_empty());
    assert!(!session.history().can_navigate(PageNav::Next));
    assert!(session.history().can_navigate(PageNav::Previous));
}

/// ログ取得失敗は空表示
#[tokio::test]
async fn test_logs_failure_shows_empty() {
    let mut session = session(FakeBackend {
        fail_logs: true,
        ..FakeBackend::with_entries(3)
    });
    session.start().await;
    assert!(session.history().is_empty());
    assert_eq!(session.history().pagination().total_pages(), 1);
}

/// ギャラリー実行は gallery アドレスから取得し、選択中のモデルで送る
#[tokio::test]
async fn test_gallery_run_uses_selected_model() {
    let mut session = session(FakeBackend::with_entries(3));
    session.start().await;
    session.select_model("yolov8s-seg");

    assert!(session.run_gallery("mix_veg1.png").await);
    let backend = session.backend().unwrap();
    assert_eq!(backend.fetches(), vec!["http://fake/uploads/gallery/mix_veg1.png".to_string()]);
    assert_eq!(
        backend.segments(),
        vec![("mix_veg1.png".to_string(), "yolov8s-seg".to_string())]
    );
    assert!(!session.gallery().is_running());
}

#[tokio::test]
async fn test_gallery_failure_tagged_gallery() {
    let mut session = session(FakeBackend {
        fail_segment: true,
        ..FakeBackend::with_entries(3)
    });
    session.start().await;
    session.run_gallery("mix_veg1.png").await;

    let message = session.result().error.as_ref().unwrap().to_string();
    assert!(message.ends_with("[Gallery]"), "{}", message);
}

/// 履歴モードでは最新のログ画像を並べる
#[tokio::test]
async fn test_gallery_history_mode() {
    let mut session = session(FakeBackend::with_entries(12));
    session.start().await;
    session.backend().unwrap().clear_calls();

    session.set_gallery_mode(GalleryMode::History).await;
    assert_eq!(session.backend().unwrap().log_calls(), vec![(1, 9)]);
    let items = session.gallery().items();
    assert_eq!(items.len(), 9);
    assert_eq!(items[0].image_ref, "plate1.jpg");
}

/// ベースアドレスが無ければログは空で、理由を表示する
#[tokio::test]
async fn test_unconfigured_session() {
    let mut session: Session<FakeBackend> = Session::new(None, &Config::default());
    session.start().await;

    assert!(session.history().is_empty());
    assert!(session.logs_notice().is_some());
    assert_eq!(session.gallery().mode(), GalleryMode::Curated);
    assert_eq!(session.gallery().items().len(), 9);

    let dir = tempdir().expect("Failed to create temp dir");
    let image = write_image(dir.path(), "lunch.jpg");
    let result = session.upload(&image).await;
    assert!(!result.is_success());
}

/// オフラインでも同梱のキュレーション画像は読める（送信先が無いので失敗はする）
#[tokio::test]
async fn test_offline_curated_image_is_read() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_image(dir.path(), "mix_veg1.png");
    let config = Config {
        assets_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let mut session: Session<FakeBackend> = Session::new(None, &config);
    session.start().await;
    assert!(session.run_gallery("mix_veg1.png").await);

    let error = session.result().error.as_ref().unwrap();
    assert_eq!(error.message, DashboardError::NotConfigured.to_string());
    assert!(error.to_string().ends_with("[Gallery]"));

    session.run_gallery("missing.png").await;
    let error = session.result().error.as_ref().unwrap();
    assert!(error.message.contains("missing.png"), "{}", error.message);
}

/// 結果画像の切替は新しい結果で Segmented に戻る
#[tokio::test]
async fn test_result_image_toggle_resets_on_new_result() {
    let dir = tempdir().expect("Failed to create temp dir");
    let first = write_image(dir.path(), "a.jpg");
    let second = write_image(dir.path(), "b.jpg");

    let mut session = session(FakeBackend::with_entries(1));
    session.upload(&first).await;
    session.toggle_result_image();
    match session.result_view() {
        ResultView::Ranked { image_url, .. } => {
            assert_eq!(image_url.as_deref(), Some("http://fake/uploads/a.jpg"));
        }
        other => panic!("unexpected view: {:?}", other),
    }

    session.upload(&second).await;
    match session.result_view() {
        ResultView::Ranked { image_url, .. } => {
            assert_eq!(
                image_url.as_deref(),
                Some("http://fake/uploads/models/segmented_b.jpg")
            );
        }
        other => panic!("unexpected view: {:?}", other),
    }
}
