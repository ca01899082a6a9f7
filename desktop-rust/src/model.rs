use foodseg_common::{FetchTicket, GalleryTicket, LogPage, ReplayRequest, SegmentationResult};

/// 実行の起点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunKind {
    Upload,
    Gallery,
    Replay(ReplayRequest),
}

pub enum UiMessage {
    SegmentDone { kind: RunKind, result: SegmentationResult },
    LogsDone { ticket: FetchTicket, outcome: Result<LogPage, String> },
    GalleryDone { ticket: GalleryTicket, outcome: Result<LogPage, String> },
    ImageLoaded(ImageData),
}

/// 読み込み元アドレスをキーにしたRGBA画素
pub struct ImageData {
    pub key: String,
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn failed(key: String) -> Self {
        Self {
            key,
            size: [0, 0],
            pixels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size[0] == 0 || self.size[1] == 0
    }
}
