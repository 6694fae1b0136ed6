mod check;

use crate::archiver::Archiver;
use crate::config::Config;
use crate::fetch::{MediaFetcher, MediaInfo};
use crate::notify::NotificationGateway;
use crate::slideshow::SlideshowRenderer;
use crate::types::MessageId;
use crate::{Error, db::Video};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Scripted outcome for one video id at the fetcher seam
#[derive(Clone)]
enum FetchScript {
    /// Fetch succeeds with this metadata
    Media(MediaInfo),
    /// Fetch fails; the message decides transient vs. terminal downstream
    Fails(&'static str),
}

/// Fetcher that replays a per-id script and counts calls
#[derive(Default)]
struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, FetchScript>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn script(&self, video_id: &str, script: FetchScript) {
        self.scripts
            .lock()
            .unwrap()
            .insert(video_id.to_string(), script);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for ScriptedFetcher {
    async fn fetch(&self, video_id: &str, _download: bool) -> crate::Result<MediaInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(video_id)
            .cloned()
            .unwrap_or(FetchScript::Fails("Video unavailable"));
        match script {
            FetchScript::Media(info) => Ok(info),
            FetchScript::Fails(message) => Err(Error::ExternalTool(message.to_string())),
        }
    }
}

/// Renderer that always reports the configured outcome
struct StubRenderer {
    succeed: bool,
    calls: AtomicUsize,
}

impl StubRenderer {
    fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SlideshowRenderer for StubRenderer {
    async fn render(&self, _video_id: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.succeed
    }
}

/// Gateway with configurable delivery outcomes and call counters
struct StubGateway {
    notify_handle: Option<MessageId>,
    retire_ok: bool,
    notify_calls: AtomicUsize,
    retire_calls: AtomicUsize,
}

impl StubGateway {
    fn new(notify_handle: Option<MessageId>, retire_ok: bool) -> Self {
        Self {
            notify_handle,
            retire_ok,
            notify_calls: AtomicUsize::new(0),
            retire_calls: AtomicUsize::new(0),
        }
    }

    fn notify_calls(&self) -> usize {
        self.notify_calls.load(Ordering::SeqCst)
    }

    fn retire_calls(&self) -> usize {
        self.retire_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationGateway for StubGateway {
    async fn notify_removed(&self, _video: &Video) -> Option<MessageId> {
        self.notify_calls.fetch_add(1, Ordering::SeqCst);
        self.notify_handle
    }

    async fn retire_notification(&self, _handle: MessageId, _video: &Video) -> bool {
        self.retire_calls.fetch_add(1, Ordering::SeqCst);
        self.retire_ok
    }
}

struct Harness {
    archiver: Archiver,
    fetcher: Arc<ScriptedFetcher>,
    renderer: Arc<StubRenderer>,
    gateway: Arc<StubGateway>,
    tmp: TempDir,
}

/// Build an archiver over a throwaway database with scriptable collaborators
///
/// `max_retries` is 1 so fetcher call counts map 1:1 to probe attempts.
async fn harness_with(
    render_succeeds: bool,
    notify_handle: Option<MessageId>,
    retire_ok: bool,
    configure: impl FnOnce(&mut Config),
) -> Harness {
    let tmp = TempDir::new().unwrap();

    let mut config = Config::default();
    config.persistence.database_path = tmp.path().join("test.db");
    config.archive.downloads_dir = tmp.path().join("downloads");
    config.archive.tmp_dir = tmp.path().join("tmp");
    config.fetch.max_retries = 1;
    configure(&mut config);

    let fetcher = Arc::new(ScriptedFetcher::default());
    let renderer = Arc::new(StubRenderer::new(render_succeeds));
    let gateway = Arc::new(StubGateway::new(notify_handle, retire_ok));

    let archiver = Archiver::new(
        config,
        fetcher.clone(),
        renderer.clone(),
        gateway.clone(),
    )
    .await
    .unwrap();

    Harness {
        archiver,
        fetcher,
        renderer,
        gateway,
        tmp,
    }
}

async fn harness() -> Harness {
    harness_with(true, Some(MessageId::new(777)), true, |_| {}).await
}

fn media(description: &str, uploader: Option<&str>, format_id: &str) -> MediaInfo {
    MediaInfo {
        description: Some(description.to_string()),
        uploader: uploader.map(str::to_string),
        format_id: Some(format_id.to_string()),
    }
}

impl Harness {
    /// Insert a `new` row
    async fn seed(&self, id: &str, date: i64) -> Video {
        self.archiver
            .db
            .upsert_video(&crate::db::NewVideo {
                id: id.to_string(),
                date,
                author: None,
            })
            .await
            .unwrap()
    }

    /// Insert a row already committed as a successful download
    async fn seed_success(&self, id: &str, date: i64) -> Video {
        self.seed(id, date).await;
        self.archiver
            .db
            .record_download_success(id, "a video", Some("alice"), crate::types::MediaType::Video)
            .await
            .unwrap();
        self.get(id).await
    }

    /// Insert a row in the `deleted` state with an outstanding handle
    async fn seed_deleted(&self, id: &str, date: i64, handle: MessageId) -> Video {
        self.seed_success(id, date).await;
        self.archiver
            .db
            .mark_deleted(id, handle, "Video unavailable")
            .await
            .unwrap();
        self.get(id).await
    }

    async fn get(&self, id: &str) -> Video {
        self.archiver.db.get_video(id).await.unwrap().unwrap()
    }
}
