//! In-memory image cache with load de-duplication
//!
//! Loaded images are kept by URL for the life of the cache; nothing is
//! evicted. A second request for a URL that is still loading joins the
//! first load instead of fetching again. Loads run as detached tasks, so a
//! caller that stops waiting does not cancel the load for anyone else.
//!
//! Loads run on the current tokio runtime; outside one they fail with
//! [`ImageError::NoRuntime`].

use super::{CardImage, CardTexture, FsSource, ImageError, ImageSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Outcome of one image load
pub type LoadResult = Result<Arc<CardImage>, ImageError>;

/// `None` until the load finishes
type LoadSlot = watch::Receiver<Option<LoadResult>>;

#[derive(Debug, Default)]
struct CacheState {
    ready: HashMap<String, Arc<CardImage>>,
    loading: HashMap<String, LoadSlot>,
    fetches_started: u64,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub cached: usize,
    pub in_flight: usize,
    /// Underlying fetches started since creation
    pub fetches_started: u64,
}

/// Image cache shared by every card viewer
#[derive(Debug)]
pub struct ImageCache<S = FsSource> {
    state: Arc<Mutex<CacheState>>,
    source: Arc<S>,
}

impl<S> Clone for ImageCache<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            source: Arc::clone(&self.source),
        }
    }
}

impl Default for ImageCache<FsSource> {
    fn default() -> Self {
        Self::new(FsSource::default())
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    // Critical sections never panic mid-update, the data stays consistent
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Pending {
    Ready(Arc<CardImage>),
    Loading { url: String, slot: LoadSlot },
    Failed(ImageError),
}

impl Pending {
    async fn wait(self) -> LoadResult {
        match self {
            Self::Ready(img) => Ok(img),
            Self::Failed(e) => Err(e),
            Self::Loading { url, mut slot } => match slot.wait_for(Option::is_some).await {
                Ok(done) => (*done)
                    .clone()
                    .unwrap_or(Err(ImageError::Abandoned { url })),
                Err(_) => Err(ImageError::Abandoned { url }),
            },
        }
    }
}

impl<S: ImageSource> ImageCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            source: Arc::new(source),
        }
    }

    /// Cached image for `url`, if loaded
    pub fn get_cached_image(&self, url: &str) -> Option<Arc<CardImage>> {
        lock(&self.state).ready.get(url).cloned()
    }

    /// Load `url`, reusing the cached image or an in-flight load.
    ///
    /// Failures are not cached; the next call fetches again.
    pub async fn preload_image(&self, url: &str) -> LoadResult {
        self.begin(url).wait().await
    }

    /// Load every URL concurrently, one result per URL in input order.
    ///
    /// A failed URL does not affect the others.
    pub async fn preload_images<U: AsRef<str>>(&self, urls: &[U]) -> Vec<LoadResult> {
        let pending: Vec<Pending> = urls.iter().map(|url| self.begin(url.as_ref())).collect();

        let mut results = Vec::with_capacity(pending.len());
        for p in pending {
            results.push(p.wait().await);
        }
        results
    }

    /// Load `url`, degrading to the grey placeholder on failure
    pub async fn texture_or_placeholder(&self, url: &str) -> CardTexture {
        match self.preload_image(url).await {
            Ok(img) => CardTexture::Image(img),
            Err(e) => {
                tracing::warn!("Using placeholder texture: {}", e);
                CardTexture::Placeholder
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        CacheStats {
            cached: state.ready.len(),
            in_flight: state.loading.len(),
            fetches_started: state.fetches_started,
        }
    }

    fn begin(&self, url: &str) -> Pending {
        let mut state = lock(&self.state);

        if let Some(img) = state.ready.get(url) {
            return Pending::Ready(Arc::clone(img));
        }
        if let Some(slot) = state.loading.get(url) {
            tracing::trace!("Joining in-flight load: {}", url);
            return Pending::Loading {
                url: url.to_string(),
                slot: slot.clone(),
            };
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime to load {}", url);
            return Pending::Failed(ImageError::NoRuntime {
                url: url.to_string(),
            });
        };

        let (tx, slot) = watch::channel(None);
        state.loading.insert(url.to_string(), slot.clone());
        state.fetches_started += 1;
        drop(state);

        let guard = LoadGuard {
            state: Arc::clone(&self.state),
            url: url.to_string(),
            tx,
            armed: true,
        };
        runtime.spawn(load(guard, Arc::clone(&self.source)));

        Pending::Loading {
            url: url.to_string(),
            slot,
        }
    }
}

/// Clears the `loading` entry if the load task ends without publishing,
/// whether by panic or by abort. Waiters are released only afterwards,
/// when `tx` drops.
struct LoadGuard {
    state: Arc<Mutex<CacheState>>,
    url: String,
    tx: watch::Sender<Option<LoadResult>>,
    armed: bool,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Image load for {} ended without a result", self.url);
            lock(&self.state).loading.remove(&self.url);
        }
    }
}

async fn load<S: ImageSource>(mut guard: LoadGuard, source: Arc<S>) {
    let url = guard.url.clone();
    tracing::debug!("Loading image: {}", url);
    let result = fetch_and_decode(source.as_ref(), &url).await.map(Arc::new);

    {
        let mut state = lock(&guard.state);
        state.loading.remove(&url);
        if let Ok(img) = &result {
            state.ready.insert(url.clone(), Arc::clone(img));
        }
    }
    guard.armed = false;

    match &result {
        Ok(img) => tracing::info!("Image cached: {} ({}x{})", url, img.width, img.height),
        Err(e) => tracing::warn!("{}", e),
    }

    guard.tx.send_replace(Some(result));
}

async fn fetch_and_decode<S: ImageSource>(source: &S, url: &str) -> Result<CardImage, ImageError> {
    let bytes = source.fetch(url).await?;

    let task_url = url.to_string();
    tokio::task::spawn_blocking(move || CardImage::decode(&task_url, &bytes))
        .await
        .map_err(|e| ImageError::Decode {
            url: url.to_string(),
            reason: format!("decoder task failed: {e}"),
        })?
}
