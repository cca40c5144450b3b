//! Indexed set of source images with aggregate load completion.
//!
//! An [`ImageSet`] owns one entry per image path (prefixed with a root) and a
//! background loader thread. Loads are fire-and-forget: the loader thread
//! records each result in the shared entry table as soon as it finishes,
//! rescans the whole set and fires the `on_load_all` callback when every
//! entry is loaded. The callback therefore runs on the loader thread.
//!
//! A load that fails leaves its entry in [`LoadState::Failed`]; the aggregate
//! callback then never fires. There is no retry and no timeout.
//!
//! Dropping the set never waits for the loader: queued requests are
//! discarded and a load in flight finishes unreported on the detached thread.
//!
//! The set is shared between the caller and any number of
//! [`Animation`](crate::resources::animation::Animation)s through an `Arc`,
//! so every method takes `&self`.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use log::{debug, info, warn};

use crate::events::imageload::{ImageLoadMessage, LoadRequest};
use crate::resources::imageloader::ImageLoader;
use crate::systems::imageload::loader_thread;

/// Callback fired once every image of a set is loaded.
pub type LoadCallback = Box<dyn FnMut() + Send>;

/// Load state of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No load was requested yet.
    Unloaded,
    /// A load is in flight.
    Loading,
    Loaded,
    Failed,
}

struct CallbackSlot {
    callback: Option<LoadCallback>,
    /// Set when the slot is written while the callback is running.
    replaced: bool,
}

struct ImageEntry<I> {
    path: String,
    image: Option<Arc<I>>,
    state: LoadState,
    generation: u64,
}

/// State touched by both the owner and the loader thread.
struct SharedEntries<I> {
    entries: RwLock<Vec<ImageEntry<I>>>,
    on_load_all: Mutex<CallbackSlot>,
}

impl<I> SharedEntries<I> {
    fn read(&self) -> RwLockReadGuard<'_, Vec<ImageEntry<I>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<ImageEntry<I>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_callback(&self) -> MutexGuard<'_, CallbackSlot> {
        self.on_load_all
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one completion, then scan the whole set.
    fn apply(&self, msg: ImageLoadMessage<I>) {
        let all_loaded = {
            let mut entries = self.write();
            let Some(entry) = entries.get_mut(msg.index()) else {
                return;
            };
            if entry.generation != msg.generation() {
                debug!(
                    "Dropping stale load of image {} (generation {} != {})",
                    msg.index(),
                    msg.generation(),
                    entry.generation
                );
                return;
            }
            match msg {
                ImageLoadMessage::Loaded { image, .. } => {
                    debug!("Loaded image {}", entry.path);
                    entry.image = Some(image);
                    entry.state = LoadState::Loaded;
                }
                ImageLoadMessage::Failed { error, .. } => {
                    warn!("{}", error);
                    entry.state = LoadState::Failed;
                }
            }
            entries.iter().all(|e| e.state == LoadState::Loaded)
        };

        if all_loaded {
            info!("All images loaded");
            self.fire_on_load_all();
        }
    }

    fn fire_on_load_all(&self) {
        // Run outside the lock so the callback may replace or clear itself.
        let taken = {
            let mut slot = self.lock_callback();
            slot.replaced = false;
            slot.callback.take()
        };
        if let Some(mut callback) = taken {
            callback();
            let mut slot = self.lock_callback();
            if !slot.replaced {
                slot.callback = Some(callback);
            }
        }
    }
}

/// Ordered list of loadable images addressed by index.
pub struct ImageSet<L: ImageLoader> {
    root: String,
    shared: Arc<SharedEntries<L::Image>>,
    tx_req: Sender<LoadRequest>,
    tx_shutdown: Sender<()>,
    /// One unit per handled request, sent after its completion (and any
    /// callback) ran.
    rx_done: Receiver<()>,
    requests_sent: AtomicU64,
    requests_done: AtomicU64,
    _loader: PhantomData<fn() -> L>,
}

impl<L: ImageLoader> ImageSet<L> {
    /// Build one entry per path, each prefixed with `root`.
    ///
    /// With `load_immediately` every entry starts loading right away;
    /// otherwise nothing loads until [`ImageSet::load`] or
    /// [`ImageSet::set_image`] is called.
    pub fn new<P: AsRef<str>>(
        loader: L,
        paths: &[P],
        root: impl Into<String>,
        load_immediately: bool,
        on_load_all: Option<LoadCallback>,
    ) -> Self {
        let root = root.into();
        let entries = paths
            .iter()
            .map(|p| ImageEntry {
                path: format!("{}{}", root, p.as_ref()),
                image: None,
                state: LoadState::Unloaded,
                generation: 0,
            })
            .collect();
        let shared = Arc::new(SharedEntries {
            entries: RwLock::new(entries),
            on_load_all: Mutex::new(CallbackSlot {
                callback: on_load_all,
                replaced: false,
            }),
        });

        let (tx_req, rx_req) = unbounded::<LoadRequest>();
        let (tx_shutdown, rx_shutdown) = bounded::<()>(1);
        let (tx_done, rx_done) = unbounded::<()>();
        let worker_shared = Arc::clone(&shared);
        // Detached; it ends on its own once the set is dropped.
        std::thread::spawn(move || {
            loader_thread(loader, rx_req, rx_shutdown, move |msg| {
                worker_shared.apply(msg);
                let _ = tx_done.send(());
            })
        });

        let set = Self {
            root,
            shared,
            tx_req,
            tx_shutdown,
            rx_done,
            requests_sent: AtomicU64::new(0),
            requests_done: AtomicU64::new(0),
            _loader: PhantomData,
        };
        if load_immediately {
            set.load();
        }
        set
    }

    /// Path prefix applied to every image path.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.shared.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Image at `index`, or `None` when out of range or not loaded yet.
    pub fn get_image(&self, index: usize) -> Option<Arc<L::Image>> {
        self.shared
            .read()
            .get(index)
            .and_then(|entry| entry.image.clone())
    }

    /// Full (root-prefixed) path of the entry at `index`.
    pub fn path(&self, index: usize) -> Option<String> {
        self.shared.read().get(index).map(|entry| entry.path.clone())
    }

    pub fn load_state(&self, index: usize) -> Option<LoadState> {
        self.shared.read().get(index).map(|entry| entry.state)
    }

    /// True when the set is non-empty and every entry is loaded.
    pub fn is_all_loaded(&self) -> bool {
        let entries = self.shared.read();
        !entries.is_empty() && entries.iter().all(|e| e.state == LoadState::Loaded)
    }

    /// Every image currently loaded, in index order.
    pub fn loaded_images(&self) -> Vec<Arc<L::Image>> {
        self.shared
            .read()
            .iter()
            .filter_map(|entry| entry.image.clone())
            .collect()
    }

    /// Replace the image at `index` with `root + relative_path` and start
    /// loading it. Out-of-range indices are ignored and return `false`.
    pub fn set_image(&self, index: usize, relative_path: &str) -> bool {
        let request = {
            let mut entries = self.shared.write();
            let Some(entry) = entries.get_mut(index) else {
                debug!("set_image: index {} out of range", index);
                return false;
            };
            entry.path = format!("{}{}", self.root, relative_path);
            Self::begin_load(index, entry)
        };
        self.send(request);
        true
    }

    /// Start loading every entry that has not been requested yet.
    pub fn load(&self) {
        let requests: Vec<LoadRequest> = {
            let mut entries = self.shared.write();
            entries
                .iter_mut()
                .enumerate()
                .filter(|(_, entry)| entry.state == LoadState::Unloaded)
                .map(|(index, entry)| Self::begin_load(index, entry))
                .collect()
        };
        for request in requests {
            self.send(request);
        }
    }

    /// Replace the aggregate completion callback.
    pub fn set_on_load_all(&self, callback: impl FnMut() + Send + 'static) {
        let mut slot = self.shared.lock_callback();
        slot.callback = Some(Box::new(callback));
        slot.replaced = true;
    }

    pub fn clear_on_load_all(&self) {
        let mut slot = self.shared.lock_callback();
        slot.callback = None;
        slot.replaced = true;
    }

    /// Block until every entry is loaded or `timeout` elapses.
    ///
    /// Returns once every request sent so far has been handled, including
    /// the `on_load_all` callback it triggered. The result is `false` on
    /// timeout or when some entry is not loaded (failed or never requested).
    /// Meant for headless tools; a render loop just keeps drawing.
    pub fn wait_for_all(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            while self.rx_done.try_recv().is_ok() {
                self.requests_done.fetch_add(1, Ordering::SeqCst);
            }
            if self.requests_done.load(Ordering::SeqCst) >= self.requests_sent.load(Ordering::SeqCst)
            {
                return self.is_all_loaded();
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx_done.recv_timeout(remaining) {
                Ok(()) => {
                    self.requests_done.fetch_add(1, Ordering::SeqCst);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return self.is_all_loaded();
                }
            }
        }
    }

    fn begin_load(index: usize, entry: &mut ImageEntry<L::Image>) -> LoadRequest {
        entry.generation += 1;
        entry.state = LoadState::Loading;
        entry.image = None;
        LoadRequest {
            index,
            generation: entry.generation,
            path: entry.path.clone(),
        }
    }

    fn send(&self, request: LoadRequest) {
        // Counted first so a fast completion never outruns its request.
        self.requests_sent.fetch_add(1, Ordering::SeqCst);
        if self.tx_req.send(request).is_err() {
            self.requests_sent.fetch_sub(1, Ordering::SeqCst);
            warn!("Image loader thread is gone; load request dropped");
        }
    }
}

impl<L: ImageLoader> Drop for ImageSet<L> {
    fn drop(&mut self) {
        let _ = self.tx_shutdown.try_send(());
        debug!("Image set dropped; loader thread signalled");
    }
}
