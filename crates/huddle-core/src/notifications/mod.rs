//! Time-evicted notification collection
//!
//! An ordered list of ephemeral notifications shared by any number of
//! producers. Each `notify` appends an entry and spawns one timer task on the
//! tokio runtime that walks the entry through its phases and evicts it after
//! its TTL. Removal is by [`NotificationId`], never by position or content,
//! and happens at most once per entry.
//!
//! Consumers read through [`NotificationCollection::snapshot`] or a
//! [`watch`] receiver from [`NotificationCollection::subscribe`]; both hand out
//! immutable slices.

mod notification;

pub use notification::{Notification, NotificationId, Phase, Severity};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::Utc;
use huddle_core_types::schema::{EVENT_DISMISS, EVENT_EVICT, EVENT_INSERT};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::NotificationConfig;
use crate::errors::{HuddleError, Result};

/// Immutable view handed to list consumers
pub type NotificationList = Arc<[Notification]>;

/// Longest lifetime a notification can be given; longer TTLs are capped
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

struct Entry {
    notification: Notification,
    timer: AbortHandle,
}

struct Inner {
    config: NotificationConfig,
    runtime: Handle,
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
    view: watch::Sender<NotificationList>,
}

impl Inner {
    fn lock_entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, entries: &[Entry]) {
        let list: NotificationList = entries.iter().map(|e| e.notification.clone()).collect();
        self.view.send_replace(list);
    }

    fn take(&self, id: NotificationId) -> Option<Entry> {
        let mut entries = self.lock_entries();
        let pos = entries.iter().position(|e| e.notification.id == id)?;
        let entry = entries.remove(pos);
        self.publish(&entries);
        Some(entry)
    }

    fn advance(&self, id: NotificationId, phase: Phase) {
        let mut entries = self.lock_entries();
        let Some(entry) = entries.iter_mut().find(|e| e.notification.id == id) else {
            return;
        };
        if entry.notification.phase < phase {
            entry.notification.phase = phase;
            self.publish(&entries);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let entries = self.entries.get_mut().unwrap_or_else(|e| e.into_inner());
        for entry in entries.drain(..) {
            entry.timer.abort();
        }
    }
}

/// Offsets from insertion at which an entry changes phase
#[derive(Debug, Clone, Copy)]
struct Schedule {
    active_at: Duration,
    leaving_at: Duration,
    evict_at: Duration,
}

impl Schedule {
    fn new(config: &NotificationConfig, ttl: Duration) -> Self {
        let active_at = Duration::from_millis(config.enter_ms).min(ttl);
        let leaving_at = ttl
            .saturating_sub(Duration::from_millis(config.leave_ms))
            .max(active_at);
        Self {
            active_at,
            leaving_at,
            evict_at: ttl,
        }
    }
}

async fn run_timer(inner: Weak<Inner>, id: NotificationId, inserted: Instant, schedule: Schedule) {
    for (offset, phase) in [
        (schedule.active_at, Phase::Active),
        (schedule.leaving_at, Phase::Leaving),
    ] {
        sleep_until(inserted + offset).await;
        match inner.upgrade() {
            Some(inner) => inner.advance(id, phase),
            None => return,
        }
    }

    sleep_until(inserted + schedule.evict_at).await;
    if let Some(inner) = inner.upgrade() {
        if inner.take(id).is_some() {
            tracing::debug!(op = "notify", event = EVENT_EVICT, notification_id = id.as_u64());
        }
    }
}

/// Shared, cheaply cloneable notification collection
#[derive(Clone)]
pub struct NotificationCollection {
    inner: Arc<Inner>,
}

impl NotificationCollection {
    /// Create a collection whose timers run on the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns `RuntimeUnavailable` outside a tokio runtime, or `Config` if
    /// the phase durations do not fit in the TTL.
    pub fn new(config: NotificationConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| HuddleError::RuntimeUnavailable)?;
        Self::with_runtime(config, runtime)
    }

    /// Create a collection whose timers run on `runtime`
    ///
    /// # Errors
    ///
    /// Returns `Config` if the phase durations do not fit in the TTL.
    pub fn with_runtime(config: NotificationConfig, runtime: Handle) -> Result<Self> {
        if config.ttl_ms == 0 || config.enter_ms.saturating_add(config.leave_ms) > config.ttl_ms {
            return Err(HuddleError::Config {
                reason: format!(
                    "notification phases ({}ms + {}ms) must fit in a positive ttl ({}ms)",
                    config.enter_ms, config.leave_ms, config.ttl_ms
                ),
            });
        }
        let (view, _) = watch::channel(NotificationList::from(Vec::new()));
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                runtime,
                next_id: AtomicU64::new(1),
                entries: Mutex::new(Vec::new()),
                view,
            }),
        })
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.inner.config
    }

    /// Append a notification that expires after the configured TTL
    pub fn notify(&self, body: impl Into<String>, severity: Severity) -> NotificationHandle {
        self.notify_with_ttl(body, severity, self.inner.config.ttl())
    }

    /// Append a notification with its own lifetime
    ///
    /// `ttl` is capped at [`MAX_TTL`]; phase durations are clamped so they fit
    /// inside it.
    pub fn notify_with_ttl(
        &self,
        body: impl Into<String>,
        severity: Severity,
        ttl: Duration,
    ) -> NotificationHandle {
        let ttl = ttl.min(MAX_TTL);
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let id = NotificationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id,
            body: body.into(),
            severity,
            created_at: Utc::now(),
            ttl_ms,
            phase: Phase::Entering,
        };
        let schedule = Schedule::new(&self.inner.config, ttl);
        let inserted = Instant::now();

        {
            let mut entries = self.inner.lock_entries();
            let timer = self
                .inner
                .runtime
                .spawn(run_timer(Arc::downgrade(&self.inner), id, inserted, schedule))
                .abort_handle();
            entries.push(Entry {
                notification,
                timer,
            });
            self.inner.publish(&entries);
        }

        tracing::debug!(
            op = "notify",
            event = EVENT_INSERT,
            notification_id = id.as_u64(),
            severity = severity.as_str(),
            ttl_ms,
        );

        NotificationHandle {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Remove `id` the way its expiry timer does
    ///
    /// Returns `false` if it was already gone; calling it again is a no-op.
    /// The entry's own timer finds nothing to remove when it fires.
    pub fn evict(&self, id: NotificationId) -> bool {
        let removed = self.inner.take(id).is_some();
        if removed {
            tracing::debug!(op = "notify", event = EVENT_EVICT, notification_id = id.as_u64());
        }
        removed
    }

    /// Remove `id` now and cancel its expiry timer
    ///
    /// Returns `false` if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        dismiss(&self.inner, id)
    }

    /// Current entries in display order
    pub fn snapshot(&self) -> NotificationList {
        self.inner.view.borrow().clone()
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.inner
            .lock_entries()
            .iter()
            .find(|e| e.notification.id == id)
            .map(|e| e.notification.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live view; a new slice is published on every insert, phase change
    /// and removal
    pub fn subscribe(&self) -> watch::Receiver<NotificationList> {
        self.inner.view.subscribe()
    }
}

impl std::fmt::Debug for NotificationCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCollection")
            .field("config", &self.inner.config)
            .field("len", &self.len())
            .finish()
    }
}

fn dismiss(inner: &Inner, id: NotificationId) -> bool {
    let Some(entry) = inner.take(id) else {
        return false;
    };
    entry.timer.abort();
    tracing::debug!(op = "notify", event = EVENT_DISMISS, notification_id = id.as_u64());
    true
}

/// Reference to one notification returned by `notify`
///
/// Does not keep the collection alive.
#[derive(Debug, Clone)]
pub struct NotificationHandle {
    id: NotificationId,
    inner: Weak<Inner>,
}

impl NotificationHandle {
    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn is_present(&self) -> bool {
        self.phase() != Phase::Removed
    }

    /// Current phase, `Removed` once evicted or dismissed
    pub fn phase(&self) -> Phase {
        self.inner
            .upgrade()
            .and_then(|inner| {
                inner
                    .lock_entries()
                    .iter()
                    .find(|e| e.notification.id == self.id)
                    .map(|e| e.notification.phase)
            })
            .unwrap_or(Phase::Removed)
    }

    /// Remove the notification now; `false` if it was already gone
    pub fn dismiss(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| dismiss(&inner, self.id))
    }
}
