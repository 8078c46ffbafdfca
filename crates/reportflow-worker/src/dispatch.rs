//! The firing path every engine drives.
//!
//! An engine only decides *when* a key fires; [`FireDispatcher::on_fire`]
//! decides *what* happens: listener veto, `trigger_fired` hooks, the bound
//! [`JobBody`], then `trigger_complete` hooks. Firings of one key are
//! serialized; different keys run independently.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::engine::JobKey;

/// Seconds past its due time after which a firing counts as a misfire.
pub const MISFIRE_THRESHOLD_SECS: i64 = 60;

/// What one firing looks like to listeners and bodies.
#[derive(Debug, Clone)]
pub struct FireContext {
    /// Key that fired.
    pub key: JobKey,
    /// When the dispatcher picked the firing up.
    pub fired_at: DateTime<Utc>,
    /// When the firing was due, if the engine knows.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Engine-side firing number, starting at 1.
    pub fire_number: u64,
}

impl FireContext {
    /// Whether the firing arrived more than [`MISFIRE_THRESHOLD_SECS`] late.
    pub fn is_misfire(&self) -> bool {
        self.scheduled_for.is_some_and(|due| {
            self.fired_at - due > chrono::Duration::seconds(MISFIRE_THRESHOLD_SECS)
        })
    }
}

/// Work bound to a key at schedule time.
#[async_trait]
pub trait JobBody: Send + Sync + 'static {
    /// Run one firing. Failures are the body's own business.
    async fn run(&self, ctx: &FireContext);
}

/// Observer of every firing, in the order the hooks are listed.
#[async_trait]
pub trait TriggerListener: Send + Sync + Debug + 'static {
    /// Listener name, for logs.
    fn name(&self) -> &str;

    /// Return `true` to drop this firing before anything else sees it.
    async fn veto_job_execution(&self, ctx: &FireContext) -> bool;

    /// The firing is going ahead; runs before the body.
    async fn trigger_fired(&self, ctx: &FireContext);

    /// The firing came in late.
    async fn trigger_misfired(&self, ctx: &FireContext);

    /// The body returned.
    async fn trigger_complete(&self, ctx: &FireContext);
}

/// What happened to a firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Listeners ran and the body executed.
    Executed,
    /// A listener vetoed the firing.
    Vetoed,
    /// No body is bound to the key.
    Unbound,
    /// The engine declined to fire (paused or out of firings).
    Skipped,
}

/// Routes engine firings to bound bodies through the listeners.
pub struct FireDispatcher {
    listeners: Vec<Arc<dyn TriggerListener>>,
    bodies: DashMap<JobKey, Arc<dyn JobBody>>,
    locks: DashMap<JobKey, Arc<Mutex<()>>>,
}

impl Debug for FireDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FireDispatcher")
            .field("listeners", &self.listeners)
            .field("bound", &self.bodies.len())
            .finish()
    }
}

impl FireDispatcher {
    /// Create a dispatcher with a fixed set of listeners.
    pub fn new(listeners: Vec<Arc<dyn TriggerListener>>) -> Self {
        Self {
            listeners,
            bodies: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Bind the body that runs when `key` fires.
    ///
    /// An existing binding is kept; returns `false` in that case.
    pub fn bind(&self, key: JobKey, body: Arc<dyn JobBody>) -> bool {
        match self.bodies.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(body);
                true
            }
        }
    }

    /// Forget the body for `key`.
    pub fn unbind(&self, key: &JobKey) {
        self.bodies.remove(key);
        self.locks.remove(key);
    }

    /// Whether a body is bound to `key`.
    pub fn is_bound(&self, key: &JobKey) -> bool {
        self.bodies.contains_key(key)
    }

    /// Deliver one firing of `key`.
    pub async fn on_fire(
        &self,
        key: JobKey,
        scheduled_for: Option<DateTime<Utc>>,
        fire_number: u64,
    ) -> FireOutcome {
        let Some(body) = self.bodies.get(&key).map(|b| Arc::clone(b.value())) else {
            warn!(job = %key, "Firing for a key with no bound body");
            return FireOutcome::Unbound;
        };

        let lock = Arc::clone(
            self.locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let _serial = lock.lock().await;

        let ctx = FireContext {
            key,
            fired_at: Utc::now(),
            scheduled_for,
            fire_number,
        };

        if ctx.is_misfire() {
            for listener in &self.listeners {
                listener.trigger_misfired(&ctx).await;
            }
        }

        for listener in &self.listeners {
            if listener.veto_job_execution(&ctx).await {
                info!(job = %ctx.key, listener = listener.name(), "Firing vetoed");
                return FireOutcome::Vetoed;
            }
        }

        for listener in &self.listeners {
            listener.trigger_fired(&ctx).await;
        }

        debug!(job = %ctx.key, fire_number = ctx.fire_number, "Running job body");
        body.run(&ctx).await;

        for listener in &self.listeners {
            listener.trigger_complete(&ctx).await;
        }

        FireOutcome::Executed
    }
}
