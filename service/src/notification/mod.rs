//! Toast notifications of the dashboard.

pub mod toast;

use std::{sync::Arc, time::Duration};

use smart_default::SmartDefault;
use tokio::{sync::watch, time::Instant};

pub use self::toast::{Kind, Phase, Stacking, Toast};

/// Timings of the [`Toast`]s lifecycle.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Delay before an entering [`Toast`] becomes visible.
    #[default(Duration::from_millis(50))]
    pub enter_delay: Duration,

    /// Time a [`Toast`] is shown before its removal starts.
    #[default(Duration::from_secs(4))]
    pub display: Duration,

    /// Duration of a [`Toast`] exit.
    #[default(Duration::from_millis(300))]
    pub exit: Duration,

    /// Interval between [`Toasts::tick()`]s.
    #[default(Duration::from_millis(50))]
    pub tick: Duration,
}

/// Stack of the currently shown [`Toast`]s.
///
/// Every change of the stack is broadcast to its [`Toasts::subscribe()`]rs.
#[derive(Clone, Debug)]
pub struct Toasts {
    /// [`Config`] of these [`Toasts`].
    config: Config,

    /// Current stack, in order of showing.
    stack: Arc<watch::Sender<Vec<Toast>>>,
}

impl Toasts {
    /// Creates a new empty [`Toasts`] stack.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stack: Arc::new(watch::Sender::new(Vec::new())),
        }
    }

    /// Returns [`Config`] of these [`Toasts`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shows a new [`Toast`] with the provided `message`.
    pub fn show(&self, message: impl Into<String>, kind: Kind) -> toast::Id {
        let toast = Toast::new(message, kind, Instant::now());
        let id = toast.id.clone();
        tracing::debug!(id = %id, kind = %kind, "showing toast");
        self.stack.send_modify(|stack| stack.push(toast));
        id
    }

    /// Starts removal of the [`Toast`] with the provided ID.
    ///
    /// Returns `false` if there is no such [`Toast`], or it is being removed
    /// already.
    pub fn dismiss(&self, id: &toast::Id) -> bool {
        let now = Instant::now();
        self.stack.send_if_modified(|stack| {
            stack
                .iter_mut()
                .find(|t| &t.id == id)
                .is_some_and(|t| t.start_removal(now))
        })
    }

    /// Advances the lifecycle of all the [`Toast`]s up to now.
    pub fn tick(&self) {
        let now = Instant::now();
        let config = self.config;
        _ = self.stack.send_if_modified(|stack| {
            let mut modified = false;
            stack.retain_mut(|t| match t.advance(now, &config) {
                toast::Advance::Unchanged => true,
                toast::Advance::Changed => {
                    modified = true;
                    true
                }
                toast::Advance::Gone => {
                    modified = true;
                    false
                }
            });
            modified
        });
    }

    /// Returns the current stack of [`Toast`]s.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Toast> {
        self.stack.borrow().clone()
    }

    /// Subscribes to the changes of the [`Toast`]s stack.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.stack.subscribe()
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Config, Kind, Phase, Toasts};

    #[tokio::test(start_paused = true)]
    async fn shows_and_expires() {
        let toasts = Toasts::new(Config::default());
        let mut updates = toasts.subscribe();

        let id = toasts.show("User `Ana` created", Kind::Success);
        assert!(updates.has_changed().unwrap());
        let stack = updates.borrow_and_update().clone();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0].id, id);
        assert_eq!(stack[0].phase, Phase::Entering);

        tokio::time::advance(Duration::from_millis(50)).await;
        toasts.tick();
        assert_eq!(toasts.snapshot()[0].phase, Phase::Visible);
        assert!(updates.has_changed().unwrap());
        _ = updates.borrow_and_update();

        tokio::time::advance(Duration::from_millis(100)).await;
        toasts.tick();
        assert!(!updates.has_changed().unwrap());

        tokio::time::advance(Duration::from_millis(3_850)).await;
        toasts.tick();
        assert_eq!(toasts.snapshot()[0].phase, Phase::Removing);

        tokio::time::advance(Duration::from_millis(300)).await;
        toasts.tick();
        assert!(toasts.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dismisses_early() {
        let toasts = Toasts::new(Config::default());
        let first = toasts.show("first", Kind::Info);
        let second = toasts.show("second", Kind::Error);

        assert!(toasts.dismiss(&first));
        assert!(!toasts.dismiss(&first));
        assert!(!toasts.dismiss(&"missing".to_owned().into()));

        tokio::time::advance(Duration::from_millis(300)).await;
        toasts.tick();

        let stack = toasts.snapshot();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0].id, second);
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_order_of_showing() {
        let toasts = Toasts::new(Config::default());
        let ids = ["a", "b", "c"].map(|m| toasts.show(m, Kind::Info));

        let stack = toasts.snapshot();
        assert_eq!(
            stack.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
            ids,
        );
    }
}
