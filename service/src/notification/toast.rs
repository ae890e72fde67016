//! [`Toast`] definitions.

use std::time::Duration;

use common::define_kind;
use derive_more::{AsRef, Display};
use rand::Rng as _;
use tokio::time::Instant;

use super::Config;

/// Notification message shown to a dashboard user for a short time.
#[derive(Clone, Debug)]
pub struct Toast {
    /// ID of this [`Toast`].
    pub id: Id,

    /// Text of this [`Toast`].
    pub message: String,

    /// [`Kind`] of this [`Toast`].
    pub kind: Kind,

    /// Current [`Phase`] of this [`Toast`].
    pub phase: Phase,

    /// [`Instant`] when this [`Toast`] was shown.
    pub shown_at: Instant,

    /// [`Instant`] when this [`Toast`] started being removed, if it did.
    pub removing_since: Option<Instant>,
}

impl Toast {
    /// Creates a new [`Toast`] entering the screen at the provided [`Instant`].
    #[must_use]
    pub fn new(message: impl Into<String>, kind: Kind, now: Instant) -> Self {
        Self {
            id: Id::random(),
            message: message.into(),
            kind,
            phase: Phase::Entering,
            shown_at: now,
            removing_since: None,
        }
    }

    /// Starts removal of this [`Toast`] at the provided [`Instant`].
    ///
    /// Returns `false` if this [`Toast`] is being removed already.
    pub fn start_removal(&mut self, at: Instant) -> bool {
        if self.phase == Phase::Removing {
            return false;
        }
        self.phase = Phase::Removing;
        self.removing_since = Some(at);
        true
    }

    /// Advances the [`Phase`] of this [`Toast`] up to the provided [`Instant`].
    ///
    /// Returns [`Advance::Gone`] once the exit animation has finished.
    pub fn advance(&mut self, now: Instant, config: &Config) -> Advance {
        let mut changed = false;

        if self.phase == Phase::Entering
            && now >= self.shown_at + config.enter_delay
        {
            self.phase = Phase::Visible;
            changed = true;
        }

        let expires_at = self.shown_at + config.display;
        if self.phase != Phase::Removing && now >= expires_at {
            changed |= self.start_removal(expires_at);
        }

        if let Some(since) = self.removing_since {
            if now >= since + config.exit {
                return Advance::Gone;
            }
        }

        if changed {
            Advance::Changed
        } else {
            Advance::Unchanged
        }
    }

    /// Returns the remaining share of the display time of this [`Toast`], in
    /// the `0.0..=1.0` range, as shown by its progress bar.
    #[must_use]
    pub fn progress(&self, now: Instant, display: Duration) -> f64 {
        if display.is_zero() || self.phase == Phase::Removing {
            return 0.0;
        }
        let elapsed = now.saturating_duration_since(self.shown_at);
        (1.0 - elapsed.as_secs_f64() / display.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Result of [`Toast::advance()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Advance {
    /// [`Toast`] hasn't changed.
    Unchanged,

    /// [`Toast`] has moved to another [`Phase`].
    Changed,

    /// [`Toast`] should be dropped.
    Gone,
}

/// ID of a [`Toast`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct Id(String);

impl Id {
    /// Length of an [`Id`].
    pub const LEN: usize = 7;

    /// Creates a new random [`Id`] of lower-case alphanumerics.
    #[must_use]
    pub fn random() -> Self {
        const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

        let mut rng = rand::thread_rng();
        Self(
            (0..Self::LEN)
                .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
                .collect(),
        )
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

define_kind! {
    #[doc = "Kind of a [`Toast`]."]
    enum Kind {
        #[doc = "Operation succeeded."]
        Success,

        #[doc = "Operation failed."]
        Error,

        #[doc = "Neutral information."]
        Info,

        #[doc = "Something requires attention."]
        Warning,
    }
}

impl Default for Kind {
    fn default() -> Self {
        Self::Info
    }
}

/// Lifecycle phase of a [`Toast`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Phase {
    /// [`Toast`] is added but not shown yet, so the entrance can be animated.
    Entering,

    /// [`Toast`] is fully shown.
    Visible,

    /// [`Toast`] is fading out.
    Removing,
}

/// Visual stacking of a [`Toast`] depending on its position in a stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stacking {
    /// Vertical offset towards the top, in pixels.
    pub offset_px: u32,

    /// Scale factor.
    pub scale: f64,

    /// Brightness factor.
    pub brightness: f64,

    /// Z-index, so the earlier toasts are drawn above the later ones.
    pub z_index: i32,
}

impl Stacking {
    /// Offset between neighbour toasts, in pixels.
    pub const OFFSET_STEP_PX: u32 = 8;

    /// Scale decrease between neighbour toasts.
    pub const SCALE_STEP: f64 = 0.05;

    /// Brightness decrease between neighbour toasts.
    pub const BRIGHTNESS_STEP: f64 = 0.1;

    /// Z-index of the first toast.
    pub const BASE_Z_INDEX: i32 = 50;

    /// Computes the [`Stacking`] of a [`Toast`] at the provided `index` in a
    /// stack.
    ///
    /// [`Stacking::scale`] and [`Stacking::brightness`] never go below `0`.
    #[must_use]
    pub fn at(index: usize) -> Self {
        let i = u32::try_from(index).unwrap_or(u32::MAX);
        Self {
            offset_px: i.saturating_mul(Self::OFFSET_STEP_PX),
            scale: (1.0 - f64::from(i) * Self::SCALE_STEP).max(0.0),
            brightness: (1.0 - f64::from(i) * Self::BRIGHTNESS_STEP).max(0.0),
            z_index: Self::BASE_Z_INDEX
                .saturating_sub(i32::try_from(i).unwrap_or(i32::MAX)),
        }
    }
}
