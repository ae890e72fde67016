//! [`Toast`]-related definitions.

use derive_more::{AsRef, Display, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::notification;
use tokio::time::{Duration, Instant};

use crate::{api, Context};

/// Notification shown on the dashboard for a short time.
#[derive(Clone, Debug)]
pub struct Toast {
    /// Underlying [`notification::Toast`].
    toast: notification::Toast,

    /// Position of this [`Toast`] in the stack.
    index: usize,

    /// Time this [`Toast`] is displayed before its removal starts.
    display: Duration,

    /// [`Instant`] the stack was captured at.
    captured_at: Instant,
}

impl Toast {
    /// Wraps the provided stack of [`notification::Toast`]s.
    #[must_use]
    pub fn stack(
        stack: Vec<notification::Toast>,
        config: &notification::Config,
    ) -> Vec<Self> {
        let captured_at = Instant::now();
        stack
            .into_iter()
            .enumerate()
            .map(|(index, toast)| Self {
                toast,
                index,
                display: config.display,
                captured_at,
            })
            .collect()
    }
}

/// Notification shown on the dashboard for a short time.
#[graphql_object(context = Context)]
impl Toast {
    /// Unique identifier of this `Toast`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.toast.id.clone().into()
    }

    /// Text of this `Toast`.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.toast.message
    }

    /// Kind of this `Toast`.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.toast.kind.into()
    }

    /// Current lifecycle phase of this `Toast`.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.toast.phase.into()
    }

    /// Remaining share of the display time, from `1.0` down to `0.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.toast.progress(self.captured_at, self.display)
    }

    /// Position of this `Toast` in the stack, the first shown being `0`.
    #[must_use]
    pub fn index(&self) -> i32 {
        api::int(self.index)
    }

    /// Visual stacking of this `Toast`.
    #[must_use]
    pub fn stacking(&self) -> Stacking {
        notification::Stacking::at(self.index).into()
    }
}

/// Unique identifier of a `Toast`.
#[derive(AsRef, Clone, Debug, Display, GraphQLScalar, Into)]
#[as_ref(str)]
#[graphql(name = "ToastId", transparent)]
pub struct Id(String);

impl From<notification::toast::Id> for Id {
    fn from(id: notification::toast::Id) -> Self {
        Self(id.as_ref().to_owned())
    }
}

impl From<Id> for notification::toast::Id {
    fn from(Id(id): Id) -> Self {
        id.into()
    }
}

/// Kind of a `Toast`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ToastKind")]
pub enum Kind {
    /// Operation succeeded.
    Success,

    /// Operation failed.
    Error,

    /// Neutral information.
    Info,

    /// Something requires attention.
    Warning,
}

impl From<notification::Kind> for Kind {
    fn from(kind: notification::Kind) -> Self {
        use notification::Kind as K;

        match kind {
            K::Success => Self::Success,
            K::Error => Self::Error,
            K::Info => Self::Info,
            K::Warning => Self::Warning,
        }
    }
}

/// Lifecycle phase of a `Toast`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ToastPhase")]
pub enum Phase {
    /// `Toast` is added, but its entrance is not finished yet.
    Entering,

    /// `Toast` is fully shown.
    Visible,

    /// `Toast` is fading out.
    Removing,
}

impl From<notification::Phase> for Phase {
    fn from(phase: notification::Phase) -> Self {
        use notification::Phase as P;

        match phase {
            P::Entering => Self::Entering,
            P::Visible => Self::Visible,
            P::Removing => Self::Removing,
        }
    }
}

/// Visual stacking of a `Toast`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "ToastStacking")]
pub struct Stacking {
    /// Vertical offset towards the top, in pixels.
    pub offset_px: i32,

    /// Scale factor.
    pub scale: f64,

    /// Brightness factor.
    pub brightness: f64,

    /// Z-index.
    pub z_index: i32,
}

impl From<notification::Stacking> for Stacking {
    fn from(s: notification::Stacking) -> Self {
        Self {
            offset_px: api::int(s.offset_px),
            scale: s.scale,
            brightness: s.brightness,
            z_index: s.z_index,
        }
    }
}
