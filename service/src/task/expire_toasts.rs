//! [`ExpireToasts`] [`Task`].

use std::{convert::Infallible, error::Error, time::Duration};

use common::operations::{By, Perform, Start};
use tokio::time::{interval, MissedTickBehavior};
use tracing as log;

#[cfg(doc)]
use crate::notification::Toast;
use crate::Service;

use super::Task;

/// [`Task`] advancing the lifecycle of the [`Service`]'s [`Toast`]s, so they
/// become visible and expire on time.
#[derive(Clone, Copy, Debug)]
pub struct ExpireToasts<S> {
    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ExpireToasts<Self>, Duration>>> for Service<Db>
where
    ExpireToasts<Service<Db>>: Task<Perform<()>, Ok = (), Err: Error>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ExpireToasts<Self>, Duration>>,
    ) -> Result<Self::Ok, Self::Err> {
        let period = by.into_inner();
        let task = ExpireToasts {
            service: self.clone(),
        };

        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                tracing::error!("`task::ExpireToasts` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for ExpireToasts<Service<Db>> {
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service.toasts().tick();
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use std::{future::IntoFuture as _, time::Duration};

    use crate::{
        notification::{self, Kind},
        Config, Service,
    };

    fn config() -> Config {
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"test"),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"test"),
            deletion_ticket_ttl: Duration::from_secs(300),
            toasts: notification::Config::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drops_expired_toasts() {
        let (svc, bg) = Service::new(config(), ());
        _ = svc.toasts().show("User `Ana` deleted", Kind::Success);

        tokio::select! {
            _ = bg.into_future() => {
                unreachable!("`task::ExpireToasts` never stops")
            }
            () = tokio::time::sleep(Duration::from_millis(4_400)) => {}
        }

        assert!(svc.toasts().snapshot().is_empty());
    }
}
