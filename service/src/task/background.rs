//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Boxed error of a [`Task`] run in a [`Background`].
type TaskError = Box<dyn Error + 'static>;

/// Background environment for running [`Task`]s.
///
/// [`Task`]s are spawned onto a [`task::LocalSet`], so they don't need to be
/// [`Send`]. Nothing runs until the [`Background`] is awaited, which resolves
/// as soon as any of its [`Task`]s fails.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s run on.
    set: task::LocalSet,

    /// Handles of the spawned [`Task`]s.
    tasks: Vec<task::JoinHandle<Result<(), TaskError>>>,
}

impl Background {
    /// Spawns a new [`Task`] inside this [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.tasks
            .push(self.set.spawn_local(future.map_err(TaskError::from)));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, tasks } = self;
        let tasks = future::try_join_all(tasks.into_iter().map(|h| {
            h.map(|res| match res {
                Ok(res) => res,
                Err(e) => Err(TaskError::from(e)),
            })
        }));
        async move { set.run_until(tasks).await }
            .map_ok(drop)
            .boxed_local()
    }
}
