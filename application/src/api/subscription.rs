//! GraphQL [`Subscription`]s definitions.

use futures::{
    future,
    stream::{self, BoxStream},
    StreamExt as _,
};
use juniper::graphql_subscription;

use crate::{api, Context, Error};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

impl Subscription {
    /// Name of the [`tracing::Span`] for the subscriptions.
    const SPAN_NAME: &'static str = "GraphQL subscription";
}

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription to the stack of the currently shown `Toast`s.
    ///
    /// Emits the current stack right away, and then every time it changes.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "toasts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn toasts(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<Vec<api::Toast>, Error>>, Error> {
        let toasts = ctx.service().toasts();
        let config = *toasts.config();
        let mut updates = toasts.subscribe();

        let current = updates.borrow_and_update().clone();
        let changes = stream::unfold(updates, |mut updates| async move {
            // Closed only once the `Service` is dropped.
            updates.changed().await.ok()?;
            let stack = updates.borrow_and_update().clone();
            Some((stack, updates))
        });

        Ok(stream::once(future::ready(current))
            .chain(changes)
            .map(move |stack| Ok(api::Toast::stack(stack, &config)))
            .boxed())
    }
}
