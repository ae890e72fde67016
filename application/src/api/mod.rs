//! GraphQL API definitions.

mod mutation;
mod query;
pub mod scalar;
mod subscription;
#[allow(
    ambiguous_associated_items,
    reason = "`juniper::GraphQLEnum` derive expansion for `Kind::Error`"
)]
pub mod toast;
pub mod user;

pub use self::{
    mutation::Mutation, query::Query, subscription::Subscription,
    toast::Toast, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

/// Converts the provided number into a GraphQL `Int`, saturating on
/// overflow.
pub(crate) fn int<N: TryInto<i32>>(n: N) -> i32 {
    n.try_into().unwrap_or(i32::MAX)
}

/// Converts the provided GraphQL `Int` into an unsigned number, treating
/// negatives as zero.
pub(crate) fn uint(n: i32) -> u32 {
    u32::try_from(n).unwrap_or_default()
}

#[cfg(test)]
mod spec {
    use super::{int, uint};

    #[test]
    fn saturates_ints() {
        assert_eq!(int(7_u64), 7);
        assert_eq!(int(u64::MAX), i32::MAX);
        assert_eq!(int(usize::MAX), i32::MAX);
        assert_eq!(uint(-3), 0);
        assert_eq!(uint(12), 12);
    }
}
