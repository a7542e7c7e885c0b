//! GraphQL API definitions.

mod mutation;
mod query;
pub mod scalar;
pub mod statistics;
pub mod user;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{mutation::Mutation, query::Query, user::User};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

define_error! {
    enum PaginationError {
        #[code = "INVALID_PAGINATION"]
        #[status = BAD_REQUEST]
        #[message = "`page` must be positive and `limit` must be in \
                     `1..=100` range"]
        Invalid,
    }
}

define_error! {
    enum FilterError {
        #[code = "INVALID_AGE_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "`minAge` and `maxAge` must be in `0..=120` range"]
        AgeRange,

        #[code = "INVERTED_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Lower bound of a range must not exceed its upper bound"]
        InvertedRange,

        #[code = "INVALID_FILTER"]
        #[status = BAD_REQUEST]
        #[message = "`department` filter must not exceed 50 characters, \
                     other text filters 100 characters"]
        TooLong,
    }
}
