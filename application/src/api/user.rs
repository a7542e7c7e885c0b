//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar, InputValue, ScalarValue, Value};
use service::domain;

use crate::{
    api::{self, scalar},
    Context,
};

/// A [`User`] of the staff directory.
#[derive(Clone, Debug, From, Into)]
pub struct User(domain::User);

/// A `User` of the staff directory.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Full name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Email of this `User`, unique among all `User`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn email(&self) -> Email {
        self.0.email.clone().into()
    }

    /// Age of this `User`, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.age",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn age(&self) -> Option<Age> {
        self.0.age.map(Into::into)
    }

    /// Department this `User` works in, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.department",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn department(&self) -> Option<Department> {
        self.0.department.clone().map(Into::into)
    }

    /// Salary of this `User`, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.salary",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn salary(&self) -> Option<Salary> {
        self.0.salary.map(Into::into)
    }

    /// Indicator whether this `User` is active.
    ///
    /// Deleted `User`s are inactive.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.isActive",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.is_active
    }

    /// `DateTime` when this `User` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `User` was modified last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[graphql(name = "UserId", with = Self, parse_token(i32))]
pub struct Id(domain::user::Id);

impl Id {
    /// Converts this [`Id`] into a scalar [`Value`].
    fn to_output<S: ScalarValue>(id: &Id) -> Value<S> {
        Value::scalar(i32::from(id.0))
    }

    /// Parses an [`Id`] out of a positive integer.
    fn from_input<S: ScalarValue>(
        input: &InputValue<S>,
    ) -> Result<Id, String> {
        input
            .as_int_value()
            .and_then(domain::user::Id::new)
            .map(Self)
            .ok_or_else(|| {
                format!(
                    "Cannot parse input scalar `UserId`: expected positive \
                     integer, found: {input}",
                )
            })
    }
}

/// Full name of a `User`.
///
/// From 2 to 100 characters, without leading or trailing whitespace.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Email address of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Age of a `User` in full years, from 16 to 120.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserAge", with = Self, parse_token(i32))]
pub struct Age(domain::user::Age);

impl Age {
    /// Converts this [`Age`] into a scalar [`Value`].
    fn to_output<S: ScalarValue>(age: &Age) -> Value<S> {
        Value::scalar(i32::from(age.0))
    }

    /// Parses an [`Age`] out of an integer in the allowed range.
    fn from_input<S: ScalarValue>(
        input: &InputValue<S>,
    ) -> Result<Age, String> {
        input
            .as_int_value()
            .and_then(domain::user::Age::new)
            .map(Self)
            .ok_or_else(|| {
                format!(
                    "Cannot parse input scalar `UserAge`: expected integer in \
                     `{}..={}` range, found: {input}",
                    domain::user::Age::MIN,
                    domain::user::Age::MAX,
                )
            })
    }
}

/// Department a `User` works in.
///
/// From 1 to 50 characters, without leading or trailing whitespace.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserDepartment",
    with = scalar::Via::<domain::user::Department>,
)]
pub struct Department(domain::user::Department);

/// Salary of a `User`.
///
/// Non-negative decimal string up to `999999.99` with at most 2 fractional
/// digits.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserSalary",
    with = scalar::Via::<domain::user::Salary>,
)]
pub struct Salary(domain::user::Salary);

pub mod list {
    //! Definitions related to [`User`] list.

    use common::pagination::Order;
    use derive_more::{From, Into};
    use juniper::{graphql_object, GraphQLEnum};
    use service::read::user::list;

    use crate::Context;

    use super::User;

    /// Page of the [`User`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct UserList(list::Page);

    /// Page of the `User` list.
    #[graphql_object(context = Context)]
    impl UserList {
        /// `User`s on this page.
        #[must_use]
        pub fn data(&self) -> Vec<User> {
            self.0.items.iter().cloned().map(Into::into).collect()
        }

        /// Information about this page.
        #[must_use]
        pub fn pagination(&self) -> Pagination {
            self.0.info.into()
        }
    }

    /// Information about a [`UserList`] page.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Pagination(list::Info);

    /// Information about a `UserList` page.
    #[graphql_object(context = Context)]
    impl Pagination {
        /// 1-based number of the current page.
        #[must_use]
        pub fn current_page(&self) -> i32 {
            saturate(self.0.current_page)
        }

        /// Total number of pages, `0` if nothing matches.
        #[must_use]
        pub fn total_pages(&self) -> i32 {
            saturate(self.0.total_pages)
        }

        /// Total number of matching `User`s.
        #[must_use]
        pub fn total_items(&self) -> i32 {
            saturate(self.0.total_items)
        }

        /// Maximum number of `User`s on a page.
        #[must_use]
        pub fn items_per_page(&self) -> i32 {
            saturate(self.0.items_per_page)
        }

        /// Indicator whether there is a page after the current one.
        #[must_use]
        pub fn has_next(&self) -> bool {
            self.0.has_next
        }

        /// Indicator whether there is a page before the current one.
        #[must_use]
        pub fn has_prev(&self) -> bool {
            self.0.has_prev
        }
    }

    /// Converts the provided `num` into an [`i32`], saturating on overflow.
    fn saturate(num: usize) -> i32 {
        i32::try_from(num).unwrap_or(i32::MAX)
    }

    /// Key to sort the `User` list by.
    #[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
    #[graphql(name = "UserSortBy")]
    pub enum SortBy {
        /// Sort by `User.name`.
        Name,

        /// Sort by `User.email`.
        Email,

        /// Sort by `User.age`.
        Age,

        /// Sort by `User.salary`.
        Salary,

        /// Sort by `User.createdAt`.
        #[default]
        CreatedAt,
    }

    impl From<SortBy> for list::SortBy {
        fn from(by: SortBy) -> Self {
            match by {
                SortBy::Name => Self::Name,
                SortBy::Email => Self::Email,
                SortBy::Age => Self::Age,
                SortBy::Salary => Self::Salary,
                SortBy::CreatedAt => Self::CreatedAt,
            }
        }
    }

    /// Order of sorting.
    #[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
    pub enum SortOrder {
        /// Ascending order.
        Asc,

        /// Descending order.
        #[default]
        Desc,
    }

    impl From<SortOrder> for Order {
        fn from(order: SortOrder) -> Self {
            match order {
                SortOrder::Asc => Self::Ascending,
                SortOrder::Desc => Self::Descending,
            }
        }
    }

}
