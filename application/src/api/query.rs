//! GraphQL [`Query`]s definitions.

use common::pagination::Sorting;
use juniper::graphql_object;
use service::{domain::user, query, read::user::list, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `User` with the specified ID, active or not.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `User`s matching all the provided criteria.
    ///
    /// Text criteria match case-insensitively anywhere inside the value, and
    /// blank ones are ignored. Ranges are inclusive.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PAGINATION` - `page` is less than 1 or `limit` is out of
    ///                          `1..=100` range;
    /// - `INVALID_FILTER` - `department` exceeds 50 characters, or another
    ///                      text criterion exceeds 100 characters;
    /// - `INVALID_AGE_RANGE` - `minAge` or `maxAge` is out of `0..=120`
    ///                         range;
    /// - `INVERTED_RANGE` - a lower bound exceeds its upper bound.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            department = ?department,
            email = ?email,
            gql.name = "users",
            is_active = ?is_active,
            limit = ?limit,
            max_age = ?max_age,
            max_salary = ?max_salary.as_ref().map(ToString::to_string),
            min_age = ?min_age,
            min_salary = ?min_salary.as_ref().map(ToString::to_string),
            name = ?name,
            otel.name = Self::SPAN_NAME,
            page = ?page,
            sort_by = ?sort_by,
            sort_order = ?sort_order,
        ),
    )]
    pub async fn users(
        name: Option<String>,
        email: Option<String>,
        department: Option<String>,
        is_active: Option<bool>,
        min_age: Option<i32>,
        max_age: Option<i32>,
        min_salary: Option<api::user::Salary>,
        max_salary: Option<api::user::Salary>,
        page: Option<i32>,
        limit: Option<i32>,
        sort_by: Option<api::user::list::SortBy>,
        sort_order: Option<api::user::list::SortOrder>,
        ctx: &Context,
    ) -> Result<api::user::list::UserList, Error> {
        let arguments = ctx
            .service()
            .config()
            .users
            .arguments(page, limit)
            .ok_or_else(|| api::PaginationError::Invalid.into())
            .map_err(ctx.error())?;

        let filter = Criteria {
            name,
            email,
            department,
            is_active,
            min_age,
            max_age,
            min_salary,
            max_salary,
        }
        .into_filter()
        .map_err(Error::from)
        .map_err(ctx.error())?;

        ctx.service()
            .execute(query::users::List(list::Selector {
                arguments,
                filter,
                sorting: Sorting {
                    by: sort_by.unwrap_or_default().into(),
                    order: sort_order.unwrap_or_default().into(),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns aggregated statistics of all `User`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "userStatistics",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user_statistics(
        ctx: &Context,
    ) -> Result<api::statistics::Statistics, Error> {
        ctx.service()
            .execute(query::users::Statistics)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Raw criteria of the `users` query.
#[derive(Debug, Default)]
struct Criteria {
    /// Text to search in `User` names.
    name: Option<String>,

    /// Text to search in `User` emails.
    email: Option<String>,

    /// Text to search in `User` departments.
    department: Option<String>,

    /// Required activity status.
    is_active: Option<bool>,

    /// Lower bound of `User` ages.
    min_age: Option<i32>,

    /// Upper bound of `User` ages.
    max_age: Option<i32>,

    /// Lower bound of `User` salaries.
    min_salary: Option<api::user::Salary>,

    /// Upper bound of `User` salaries.
    max_salary: Option<api::user::Salary>,
}

impl Criteria {
    /// Allowed bounds of an age range.
    const AGES: std::ops::RangeInclusive<i32> = 0..=120;

    /// Validates these [`Criteria`] and converts them into a
    /// [`list::Filter`].
    fn into_filter(self) -> Result<list::Filter, api::FilterError> {
        use api::FilterError as E;

        let Self {
            name,
            email,
            department,
            is_active,
            min_age,
            max_age,
            min_salary,
            max_salary,
        } = self;

        if min_age.into_iter().chain(max_age).any(|a| !Self::AGES.contains(&a))
        {
            return Err(E::AgeRange);
        }
        let min_salary: Option<user::Salary> = min_salary.map(Into::into);
        let max_salary: Option<user::Salary> = max_salary.map(Into::into);
        if matches!((min_age, max_age), (Some(min), Some(max)) if min > max)
            || matches!(
                (min_salary, max_salary),
                (Some(min), Some(max)) if min > max,
            )
        {
            return Err(E::InvertedRange);
        }

        Ok(list::Filter {
            name: Self::fragment(name, list::Fragment::MAX_LEN)?,
            email: Self::fragment(email, list::Fragment::MAX_LEN)?,
            department: Self::fragment(department, user::Department::MAX_LEN)?,
            is_active,
            min_age,
            max_age,
            min_salary,
            max_salary,
        })
    }

    /// Converts the provided `text` into a [`list::Fragment`] of at most
    /// `max_len` characters, ignoring it if blank.
    fn fragment(
        text: Option<String>,
        max_len: usize,
    ) -> Result<Option<list::Fragment>, api::FilterError> {
        match text {
            Some(t) if !t.trim().is_empty() => {
                list::Fragment::limited(t, max_len)
                    .map(Some)
                    .ok_or(api::FilterError::TooLong)
            }
            _ => Ok(None),
        }
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
