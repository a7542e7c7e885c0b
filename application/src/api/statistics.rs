//! [`Statistics`]-related definitions.

use derive_more::{From, Into};
use juniper::graphql_object;
use service::{query::users, read::user::statistics};

use crate::{
    api::{scalar, user},
    Context,
};

/// Aggregated [`Statistics`] of all `User`s.
#[derive(Clone, Debug, From, Into)]
pub struct Statistics(users::Output);

/// Aggregated statistics of all `User`s.
#[graphql_object(name = "UserStatistics", context = Context)]
impl Statistics {
    /// Aggregates over all `User`s.
    #[must_use]
    pub fn overview(&self) -> Overview {
        self.0.overview.into()
    }

    /// Aggregates over active `User`s of every department, ordered by the
    /// number of `User`s descending.
    #[must_use]
    pub fn by_department(&self) -> Vec<Department> {
        self.0.by_department.iter().cloned().map(Into::into).collect()
    }
}

/// Aggregates over all `User`s.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct Overview(statistics::Overview);

/// Aggregates over all `User`s.
///
/// Aggregated values are `null` when there is no data to aggregate.
#[graphql_object(name = "UserStatisticsOverview", context = Context)]
impl Overview {
    /// Number of all `User`s.
    #[must_use]
    pub fn total_users(&self) -> i32 {
        self.0.total_users
    }

    /// Number of active `User`s.
    #[must_use]
    pub fn active_users(&self) -> i32 {
        self.0.active_users
    }

    /// Number of inactive `User`s.
    #[must_use]
    pub fn inactive_users(&self) -> i32 {
        self.0.inactive_users
    }

    /// Average age among `User`s with a known age, rounded to 2 fractional
    /// digits.
    #[must_use]
    pub fn average_age(&self) -> Option<scalar::Decimal> {
        self.0.average_age.map(Into::into)
    }

    /// Average salary among `User`s with a known salary, rounded to 2
    /// fractional digits.
    #[must_use]
    pub fn average_salary(&self) -> Option<scalar::Decimal> {
        self.0.average_salary.map(Into::into)
    }

    /// Lowest known salary.
    #[must_use]
    pub fn min_salary(&self) -> Option<user::Salary> {
        self.0.min_salary.map(Into::into)
    }

    /// Highest known salary.
    #[must_use]
    pub fn max_salary(&self) -> Option<user::Salary> {
        self.0.max_salary.map(Into::into)
    }
}

/// Aggregates over active `User`s of a single department.
#[derive(Clone, Debug, From, Into)]
pub struct Department(statistics::Department);

/// Aggregates over active `User`s of a single department.
#[graphql_object(name = "UserStatisticsDepartment", context = Context)]
impl Department {
    /// Department being aggregated.
    #[must_use]
    pub fn department(&self) -> user::Department {
        self.0.department.clone().into()
    }

    /// Number of active `User`s in the department.
    #[must_use]
    pub fn user_count(&self) -> i32 {
        self.0.user_count
    }

    /// Average salary of the active `User`s in the department, rounded to 2
    /// fractional digits, or `null` if none of them has a known salary.
    #[must_use]
    pub fn average_salary(&self) -> Option<scalar::Decimal> {
        self.0.average_salary.map(Into::into)
    }
}
