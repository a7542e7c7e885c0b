//! [`User`] read models definitions.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use common::define_pagination;
    use derive_more::{AsRef, Display, From, Into};

    #[cfg(doc)]
    use crate::domain::user::{Age, Department, Email, Name};
    use crate::domain::{user, User};

    define_pagination!(User, Filter, SortBy);

    /// Filter of a [`User`]s list.
    ///
    /// Every provided field narrows the list, and omitted ones don't.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`Fragment`] of a [`Name`] to search for.
        pub name: Option<Fragment>,

        /// [`Fragment`] of an [`Email`] to search for.
        pub email: Option<Fragment>,

        /// [`Fragment`] of a [`Department`] to search for.
        pub department: Option<Fragment>,

        /// Required activity status.
        pub is_active: Option<bool>,

        /// Inclusive lower bound of an [`Age`].
        pub min_age: Option<i32>,

        /// Inclusive upper bound of an [`Age`].
        pub max_age: Option<i32>,

        /// Inclusive lower bound of a [`user::Salary`].
        pub min_salary: Option<user::Salary>,

        /// Inclusive upper bound of a [`user::Salary`].
        pub max_salary: Option<user::Salary>,
    }

    /// Part of a text value to search for.
    #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
    #[as_ref(str, String)]
    pub struct Fragment(String);

    impl Fragment {
        /// Default limit of [`Fragment`] characters.
        pub const MAX_LEN: usize = 100;

        /// Creates a new [`Fragment`] if the given `text` is not blank and
        /// fits [`Fragment::MAX_LEN`] characters.
        #[must_use]
        pub fn new(text: impl Into<String>) -> Option<Self> {
            Self::limited(text, Self::MAX_LEN)
        }

        /// Creates a new [`Fragment`] if the given `text` is not blank and
        /// fits `max_len` characters.
        ///
        /// A value can't contain a [`Fragment`] longer than itself, so
        /// `max_len` is the limit of the searched value.
        #[must_use]
        pub fn limited(
            text: impl Into<String>,
            max_len: usize,
        ) -> Option<Self> {
            let text = text.into();
            (!text.trim().is_empty() && text.chars().count() <= max_len)
                .then_some(Self(text))
        }
    }

    /// Key to sort a [`User`]s list by.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub enum SortBy {
        /// [`User::name`].
        Name,

        /// [`User::email`].
        Email,

        /// [`User::age`].
        Age,

        /// [`User::salary`].
        Salary,

        /// [`User::created_at`].
        #[default]
        CreatedAt,
    }

    /// Total count of [`User`]s matching a [`Filter`].
    #[derive(Clone, Copy, Debug, Default, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(usize);
}

pub mod statistics {
    //! [`User`]s statistics definitions.

    use rust_decimal::Decimal;

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::User;

    /// Aggregates over all [`User`]s.
    ///
    /// Aggregated values are [`None`] when there is no data to aggregate,
    /// which is distinct from an aggregate being zero.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Overview {
        /// Number of all [`User`]s.
        pub total_users: i32,

        /// Number of active [`User`]s.
        pub active_users: i32,

        /// Number of inactive [`User`]s.
        pub inactive_users: i32,

        /// Average [`user::Age`] among [`User`]s with a known age.
        pub average_age: Option<Decimal>,

        /// Average [`user::Salary`] among [`User`]s with a known salary.
        pub average_salary: Option<Decimal>,

        /// Lowest known [`user::Salary`].
        pub min_salary: Option<user::Salary>,

        /// Highest known [`user::Salary`].
        pub max_salary: Option<user::Salary>,
    }

    /// Aggregates over active [`User`]s of a single [`user::Department`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Department {
        /// [`user::Department`] being aggregated.
        pub department: user::Department,

        /// Number of active [`User`]s in the [`user::Department`].
        pub user_count: i32,

        /// Average [`user::Salary`] of the active [`User`]s in the
        /// [`user::Department`], if any of them has a known salary.
        pub average_salary: Option<Decimal>,
    }
}
