//! [`User`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use rust_decimal::Decimal;

/// Member of the staff directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// ID of this [`User`], assigned by the store.
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], unique among all [`User`]s.
    pub email: Email,

    /// [`Age`] of this [`User`], if known.
    pub age: Option<Age>,

    /// [`Department`] this [`User`] works in, if any.
    pub department: Option<Department>,

    /// [`Salary`] of this [`User`], if known.
    pub salary: Option<Salary>,

    /// Indicator whether this [`User`] is active.
    ///
    /// Inactive [`User`]s are soft-deleted, but still occupy their [`Email`].
    pub is_active: bool,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was modified last time.
    pub updated_at: UpdateDateTime,
}

/// Data of a [`User`] to be created.
///
/// [`Id`] and timestamps are assigned by the store on insertion, and a new
/// [`User`] is always active.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct New {
    /// [`Name`] of the new [`User`].
    pub name: Name,

    /// [`Email`] of the new [`User`].
    pub email: Email,

    /// [`Age`] of the new [`User`].
    pub age: Option<Age>,

    /// [`Department`] of the new [`User`].
    pub department: Option<Department>,

    /// [`Salary`] of the new [`User`].
    pub salary: Option<Salary>,
}

/// ID of a [`User`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

impl Id {
    /// Creates a new [`Id`] if the given `id` is positive.
    #[must_use]
    pub fn new(id: i32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().ok().and_then(Self::new).ok_or("invalid `Id`")
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && (2..=100).contains(&name.chars().count())
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking `local@domain.tld` shape of an
        /// address.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(concat!(
                r"^[^\s@()<>\[\]:;,\x22]+",
                r"@[^\s@()<>\[\]:;,\x22.]+",
                r"(\.[^\s@()<>\[\]:;,\x22.]+)+$",
            ))
            .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 255 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Age of a [`User`] in full years.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Age(i32);

impl Age {
    /// Youngest allowed [`Age`].
    pub const MIN: i32 = 16;

    /// Oldest allowed [`Age`].
    pub const MAX: i32 = 120;

    /// Creates a new [`Age`] if the given `years` are in the
    /// [`Age::MIN`]`..=`[`Age::MAX`] range.
    #[must_use]
    pub fn new(years: i32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&years).then_some(Self(years))
    }
}

/// Department a [`User`] works in.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Department(String);

impl Department {
    /// Longest allowed [`Department`] in characters.
    pub const MAX_LEN: usize = 50;

    /// Creates a new [`Department`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Department`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name
            && !name.is_empty()
            && name.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Department {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Department`")
    }
}

/// Salary of a [`User`].
///
/// Non-negative amount with at most 2 fractional digits.
#[derive(
    AsRef,
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Salary(Decimal);

impl Salary {
    /// Creates a new [`Salary`] if the given `amount` is valid.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        Self::check(amount).then(|| Self(amount.normalize()))
    }

    /// Checks whether the given `amount` is a valid [`Salary`].
    fn check(amount: Decimal) -> bool {
        /// Largest allowed [`Salary`].
        const MAX: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

        !amount.is_sign_negative()
            && amount <= MAX
            && amount.normalize().scale() <= 2
    }
}

impl FromStr for Salary {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Salary`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was modified last time.
pub type UpdateDateTime = DateTimeOf<(User, unit::Update)>;
