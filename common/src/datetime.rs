//! UTC timestamps tagged by what they mark.
//!
//! Values are normalized to UTC and truncated to microseconds, so they
//! survive a round trip through Postgres `TIMESTAMPTZ` unchanged.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{
    format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset,
};

/// Untagged date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time of the `Of` kind.
///
/// Kinds can't be mixed up accidentally: [`DateTimeOf::coerce()`] is the only
/// way to turn one kind into another.
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Normalized instant.
    inner: OffsetDateTime,

    /// Kind of this [`DateTimeOf`].
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Current date and time.
    #[must_use]
    pub fn now() -> Self {
        Self::normalized(OffsetDateTime::now_utc())
    }

    /// Reinterprets this date and time as another kind.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }

    /// Converts the provided `dt` to UTC and drops its sub-microsecond part.
    fn normalized(dt: OffsetDateTime) -> Self {
        let utc = dt.to_offset(UtcOffset::UTC);
        Self {
            inner: utc
                .replace_nanosecond(utc.nanosecond() / 1_000 * 1_000)
                .unwrap_or(utc),
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> fmt::Display for DateTimeOf<Of> {
    /// Formats as [RFC 3339].
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.format(&Rfc3339).map_err(|_| fmt::Error)?)
    }
}

impl<Of: ?Sized> fmt::Debug for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateTime({self})")
    }
}

impl<Of: ?Sized> FromStr for DateTimeOf<Of> {
    type Err = time::error::Parse;

    /// Parses an [RFC 3339] string with any offset.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OffsetDateTime::parse(s, &Rfc3339).map(Self::normalized)
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        OffsetDateTime::from_sql(ty, raw).map(Self::normalized)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! [`juniper`] integration.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Date and time in [RFC 3339] format with microsecond precision.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[graphql_scalar(with = Self, parse_token(String))]
    type DateTime = crate::DateTime;

    impl DateTime {
        fn to_output<S: ScalarValue>(dt: &DateTime) -> Value<S> {
            Value::scalar(dt.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let s = input.as_string_value().ok_or_else(|| {
                format!("Expected `DateTime` string, found: {input}")
            })?;
            s.parse().map_err(|e| {
                format!("Cannot parse `DateTime` from `{s}`: {e}")
            })
        }
    }
}
