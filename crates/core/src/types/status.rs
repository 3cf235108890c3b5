//! Order status state machine.
//!
//! ```text
//!            ┌──────────► Finished (1)
//! Active (0) ┤
//!            └──────────► Cancelled (2)
//! ```
//!
//! `Finished` and `Cancelled` are terminal. Soft deletion is tracked
//! separately on the order row and is not a status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A status code read from storage or a request that maps to no variant.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown order status code: {0}")]
pub struct UnknownStatus(pub i16);

/// A requested transition the state machine does not allow.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionRejected {
    /// Status the order currently has.
    pub from: OrderStatus,
    /// Status that was requested.
    pub to: OrderStatus,
}

/// Order lifecycle status, stored as a `SMALLINT`.
///
/// Serializes as its integer code so clients see `0`, `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum OrderStatus {
    /// Initial state of every order.
    #[default]
    Active,
    /// Order was fulfilled.
    Finished,
    /// Order was called off.
    Cancelled,
}

impl OrderStatus {
    /// The integer code persisted in `orders.status`.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Active => 0,
            Self::Finished => 1,
            Self::Cancelled => 2,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    /// Decide whether `self` may move to `target`.
    ///
    /// Only `Active -> Finished` and `Active -> Cancelled` are accepted.
    /// Re-requesting the current status is rejected as well, so a finished
    /// order cannot be "finished" twice.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionRejected`] for every other pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_maximum_core::OrderStatus;
    ///
    /// assert_eq!(
    ///     OrderStatus::Active.transition(OrderStatus::Finished),
    ///     Ok(OrderStatus::Finished)
    /// );
    /// assert!(OrderStatus::Finished.transition(OrderStatus::Cancelled).is_err());
    /// ```
    pub const fn transition(self, target: Self) -> Result<Self, TransitionRejected> {
        match (self, target) {
            (Self::Active, Self::Finished | Self::Cancelled) => Ok(target),
            _ => Err(TransitionRejected {
                from: self,
                to: target,
            }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<OrderStatus> for i16 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Active),
            1 => Ok(Self::Finished),
            2 => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other)),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let code = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(code)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}
