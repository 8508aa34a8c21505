use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Asset class of a security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityType {
    Equity,
    Option,
    Future,
    FutureOption,
    IndexOption,
    Index,
    Forex,
    Cfd,
    Crypto,
    CryptoFuture,
    /// User-defined custom data.
    Base,
}

impl SecurityType {
    pub const ALL: [SecurityType; 11] = [
        Self::Equity,
        Self::Option,
        Self::Future,
        Self::FutureOption,
        Self::IndexOption,
        Self::Index,
        Self::Forex,
        Self::Cfd,
        Self::Crypto,
        Self::CryptoFuture,
        Self::Base,
    ];

    /// True for option contracts of any underlying.
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Option | Self::FutureOption | Self::IndexOption)
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Static metadata for a symbol, as provided by a
/// [`SecurityLookup`](crate::resolver::SecurityLookup).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityMetadata {
    pub security_type: SecurityType,

    /// Time zone the exchange operates in.
    pub exchange_time_zone: Tz,

    /// Time zone the stored data is expressed in.
    pub data_time_zone: Tz,

    /// First instant data can exist for; bounds backward searches.
    pub listing_date: Option<DateTime<Utc>>,
}

impl SecurityMetadata {
    pub fn new(security_type: SecurityType, exchange_time_zone: Tz) -> Self {
        Self {
            security_type,
            exchange_time_zone,
            data_time_zone: exchange_time_zone,
            listing_date: None,
        }
    }

    pub fn with_data_time_zone(mut self, data_time_zone: Tz) -> Self {
        self.data_time_zone = data_time_zone;
        self
    }

    pub fn with_listing_date(mut self, listing_date: DateTime<Utc>) -> Self {
        self.listing_date = Some(listing_date);
        self
    }

    pub fn is_custom_data(&self) -> bool {
        self.security_type == SecurityType::Base
    }
}
