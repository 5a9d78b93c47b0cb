//! Time source and canonical-timezone normalization.
//!
//! Every schedule comparison in the service happens in one fixed timezone,
//! the *canonical zone* (IST, UTC+05:30, unless configured otherwise).
//!
//! # Naive timestamps
//!
//! Storage backends are allowed to drop timezone information on a
//! write/read round-trip. The contract here is fixed and applies to every
//! timestamp read back from storage or received without an offset:
//!
//! > A timestamp without timezone information is a wall-clock time **in the
//! > canonical zone**. It is never interpreted as UTC.
//!
//! Timestamps that do carry an offset are converted into the canonical zone.
//!
//! Only years `1..=9999` are accepted on input. Normalization clamps to that
//! window, so it never overflows whatever offset the zone has.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Clock trait - abstracts "now" for testability.
pub trait Clock: Send + Sync {
    /// Get the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A timestamp that may or may not carry timezone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTimestamp {
    /// No offset attached; assumed to be canonical-zone wall time.
    Naive(NaiveDateTime),
    /// Offset attached; converted on normalization.
    Zoned(DateTime<FixedOffset>),
}

impl From<NaiveDateTime> for RawTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl From<DateTime<FixedOffset>> for RawTimestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Zoned(value)
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Zoned(value.fixed_offset())
    }
}

/// Formats accepted for timestamps without an offset.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Earliest wall time a schedule timestamp may take.
pub const EARLIEST_SUPPORTED: NaiveDateTime = wall_time(1, 1, 1, 0, 0, 0);
/// Latest wall time a schedule timestamp may take.
pub const LATEST_SUPPORTED: NaiveDateTime = wall_time(9999, 12, 31, 23, 59, 59);

const fn wall_time(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => match date.and_hms_opt(hour, min, sec) {
            Some(time) => time,
            None => NaiveDateTime::MIN,
        },
        None => NaiveDateTime::MIN,
    }
}

fn clamp_supported(naive: NaiveDateTime) -> NaiveDateTime {
    naive.clamp(EARLIEST_SUPPORTED, LATEST_SUPPORTED)
}

impl RawTimestamp {
    /// Parse an RFC 3339 timestamp, or an ISO 8601 local timestamp without
    /// an offset.
    ///
    /// Returns `None` if the input matches neither, or if its year is
    /// outside `1..=9999`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let parsed = match DateTime::parse_from_rfc3339(input) {
            Ok(zoned) => Self::Zoned(zoned),
            Err(_) => NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
                .map(Self::Naive)?,
        };
        parsed.is_supported().then_some(parsed)
    }

    fn is_supported(&self) -> bool {
        let year = match self {
            Self::Naive(naive) => naive.year(),
            Self::Zoned(zoned) => zoned.naive_utc().year(),
        };
        (EARLIEST_SUPPORTED.year()..=LATEST_SUPPORTED.year()).contains(&year)
    }
}

impl fmt::Display for RawTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Zoned(zoned) => write!(f, "{}", zoned.to_rfc3339()),
        }
    }
}

impl Serialize for RawTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RawTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid timestamp '{raw}', expected ISO 8601"))
        })
    }
}

/// The single fixed timezone all schedule comparisons are made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalZone(FixedOffset);

impl CanonicalZone {
    /// Offset of Indian Standard Time in minutes.
    pub const IST_OFFSET_MINUTES: i32 = 330;

    /// Indian Standard Time (UTC+05:30, no daylight saving).
    #[must_use]
    pub fn ist() -> Self {
        Self::from_offset_minutes(Self::IST_OFFSET_MINUTES).unwrap_or_else(|| Self(Utc.fix()))
    }

    /// Canonical zone with the given offset east of UTC.
    ///
    /// Returns `None` if the offset is out of range (more than ±24h).
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self)
    }

    /// The underlying offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Express a timestamp in the canonical zone.
    ///
    /// Naive input is taken as canonical wall time; zoned input is
    /// converted, preserving the instant. Values outside
    /// [`EARLIEST_SUPPORTED`]..=[`LATEST_SUPPORTED`] are clamped to it.
    #[must_use]
    pub fn normalize(&self, timestamp: impl Into<RawTimestamp>) -> DateTime<FixedOffset> {
        match timestamp.into() {
            RawTimestamp::Naive(naive) => {
                let wall = clamp_supported(naive);
                let utc = wall.checked_sub_offset(self.0).unwrap_or(wall);
                DateTime::from_naive_utc_and_offset(utc, self.0)
            }
            RawTimestamp::Zoned(zoned) => {
                DateTime::from_naive_utc_and_offset(clamp_supported(zoned.naive_utc()), self.0)
            }
        }
    }

    /// Canonical wall-clock representation used for persistence.
    #[must_use]
    pub fn to_storage(&self, timestamp: DateTime<FixedOffset>) -> NaiveDateTime {
        timestamp.with_timezone(&self.0).naive_local()
    }
}

impl Default for CanonicalZone {
    fn default() -> Self {
        Self::ist()
    }
}

/// Clock paired with the canonical zone.
///
/// This is the only place the catalog and ledger read "now" from.
#[derive(Clone)]
pub struct ScheduleClock {
    clock: Arc<dyn Clock>,
    zone: CanonicalZone,
}

impl ScheduleClock {
    /// Create a schedule clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, zone: CanonicalZone) -> Self {
        Self { clock, zone }
    }

    /// Wall-clock schedule clock in the given zone.
    #[must_use]
    pub fn system(zone: CanonicalZone) -> Self {
        Self::new(Arc::new(SystemClock), zone)
    }

    /// Current instant in the canonical zone.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.zone.offset())
    }

    /// See [`CanonicalZone::normalize`].
    #[must_use]
    pub fn normalize(&self, timestamp: impl Into<RawTimestamp>) -> DateTime<FixedOffset> {
        self.zone.normalize(timestamp)
    }

    /// See [`CanonicalZone::to_storage`].
    #[must_use]
    pub fn to_storage(&self, timestamp: DateTime<FixedOffset>) -> NaiveDateTime {
        self.zone.to_storage(timestamp)
    }

    /// The canonical zone.
    #[must_use]
    pub const fn zone(&self) -> CanonicalZone {
        self.zone
    }
}

impl fmt::Debug for ScheduleClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleClock")
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};
    use proptest::prelude::*;

    fn naive(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_naive_is_treated_as_canonical_not_utc() {
        let zone = CanonicalZone::ist();
        let normalized = zone.normalize(naive(10, 0));

        assert_eq!(normalized.naive_local(), naive(10, 0));
        assert_eq!(normalized.offset().local_minus_utc(), 19_800);
        // 10:00 IST is 04:30 UTC
        assert_eq!(normalized.with_timezone(&Utc).hour(), 4);
        assert_eq!(normalized.with_timezone(&Utc).minute(), 30);
    }

    #[test]
    fn test_zoned_is_converted() {
        let zone = CanonicalZone::ist();
        let utc = Utc.with_ymd_and_hms(2026, 2, 10, 10, 0, 0).unwrap();
        let normalized = zone.normalize(utc);

        assert_eq!(normalized, utc);
        assert_eq!(normalized.naive_local(), naive(15, 30));
    }

    #[test]
    fn test_to_storage_round_trips_through_normalize() {
        let zone = CanonicalZone::ist();
        let utc = Utc.with_ymd_and_hms(2026, 2, 10, 23, 45, 0).unwrap();
        let stored = zone.to_storage(zone.normalize(utc));

        assert_eq!(zone.normalize(stored), utc);
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(CanonicalZone::from_offset_minutes(24 * 60).is_none());
        assert!(CanonicalZone::from_offset_minutes(-60).is_some());
    }

    #[test]
    fn test_parse_accepts_offset_and_naive_forms() {
        assert!(matches!(
            RawTimestamp::parse("2026-02-10T10:00:00Z"),
            Some(RawTimestamp::Zoned(_))
        ));
        assert!(matches!(
            RawTimestamp::parse("2026-02-10T10:00:00+05:30"),
            Some(RawTimestamp::Zoned(_))
        ));
        assert_eq!(
            RawTimestamp::parse("2026-02-10T10:00:00"),
            Some(RawTimestamp::Naive(naive(10, 0)))
        );
        assert_eq!(
            RawTimestamp::parse("2026-02-10 10:00"),
            Some(RawTimestamp::Naive(naive(10, 0)))
        );
        assert_eq!(RawTimestamp::parse("next tuesday"), None);
    }

    #[test]
    fn test_parse_rejects_years_outside_supported_range() {
        assert_eq!(RawTimestamp::parse("-262143-01-01T00:00:00"), None);
        assert_eq!(RawTimestamp::parse("+262142-12-31T23:59:59"), None);
        assert_eq!(RawTimestamp::parse("0000-01-01T00:00:00"), None);
        assert!(RawTimestamp::parse("9999-12-31T23:59:59").is_some());
        assert!(RawTimestamp::parse("0001-01-01T00:00:00").is_some());
    }

    #[test]
    fn test_normalize_extreme_values_does_not_overflow() {
        let east = CanonicalZone::from_offset_minutes(840).unwrap();
        let west = CanonicalZone::from_offset_minutes(-720).unwrap();

        for zone in [east, west, CanonicalZone::ist()] {
            let earliest = zone.normalize(NaiveDateTime::MIN);
            let latest = zone.normalize(NaiveDateTime::MAX);
            assert_eq!(earliest.naive_local(), EARLIEST_SUPPORTED);
            assert_eq!(latest.naive_local(), LATEST_SUPPORTED);
            assert_eq!(zone.to_storage(earliest), EARLIEST_SUPPORTED);

            let zoned = zone.normalize(NaiveDateTime::MIN.and_utc());
            assert_eq!(zoned.naive_utc(), EARLIEST_SUPPORTED);
        }
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        let result: Result<RawTimestamp, _> = serde_json::from_str("\"10am\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_schedule_clock_now_is_canonical() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = ScheduleClock::new(
            Arc::new(crate::mocks::FixedClock::new(instant)),
            CanonicalZone::ist(),
        );

        let now = clock.now();
        assert_eq!(now, instant);
        assert_eq!(now.offset().local_minus_utc(), 19_800);
    }

    proptest! {
        #[test]
        fn prop_naive_keeps_wall_time(secs in 0i64..4_102_444_800, offset_min in -720i32..=840) {
            let zone = CanonicalZone::from_offset_minutes(offset_min).unwrap();
            let wall = DateTime::from_timestamp(secs, 0).unwrap().naive_utc();
            let normalized = zone.normalize(wall);

            prop_assert_eq!(normalized.naive_local(), wall);
            prop_assert_eq!(normalized.offset().local_minus_utc(), offset_min * 60);
        }

        #[test]
        fn prop_zoned_keeps_instant(secs in 0i64..4_102_444_800, offset_min in -720i32..=840) {
            let zone = CanonicalZone::from_offset_minutes(offset_min).unwrap();
            let instant = DateTime::from_timestamp(secs, 0).unwrap();
            let normalized = zone.normalize(instant);

            prop_assert_eq!(normalized, instant);
            prop_assert_eq!(zone.normalize(zone.to_storage(normalized)), instant);
        }
    }
}
