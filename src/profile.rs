//! Time-of-day power profiles and the reshaping of query points into them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// Key format for profile entries.
pub const SLOT_FORMAT: &str = "%H:%M";

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Mapping from `"HH:MM"` clock time to mean power, ordered by clock time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    entries: BTreeMap<String, f64>,
}

impl Profile {
    /// Reshapes one series of `(timestamp, mean)` points into a profile.
    ///
    /// Points are ordered by timestamp and the final boundary slot is dropped,
    /// since a window of `start..=end` yields one bucket more than it has
    /// slots. Each remaining value is multiplied by `multiplier`. Points that
    /// fall on the same clock time on different days collapse to the later one.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use meter_profile::profile::Profile;
    ///
    /// let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    /// let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 15, 0).unwrap();
    /// let profile = Profile::from_points(vec![(t0, 2.0), (t1, 3.0)], 10.0);
    ///
    /// assert_eq!(profile.len(), 1);
    /// assert_eq!(profile.get("00:00"), Some(20.0));
    /// ```
    pub fn from_points(mut points: Vec<(DateTime<Utc>, f64)>, multiplier: f64) -> Self {
        points.sort_by_key(|(ts, _)| *ts);
        points.pop();

        let entries = points
            .into_iter()
            .map(|(ts, value)| (ts.format(SLOT_FORMAT).to_string(), value * multiplier))
            .collect();
        Self { entries }
    }

    /// Sums several series per timestamp, then reshapes as [`Profile::from_points`].
    ///
    /// A timestamp present in only some series is summed over those series.
    pub fn summed<I>(series: I, multiplier: f64) -> Self
    where
        I: IntoIterator<Item = Vec<(DateTime<Utc>, f64)>>,
    {
        let mut totals: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
        for points in series {
            for (ts, value) in points {
                *totals.entry(ts).or_insert(0.0) += value;
            }
        }
        Self::from_points(totals.into_iter().collect(), multiplier)
    }

    /// The fixed reference profile: zero power for every slot of one day.
    ///
    /// Keys run from `00:00` to the start of the last slot, so a 15-minute
    /// interval gives 96 entries. An `interval_minutes` of zero is treated as 1.
    pub fn zero_curve(interval_minutes: u32) -> Self {
        let step = interval_minutes.max(1);
        let entries = (0..MINUTES_PER_DAY)
            .step_by(step as usize)
            .map(|minute| (format!("{:02}:{:02}", minute / 60, minute % 60), 0.0))
            .collect();
        Self { entries }
    }

    pub fn get(&self, slot: &str) -> Option<f64> {
        self.entries.get(slot).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(slot, value)` pairs in clock-time order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.entries
    }
}

impl FromIterator<(String, f64)> for Profile {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, value) in self.iter() {
            writeln!(f, "{slot} {value:.4}")?;
        }
        Ok(())
    }
}

/// Outcome of a profile query: real readings or the zero-curve substitute.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadProfile {
    /// Reshaped from the returned series.
    Measured(Profile),
    /// The results were unusable and the zero curve stands in.
    ZeroCurve(Profile),
}

impl LoadProfile {
    pub fn profile(&self) -> &Profile {
        match self {
            Self::Measured(p) | Self::ZeroCurve(p) => p,
        }
    }

    pub fn into_profile(self) -> Profile {
        match self {
            Self::Measured(p) | Self::ZeroCurve(p) => p,
        }
    }

    pub fn is_zero_curve(&self) -> bool {
        matches!(self, Self::ZeroCurve(_))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn from_points_drops_last_slot() {
        let points = vec![(at(0, 0), 1.0), (at(0, 15), 2.0), (at(0, 30), 3.0)];
        let profile = Profile::from_points(points, 1.0);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get("00:00"), Some(1.0));
        assert_eq!(profile.get("00:15"), Some(2.0));
        assert_eq!(profile.get("00:30"), None);
    }

    #[test]
    fn from_points_drops_latest_even_when_unsorted() {
        let points = vec![(at(0, 30), 3.0), (at(0, 0), 1.0), (at(0, 15), 2.0)];
        let profile = Profile::from_points(points, 1.0);
        assert_eq!(profile.get("00:30"), None);
        assert_eq!(profile.len(), 2);
    }

    #[test]
    fn from_points_applies_multiplier() {
        let points = vec![(at(6, 0), 1.5), (at(6, 15), 2.0)];
        let profile = Profile::from_points(points, -1000.0);
        assert_eq!(profile.get("06:00"), Some(-1500.0));
    }

    #[test]
    fn from_points_empty_and_single_are_empty() {
        assert!(Profile::from_points(Vec::new(), 1.0).is_empty());
        assert!(Profile::from_points(vec![(at(0, 0), 1.0)], 1.0).is_empty());
    }

    #[test]
    fn summed_aligns_on_timestamp() {
        let a = vec![(at(0, 0), 1.0), (at(0, 15), 2.0), (at(0, 30), 0.0)];
        let b = vec![(at(0, 0), 10.0), (at(0, 30), 0.0)];
        let profile = Profile::summed(vec![a, b], 1.0);
        assert_eq!(profile.get("00:00"), Some(11.0));
        assert_eq!(profile.get("00:15"), Some(2.0));
        assert_eq!(profile.len(), 2);
    }

    #[test]
    fn zero_curve_covers_one_day() {
        let curve = Profile::zero_curve(15);
        assert_eq!(curve.len(), 96);
        assert_eq!(curve.get("00:00"), Some(0.0));
        assert_eq!(curve.get("23:45"), Some(0.0));
        assert_eq!(curve.total(), 0.0);
    }

    #[test]
    fn zero_curve_hourly() {
        let curve = Profile::zero_curve(60);
        assert_eq!(curve.len(), 24);
        assert_eq!(curve.iter().last().map(|(k, _)| k), Some("23:00"));
    }

    #[test]
    fn display_lists_slots_in_order() {
        let profile: Profile = [("00:15".to_string(), 2.0), ("00:00".to_string(), 1.0)]
            .into_iter()
            .collect();
        assert_eq!(profile.to_string(), "00:00 1.0000\n00:15 2.0000\n");
    }

    #[test]
    fn load_profile_accessors() {
        let fallback = LoadProfile::ZeroCurve(Profile::zero_curve(60));
        assert!(fallback.is_zero_curve());
        assert_eq!(fallback.profile().len(), 24);
        assert!(!LoadProfile::Measured(Profile::default()).is_zero_curve());
    }
}
