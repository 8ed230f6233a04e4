//! Rate schedules keyed by effective date

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, warn};

use super::{builtin_schedule, RateSchedule};
use crate::error::ScheduleError;

/// Set of schedules, one per effective date
#[derive(Debug, Clone, Default)]
pub struct ScheduleRegistry {
    schedules: BTreeMap<NaiveDate, Arc<RateSchedule>>,
}

impl ScheduleRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in schedule
    pub fn with_builtin() -> Self {
        let builtin = builtin_schedule();
        let mut schedules = BTreeMap::new();
        schedules.insert(builtin.effective_date, builtin);
        Self { schedules }
    }

    /// Validate and add a schedule, replacing any with the same effective date
    pub fn insert(&mut self, schedule: RateSchedule) -> Result<Arc<RateSchedule>, ScheduleError> {
        schedule.validate()?;
        let date = schedule.effective_date;
        let schedule = Arc::new(schedule);
        if self.schedules.insert(date, schedule.clone()).is_some() {
            warn!("replaced rate schedule effective {}", date);
        } else {
            debug!("registered rate schedule effective {}", date);
        }
        Ok(schedule)
    }

    /// Schedule with exactly this effective date
    pub fn get(&self, effective_date: NaiveDate) -> Option<Arc<RateSchedule>> {
        self.schedules.get(&effective_date).cloned()
    }

    /// Schedule in force on `date`: the latest one effective on or before it
    pub fn effective_on(&self, date: NaiveDate) -> Option<Arc<RateSchedule>> {
        self.schedules
            .range(..=date)
            .next_back()
            .map(|(_, schedule)| schedule.clone())
    }

    /// Most recent schedule
    pub fn latest(&self) -> Option<Arc<RateSchedule>> {
        self.schedules.values().next_back().cloned()
    }

    /// Effective dates, ascending
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.schedules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::texas_2019;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registry_with_successor() -> ScheduleRegistry {
        let mut registry = ScheduleRegistry::with_builtin();
        let mut successor = texas_2019::schedule();
        successor.effective_date = date(2023, 1, 1);
        registry.insert(successor).unwrap();
        registry
    }

    #[test]
    fn test_effective_on_picks_latest_not_after() {
        let registry = registry_with_successor();

        assert!(registry.effective_on(date(2019, 8, 31)).is_none());
        assert_eq!(registry.effective_on(date(2019, 9, 1)).unwrap().effective_date, date(2019, 9, 1));
        assert_eq!(registry.effective_on(date(2022, 12, 31)).unwrap().effective_date, date(2019, 9, 1));
        assert_eq!(registry.effective_on(date(2024, 6, 1)).unwrap().effective_date, date(2023, 1, 1));
    }

    #[test]
    fn test_latest_and_dates() {
        let registry = registry_with_successor();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.dates(), vec![date(2019, 9, 1), date(2023, 1, 1)]);
        assert_eq!(registry.latest().unwrap().effective_date, date(2023, 1, 1));
        assert!(registry.get(date(2020, 1, 1)).is_none());
    }

    #[test]
    fn test_insert_rejects_invalid_schedule() {
        let mut registry = ScheduleRegistry::new();
        let mut broken = texas_2019::schedule();
        broken.minimum_policy_amount = 1;

        assert!(registry.insert(broken).is_err());
        assert!(registry.is_empty());
    }
}
