//! Recurrence expansion.
//!
//! A [`RecurrenceSpec`] turns a start date plus a stored recurrence rule into a
//! lazy, strictly increasing sequence of calendar dates. Month and year steps
//! are anchored on the start date (`start + k * N months`) and clamped to the
//! end of the target month, so a rule starting on the 31st never drifts.

use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use model::entities::recurrence_rule::{self, EndCondition, IntervalUnit};
use tracing::{debug, trace};

use crate::dates::{add_days, add_months, is_weekend, week_start};
use crate::error::{ComputeError, Result};

/// Hard cap on the number of occurrences emitted at or after the point an
/// iteration starts from.
pub const MAX_OCCURRENCES: usize = 5000;

/// Consecutive rejected candidates examined before the sequence gives up.
pub const MAX_REJECTED_CANDIDATES: usize = 1000;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn invalid(message: impl Into<String>) -> ComputeError {
    ComputeError::Recurrence(message.into())
}

/// A set of weekdays, stored as a bitmask with Monday in the lowest bit.
///
/// The textual form is a comma separated list of day numbers with Monday = 0,
/// e.g. `"0,2,4"` for Monday, Wednesday and Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    pub const ALL: WeekdaySet = WeekdaySet(0b111_1111);
    pub const WORKDAYS: WeekdaySet = WeekdaySet(0b001_1111);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn single(day: Weekday) -> Self {
        WeekdaySet(Self::bit(day))
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn intersection(self, other: WeekdaySet) -> WeekdaySet {
        WeekdaySet(self.0 & other.0)
    }

    /// Days in the set, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> {
        let set = *self;
        WEEK.into_iter().filter(move |day| set.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl FromStr for WeekdaySet {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self> {
        let mut set = WeekdaySet::EMPTY;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day = part
                .parse::<usize>()
                .ok()
                .and_then(|n| WEEK.get(n).copied())
                .ok_or_else(|| invalid(format!("invalid weekday '{}', expected 0 (Mon) to 6 (Sun)", part)))?;
            set.insert(day);
        }
        if set.is_empty() {
            return Err(invalid("weekday list is empty"));
        }
        Ok(set)
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<String> = self
            .iter()
            .map(|day| day.num_days_from_monday().to_string())
            .collect();
        write!(f, "{}", days.join(","))
    }
}

/// When a recurrence stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndRule {
    Never,
    /// Inclusive last date.
    Until(NaiveDate),
    /// Number of occurrences counted from the start date.
    Count(u32),
}

/// Validated recurrence parameters anchored on a start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    start: NaiveDate,
    interval: u32,
    unit: IntervalUnit,
    weekdays: Option<WeekdaySet>,
    only_workdays: bool,
    end: EndRule,
}

impl RecurrenceSpec {
    pub fn new(start: NaiveDate, interval: u32, unit: IntervalUnit) -> Self {
        Self {
            start,
            interval,
            unit,
            weekdays: None,
            only_workdays: false,
            end: EndRule::Never,
        }
    }

    /// A single occurrence on `start`, used for plans without a rule.
    pub fn once(start: NaiveDate) -> Self {
        Self::new(start, 1, IntervalUnit::Days).ending(EndRule::Count(1))
    }

    pub fn with_weekdays(mut self, weekdays: WeekdaySet) -> Self {
        self.weekdays = Some(weekdays);
        self
    }

    pub fn workdays_only(mut self, only_workdays: bool) -> Self {
        self.only_workdays = only_workdays;
        self
    }

    pub fn ending(mut self, end: EndRule) -> Self {
        self.end = end;
        self
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> EndRule {
        self.end
    }

    /// Builds and validates the spec of a stored rule.
    pub fn from_rule(start: NaiveDate, rule: &recurrence_rule::Model) -> Result<Self> {
        let interval = u32::try_from(rule.interval)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| invalid(format!("interval must be at least 1, got {}", rule.interval)))?;

        let weekdays = match rule.weekdays.as_deref().map(str::trim) {
            Some(list) if !list.is_empty() => Some(list.parse::<WeekdaySet>()?),
            _ => None,
        };

        let end = match rule.end_condition {
            EndCondition::Never => EndRule::Never,
            EndCondition::UntilDate => EndRule::Until(
                rule.end_date
                    .ok_or_else(|| invalid("an end date is required for UntilDate"))?,
            ),
            EndCondition::AfterCount => {
                let count = rule
                    .occurrence_count
                    .ok_or_else(|| invalid("an occurrence count is required for AfterCount"))?;
                EndRule::Count(
                    u32::try_from(count)
                        .map_err(|_| invalid(format!("occurrence count must be positive, got {}", count)))?,
                )
            }
        };

        let spec = Self {
            start,
            interval,
            unit: rule.effective_unit(),
            weekdays,
            only_workdays: rule.only_workdays,
            end,
        };
        spec.validate()?;
        debug!(?spec, "Built recurrence spec from rule");
        Ok(spec)
    }

    /// Rejects rules that are malformed or can never produce a date.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(invalid("interval must be at least 1"));
        }
        match self.end {
            EndRule::Until(until) if until < self.start => {
                return Err(invalid(format!(
                    "end date {} is before start date {}",
                    until, self.start
                )));
            }
            EndRule::Count(0) => return Err(invalid("occurrence count must be at least 1")),
            _ => {}
        }
        if self.weekdays.is_some_and(|set| set.is_empty()) {
            return Err(invalid("weekday list is empty"));
        }

        let allowed = self.allowed_weekdays();
        if allowed.is_empty() {
            return Err(invalid("weekday set and workdays-only leave no allowed day"));
        }
        if let Some(reachable) = self.reachable_weekdays() {
            if reachable.intersection(allowed).is_empty() {
                return Err(invalid("no stepped date ever falls on an allowed weekday"));
            }
        }
        Ok(())
    }

    fn allowed_weekdays(&self) -> WeekdaySet {
        let allowed = self.weekdays.unwrap_or(WeekdaySet::ALL);
        if self.only_workdays {
            allowed.intersection(WeekdaySet::WORKDAYS)
        } else {
            allowed
        }
    }

    /// Weekdays the stepping can land on, `None` when it reaches all of them.
    fn reachable_weekdays(&self) -> Option<WeekdaySet> {
        match self.unit {
            IntervalUnit::Days if self.interval % 7 == 0 => Some(WeekdaySet::single(self.start.weekday())),
            IntervalUnit::Weeks if self.weekdays.is_none() => {
                Some(WeekdaySet::single(self.start.weekday()))
            }
            _ => None,
        }
    }

    fn accepts(&self, date: NaiveDate) -> bool {
        if self.only_workdays && is_weekend(date) {
            return false;
        }
        self.weekdays.map_or(true, |days| days.contains(date.weekday()))
    }

    /// A step whose candidates all fall before `from`, or step 0.
    ///
    /// Count rules always start at step 0 since their cap counts from the
    /// start date.
    fn first_step_near(&self, from: NaiveDate) -> u32 {
        if from <= self.start || matches!(self.end, EndRule::Count(_)) {
            return 0;
        }
        let units = match self.unit {
            IntervalUnit::Days => (from - self.start).num_days(),
            IntervalUnit::Weeks => (week_start(from) - week_start(self.start)).num_days() / 7,
            IntervalUnit::Months => {
                (from.year() - self.start.year()) as i64 * 12 + from.month() as i64 - self.start.month() as i64
            }
            IntervalUnit::Years => (from.year() - self.start.year()) as i64,
        };
        let step = units / self.interval as i64 - 1;
        u32::try_from(step.max(0)).unwrap_or(u32::MAX)
    }

    /// Lazy iterator over every occurrence of the rule.
    pub fn occurrences(&self) -> Occurrences {
        self.occurrences_from(self.start)
    }

    /// Lazy iterator that skips ahead to the stepping around `from`.
    ///
    /// A few occurrences before `from` may still be yielded; callers filter
    /// them. The safety cap counts only occurrences at or after `from`.
    pub fn occurrences_from(&self, from: NaiveDate) -> Occurrences {
        let step = self.first_step_near(from);
        if step > 0 {
            trace!(start = %self.start, %from, step, "Skipping ahead in recurrence");
        }
        Occurrences {
            spec: self.clone(),
            step,
            pending: VecDeque::new(),
            from,
            counted: 0,
            in_window: 0,
            rejected: 0,
            last: None,
            finished: false,
        }
    }

    /// Occurrences inside the inclusive window `[from, to]`.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if to < from {
            return Vec::new();
        }
        self.occurrences_from(from)
            .skip_while(|date| *date < from)
            .take_while(|date| *date <= to)
            .collect()
    }

    /// First occurrence strictly after `date`.
    pub fn next_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.occurrences_from(date).find(|candidate| *candidate > date)
    }
}

/// Iterator returned by [`RecurrenceSpec::occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences {
    spec: RecurrenceSpec,
    step: u32,
    pending: VecDeque<NaiveDate>,
    from: NaiveDate,
    /// Emitted since the rule start, only used by count rules.
    counted: usize,
    /// Emitted at or after `from`.
    in_window: usize,
    rejected: usize,
    last: Option<NaiveDate>,
    finished: bool,
}

impl Occurrences {
    fn exhausted(&self) -> bool {
        let count_reached = match self.spec.end {
            EndRule::Count(count) => self.counted >= count as usize,
            _ => false,
        };
        count_reached || self.in_window >= MAX_OCCURRENCES
    }

    /// Queues the candidates of the next step.
    fn advance(&mut self) -> Result<()> {
        let offset = self
            .step
            .checked_mul(self.spec.interval)
            .ok_or_else(|| ComputeError::Date("recurrence step overflow".to_string()))?;
        self.step = self.step.saturating_add(1);
        let start = self.spec.start;

        match self.spec.unit {
            IntervalUnit::Days => self.pending.push_back(add_days(start, offset as i64)?),
            IntervalUnit::Weeks => match self.spec.weekdays {
                Some(days) => {
                    let week = add_days(week_start(start), 7 * offset as i64)?;
                    for day in days.iter() {
                        let date = add_days(week, day.num_days_from_monday() as i64)?;
                        if date >= start {
                            self.pending.push_back(date);
                        }
                    }
                }
                None => self.pending.push_back(add_days(start, 7 * offset as i64)?),
            },
            IntervalUnit::Months => self.pending.push_back(add_months(start, offset)?),
            IntervalUnit::Years => {
                let months = offset
                    .checked_mul(12)
                    .ok_or_else(|| ComputeError::Date("recurrence step overflow".to_string()))?;
                self.pending.push_back(add_months(start, months)?)
            }
        }
        Ok(())
    }

    fn reject(&mut self) {
        self.rejected += 1;
        if self.rejected >= MAX_REJECTED_CANDIDATES {
            trace!(start = %self.spec.start, "Too many rejected candidates, stopping");
            self.finished = true;
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while !self.finished {
            if self.exhausted() {
                self.finished = true;
                break;
            }

            let candidate = match self.pending.pop_front() {
                Some(date) => date,
                None => {
                    if let Err(err) = self.advance() {
                        trace!(%err, "Recurrence left the calendar range");
                        self.finished = true;
                    } else if self.pending.is_empty() {
                        self.reject();
                    }
                    continue;
                }
            };

            if let EndRule::Until(until) = self.spec.end {
                if candidate > until {
                    self.finished = true;
                    break;
                }
            }

            let repeated = self.last.is_some_and(|last| candidate <= last);
            if repeated || !self.spec.accepts(candidate) {
                self.reject();
                continue;
            }

            self.rejected = 0;
            self.counted += 1;
            if candidate >= self.from {
                self.in_window += 1;
            }
            self.last = Some(candidate);
            return Some(candidate);
        }
        None
    }
}

impl FusedIterator for Occurrences {}

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::recurrence_rule::Frequency;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule(frequency: Frequency, interval: i32) -> recurrence_rule::Model {
        recurrence_rule::Model {
            id: 1,
            planned_transaction_id: 1,
            frequency,
            interval,
            interval_unit: IntervalUnit::Days,
            weekdays: None,
            only_workdays: false,
            end_condition: EndCondition::Never,
            end_date: None,
            occurrence_count: None,
        }
    }

    fn assert_strictly_increasing(dates: &[NaiveDate]) {
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1], "{} is not before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_weekday_set_parse_and_format() {
        let set: WeekdaySet = " 4, 0 ,2".parse().unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Wed));
        assert!(set.contains(Weekday::Fri));
        assert!(!set.contains(Weekday::Tue));
        assert_eq!(set.to_string(), "0,2,4");

        assert!("7".parse::<WeekdaySet>().is_err());
        assert!("mon".parse::<WeekdaySet>().is_err());
        assert!(" , ".parse::<WeekdaySet>().is_err());

        let weekend: WeekdaySet = [Weekday::Sat, Weekday::Sun].into_iter().collect();
        assert!(weekend.intersection(WeekdaySet::WORKDAYS).is_empty());
    }

    #[test]
    fn test_monthly_from_31st_clamps_without_drift() {
        let spec = RecurrenceSpec::new(d(2024, 1, 31), 1, IntervalUnit::Months)
            .ending(EndRule::Count(5));
        let dates: Vec<_> = spec.occurrences().collect();
        assert_eq!(
            dates,
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30), d(2024, 5, 31)]
        );
    }

    #[test]
    fn test_yearly_leap_day() {
        let spec = RecurrenceSpec::new(d(2024, 2, 29), 1, IntervalUnit::Years)
            .ending(EndRule::Count(5));
        let dates: Vec<_> = spec.occurrences().collect();
        assert_eq!(
            dates,
            vec![d(2024, 2, 29), d(2025, 2, 28), d(2026, 2, 28), d(2027, 2, 28), d(2028, 2, 29)]
        );
    }

    #[test]
    fn test_daily_workdays_only_skips_weekend() {
        // 2024-05-17 is a Friday
        let spec = RecurrenceSpec::new(d(2024, 5, 17), 1, IntervalUnit::Days)
            .workdays_only(true)
            .ending(EndRule::Count(3));
        let dates: Vec<_> = spec.occurrences().collect();
        assert_eq!(dates, vec![d(2024, 5, 17), d(2024, 5, 20), d(2024, 5, 21)]);
    }

    #[test]
    fn test_biweekly_with_weekday_set() {
        // Start on Wednesday 2024-05-15, every second week on Mon/Wed/Fri
        let spec = RecurrenceSpec::new(d(2024, 5, 15), 2, IntervalUnit::Weeks)
            .with_weekdays("0,2,4".parse().unwrap())
            .ending(EndRule::Count(5));
        let dates: Vec<_> = spec.occurrences().collect();
        assert_eq!(
            dates,
            vec![d(2024, 5, 15), d(2024, 5, 17), d(2024, 5, 27), d(2024, 5, 29), d(2024, 5, 31)]
        );
    }

    #[test]
    fn test_monthly_with_weekday_filter() {
        // The 15th falls on a Monday in Jan, Apr and Jul 2024
        let spec = RecurrenceSpec::new(d(2024, 1, 15), 1, IntervalUnit::Months)
            .with_weekdays(WeekdaySet::single(Weekday::Mon))
            .ending(EndRule::Count(3));
        let dates: Vec<_> = spec.occurrences().collect();
        assert_eq!(dates, vec![d(2024, 1, 15), d(2024, 4, 15), d(2024, 7, 15)]);
    }

    #[test]
    fn test_until_is_inclusive() {
        let spec = RecurrenceSpec::new(d(2024, 1, 1), 3, IntervalUnit::Days)
            .ending(EndRule::Until(d(2024, 1, 10)));
        let dates: Vec<_> = spec.occurrences().collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 4), d(2024, 1, 7), d(2024, 1, 10)]);
    }

    #[test]
    fn test_safety_cap_on_endless_rule() {
        let spec = RecurrenceSpec::new(d(2024, 1, 1), 1, IntervalUnit::Days);
        let dates: Vec<_> = spec.occurrences().collect();
        assert_eq!(dates.len(), MAX_OCCURRENCES);
        assert_eq!(dates.last().copied(), Some(d(2024, 1, 1) + chrono::Duration::days(4999)));
    }

    #[test]
    fn test_window_far_after_start_of_endless_rule() {
        let spec = RecurrenceSpec::new(d(2010, 1, 1), 1, IntervalUnit::Days);
        let may = spec.between(d(2024, 5, 1), d(2024, 5, 31));
        assert_eq!(may.len(), 31);
        assert_eq!(may.first().copied(), Some(d(2024, 5, 1)));
        assert_eq!(may.last().copied(), Some(d(2024, 5, 31)));
        assert_eq!(spec.next_after(d(2024, 5, 1)), Some(d(2024, 5, 2)));

        let long = spec.between(d(2024, 1, 1), d(2040, 12, 31));
        assert_eq!(long.len(), MAX_OCCURRENCES);
        assert_eq!(long.first().copied(), Some(d(2024, 1, 1)));

        let monthly = RecurrenceSpec::new(d(2010, 1, 31), 1, IntervalUnit::Months);
        assert_eq!(
            monthly.between(d(2024, 2, 1), d(2024, 4, 30)),
            vec![d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
        );

        let fortnightly = RecurrenceSpec::new(d(2010, 1, 4), 2, IntervalUnit::Weeks)
            .with_weekdays([Weekday::Mon, Weekday::Fri].into_iter().collect());
        let window = fortnightly.between(d(2024, 5, 1), d(2024, 5, 31));
        assert!(!window.is_empty());
        assert!(window.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(window
            .iter()
            .all(|date| matches!(date.weekday(), Weekday::Mon | Weekday::Fri)));
        assert_eq!(fortnightly.next_after(d(2024, 5, 1)), window.first().copied());
    }

    #[test]
    fn test_count_is_counted_from_start() {
        let spec = RecurrenceSpec::new(d(2024, 1, 31), 1, IntervalUnit::Months)
            .ending(EndRule::Count(3));
        assert_eq!(spec.between(d(2024, 3, 1), d(2024, 12, 31)), vec![d(2024, 3, 31)]);
    }

    #[test]
    fn test_between_and_next_after() {
        let spec = RecurrenceSpec::new(d(2024, 1, 31), 1, IntervalUnit::Months);
        let window = spec.between(d(2024, 3, 1), d(2024, 6, 30));
        assert_eq!(window, vec![d(2024, 3, 31), d(2024, 4, 30), d(2024, 5, 31), d(2024, 6, 30)]);
        assert_eq!(spec.between(d(2024, 3, 1), d(2024, 6, 30)), window);
        assert!(spec.between(d(2024, 6, 30), d(2024, 3, 1)).is_empty());

        assert_eq!(spec.next_after(d(2024, 2, 29)), Some(d(2024, 3, 31)));
        assert_eq!(spec.next_after(d(2023, 12, 1)), Some(d(2024, 1, 31)));

        let single = RecurrenceSpec::once(d(2024, 5, 1));
        assert_eq!(single.occurrences().collect::<Vec<_>>(), vec![d(2024, 5, 1)]);
        assert_eq!(single.next_after(d(2024, 5, 1)), None);
    }

    #[test]
    fn test_sequences_are_strictly_increasing() {
        let specs = vec![
            RecurrenceSpec::new(d(2024, 1, 31), 1, IntervalUnit::Months),
            RecurrenceSpec::new(d(2024, 2, 29), 1, IntervalUnit::Years),
            RecurrenceSpec::new(d(2024, 5, 15), 1, IntervalUnit::Weeks)
                .with_weekdays(WeekdaySet::ALL)
                .workdays_only(true),
            RecurrenceSpec::new(d(2024, 5, 18), 5, IntervalUnit::Days).workdays_only(true),
        ];
        for spec in specs {
            spec.validate().unwrap();
            let dates = spec.between(d(2024, 1, 1), d(2030, 12, 31));
            assert!(!dates.is_empty());
            assert_strictly_increasing(&dates);
        }
    }

    #[test]
    fn test_from_rule_presets_and_custom() {
        let start = d(2024, 1, 1);

        let mut weekly = rule(Frequency::Weekly, 2);
        weekly.end_condition = EndCondition::AfterCount;
        weekly.occurrence_count = Some(3);
        let spec = RecurrenceSpec::from_rule(start, &weekly).unwrap();
        assert_eq!(
            spec.occurrences().collect::<Vec<_>>(),
            vec![d(2024, 1, 1), d(2024, 1, 15), d(2024, 1, 29)]
        );

        let mut custom = rule(Frequency::Custom, 10);
        custom.interval_unit = IntervalUnit::Days;
        custom.end_condition = EndCondition::UntilDate;
        custom.end_date = Some(d(2024, 1, 25));
        let spec = RecurrenceSpec::from_rule(start, &custom).unwrap();
        assert_eq!(
            spec.occurrences().collect::<Vec<_>>(),
            vec![d(2024, 1, 1), d(2024, 1, 11), d(2024, 1, 21)]
        );

        // Blank weekday list means no filter
        let mut blank = rule(Frequency::Daily, 1);
        blank.weekdays = Some("  ".to_string());
        assert!(RecurrenceSpec::from_rule(start, &blank).is_ok());
    }

    #[test]
    fn test_from_rule_rejects_invalid_rules() {
        let start = d(2024, 1, 6); // Saturday

        assert!(RecurrenceSpec::from_rule(start, &rule(Frequency::Daily, 0)).is_err());

        let mut weekend_only = rule(Frequency::Daily, 1);
        weekend_only.weekdays = Some("5,6".to_string());
        weekend_only.only_workdays = true;
        assert!(RecurrenceSpec::from_rule(start, &weekend_only).is_err());

        let mut until_before = rule(Frequency::Monthly, 1);
        until_before.end_condition = EndCondition::UntilDate;
        until_before.end_date = Some(d(2023, 12, 31));
        assert!(RecurrenceSpec::from_rule(start, &until_before).is_err());

        let mut missing_date = rule(Frequency::Monthly, 1);
        missing_date.end_condition = EndCondition::UntilDate;
        assert!(RecurrenceSpec::from_rule(start, &missing_date).is_err());

        let mut zero_count = rule(Frequency::Monthly, 1);
        zero_count.end_condition = EndCondition::AfterCount;
        zero_count.occurrence_count = Some(0);
        assert!(RecurrenceSpec::from_rule(start, &zero_count).is_err());

        let mut bad_weekday = rule(Frequency::Daily, 1);
        bad_weekday.weekdays = Some("1,9".to_string());
        assert!(RecurrenceSpec::from_rule(start, &bad_weekday).is_err());

        // Weekly on a Saturday can never hit a workday
        let mut weekly_saturday = rule(Frequency::Weekly, 1);
        weekly_saturday.only_workdays = true;
        assert!(RecurrenceSpec::from_rule(start, &weekly_saturday).is_err());

        let mut every_seven_days = rule(Frequency::Custom, 7);
        every_seven_days.only_workdays = true;
        assert!(RecurrenceSpec::from_rule(start, &every_seven_days).is_err());
    }
}
