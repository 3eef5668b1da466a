use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthInfo {
    pub number: u32,
    pub name: &'static str,
    pub num_days: u32,
}

/// The comfort calendar. February always has 28 days; leap days are dropped.
pub const MONTHS: [MonthInfo; 12] = [
    MonthInfo { number: 1, name: "jan", num_days: 31 },
    MonthInfo { number: 2, name: "feb", num_days: 28 },
    MonthInfo { number: 3, name: "mar", num_days: 31 },
    MonthInfo { number: 4, name: "apr", num_days: 30 },
    MonthInfo { number: 5, name: "may", num_days: 31 },
    MonthInfo { number: 6, name: "jun", num_days: 30 },
    MonthInfo { number: 7, name: "jul", num_days: 31 },
    MonthInfo { number: 8, name: "aug", num_days: 31 },
    MonthInfo { number: 9, name: "sep", num_days: 30 },
    MonthInfo { number: 10, name: "oct", num_days: 31 },
    MonthInfo { number: 11, name: "nov", num_days: 30 },
    MonthInfo { number: 12, name: "dec", num_days: 31 },
];

pub fn month_info(month: u32) -> Option<&'static MonthInfo> {
    month
        .checked_sub(1)
        .and_then(|index| MONTHS.get(index as usize))
}

/// True if (month, day) names a slot of the comfort calendar
pub fn is_calendar_day(month: u32, day: u32) -> bool {
    month_info(month).is_some_and(|info| day >= 1 && day <= info.num_days)
}

/// Zero-based day-of-year slot, `None` for Feb 29 and impossible dates
pub fn day_of_year_slot(month: u32, day: u32) -> Option<usize> {
    if !is_calendar_day(month, day) {
        return None;
    }
    let preceding: u32 = MONTHS[..(month - 1) as usize]
        .iter()
        .map(|info| info.num_days)
        .sum();
    Some((preceding + day - 1) as usize)
}

/// Fixed-shape per-day storage: twelve months, each exactly as long as the month
#[derive(Debug, Clone, PartialEq)]
pub struct DayGrid<T> {
    months: [Vec<T>; 12],
}

impl<T> DayGrid<T> {
    pub fn from_fn<F>(mut init: F) -> Self
    where
        F: FnMut(u32, u32) -> T,
    {
        let months = std::array::from_fn(|index| {
            let info = &MONTHS[index];
            (1..=info.num_days).map(|day| init(info.number, day)).collect()
        });
        Self { months }
    }

    pub fn get(&self, month: u32, day: u32) -> Option<&T> {
        if !is_calendar_day(month, day) {
            return None;
        }
        self.months[(month - 1) as usize].get((day - 1) as usize)
    }

    pub fn get_mut(&mut self, month: u32, day: u32) -> Option<&mut T> {
        if !is_calendar_day(month, day) {
            return None;
        }
        self.months[(month - 1) as usize].get_mut((day - 1) as usize)
    }

    /// All days of one month, `None` for an unknown month
    pub fn month(&self, month: u32) -> Option<&[T]> {
        month_info(month).map(|_| self.months[(month - 1) as usize].as_slice())
    }

    /// Iterate months in calendar order together with their info
    pub fn months(&self) -> impl Iterator<Item = (&'static MonthInfo, &[T])> {
        MONTHS.iter().zip(self.months.iter().map(Vec::as_slice))
    }

    pub fn map<U, F>(&self, mut f: F) -> DayGrid<U>
    where
        F: FnMut(&T) -> U,
    {
        DayGrid {
            months: std::array::from_fn(|index| self.months[index].iter().map(&mut f).collect()),
        }
    }
}

impl<T: Default> Default for DayGrid<T> {
    fn default() -> Self {
        Self::from_fn(|_, _| T::default())
    }
}

impl<T: Serialize> Serialize for DayGrid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MONTHS.len()))?;
        for (info, days) in self.months() {
            map.serialize_entry(info.name, days)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DayGrid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw: HashMap<String, Vec<T>> = HashMap::deserialize(deserializer)?;
        let mut months = Vec::with_capacity(MONTHS.len());

        for info in &MONTHS {
            let days = raw
                .remove(info.name)
                .ok_or_else(|| D::Error::custom(format!("missing month '{}'", info.name)))?;
            if days.len() != info.num_days as usize {
                return Err(D::Error::custom(format!(
                    "month '{}' has {} days, expected {}",
                    info.name,
                    days.len(),
                    info.num_days
                )));
            }
            months.push(days);
        }

        let months: [Vec<T>; 12] = months
            .try_into()
            .map_err(|_| D::Error::custom("expected twelve months"))?;
        Ok(Self { months })
    }
}
