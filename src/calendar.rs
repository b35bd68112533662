use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub duration_hours: f64,
    #[serde(default)]
    pub is_all_day: bool,
}

impl Meeting {
    pub fn new(duration_hours: f64) -> Self {
        Self {
            subject: None,
            duration_hours,
            is_all_day: false,
        }
    }

    pub fn all_day() -> Self {
        Self {
            subject: None,
            duration_hours: 0.0,
            is_all_day: true,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Hours this meeting removes from the working day. All-day events block nothing.
    pub fn blocked_hours(&self) -> f64 {
        if self.is_all_day {
            0.0
        } else {
            self.duration_hours
        }
    }
}

/// Hours a single work day offers after meetings are taken out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayCapacity {
    pub day: Weekday,
    pub available_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub total_meetings: usize,
    pub total_meeting_hours: f64,
    pub average_meetings_per_day: f64,
    pub average_meeting_hours_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkWeekConfig {
    pub work_days: Vec<Weekday>,
    pub hours_per_day: f64,
    #[serde(default)]
    pub meetings_by_day: HashMap<Weekday, Vec<Meeting>>,
}

impl Default for WorkWeekConfig {
    fn default() -> Self {
        Self::new(
            [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            8.0,
        )
    }
}

impl WorkWeekConfig {
    pub fn new<I>(work_days: I, hours_per_day: f64) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self {
            work_days: work_days.into_iter().collect(),
            hours_per_day,
            meetings_by_day: HashMap::new(),
        }
    }

    pub fn add_meeting(&mut self, day: Weekday, meeting: Meeting) {
        self.meetings_by_day.entry(day).or_default().push(meeting);
    }

    pub fn with_meeting(mut self, day: Weekday, meeting: Meeting) -> Self {
        self.add_meeting(day, meeting);
        self
    }

    pub fn set_meetings(&mut self, meetings_by_day: HashMap<Weekday, Vec<Meeting>>) {
        self.meetings_by_day = meetings_by_day;
    }

    pub fn meetings_on(&self, day: Weekday) -> &[Meeting] {
        self.meetings_by_day
            .get(&day)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn meeting_hours_on(&self, day: Weekday) -> f64 {
        self.meetings_on(day).iter().map(Meeting::blocked_hours).sum()
    }

    pub fn available_hours_on(&self, day: Weekday) -> f64 {
        (self.hours_per_day - self.meeting_hours_on(day)).max(0.0)
    }

    /// Per-day capacity in configured day order.
    pub fn day_capacities(&self) -> Vec<DayCapacity> {
        self.work_days
            .iter()
            .map(|&day| DayCapacity {
                day,
                available_hours: self.available_hours_on(day),
            })
            .collect()
    }

    pub fn total_available_hours(&self) -> f64 {
        self.day_capacities()
            .iter()
            .map(|capacity| capacity.available_hours)
            .sum()
    }

    /// Meeting load over the configured work days.
    pub fn meeting_summary(&self) -> MeetingSummary {
        let total_meetings: usize = self
            .work_days
            .iter()
            .map(|&day| self.meetings_on(day).len())
            .sum();
        let total_meeting_hours: f64 = self
            .work_days
            .iter()
            .map(|&day| self.meeting_hours_on(day))
            .sum();
        let day_count = self.work_days.len();
        let (average_meetings_per_day, average_meeting_hours_per_day) = if day_count == 0 {
            (0.0, 0.0)
        } else {
            (
                round_to(total_meetings as f64 / day_count as f64, 1),
                round_to(total_meeting_hours / day_count as f64, 2),
            )
        };
        MeetingSummary {
            total_meetings,
            total_meeting_hours: round_to(total_meeting_hours, 2),
            average_meetings_per_day,
            average_meeting_hours_per_day,
        }
    }
}

/// Parses a comma separated day list such as `Monday,Tue,wednesday`.
pub fn parse_work_days(input: &str) -> Result<Vec<Weekday>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<Weekday>()
                .map_err(|_| format!("unknown work day '{part}'"))
        })
        .collect()
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Full English name of `day`, as advisory proposals and reports spell it.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
