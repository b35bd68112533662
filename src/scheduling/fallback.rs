use super::{HOURS_EPSILON, ScheduledSegment, UnassignedTask, WorkDay};
use crate::calendar::{DayCapacity, day_name, round_to};
use crate::task::Task;

/// Tasks in fallback order. Stable, so fully tied tasks keep their input order.
pub(crate) fn fallback_order(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by(|a, b| a.scheduling_order(b));
    ordered
}

pub(crate) fn empty_days(capacities: &[DayCapacity]) -> Vec<WorkDay> {
    capacities
        .iter()
        .map(|capacity| WorkDay {
            day: capacity.day,
            available_hours: capacity.available_hours,
            segments: Vec::new(),
        })
        .collect()
}

pub(crate) fn unassigned(task: &Task, remaining_hours: f64) -> UnassignedTask {
    UnassignedTask {
        task_key: task.key.clone(),
        remaining_hours,
        reason: format!(
            "Not enough time available in work week (still needs {}h)",
            round_to(remaining_hours, 2)
        ),
    }
}

/// Packs `tasks` in the given order into consecutive days, splitting a task
/// whenever the current day fills up.
pub(crate) fn pack(
    tasks: &[&Task],
    capacities: &[DayCapacity],
) -> (Vec<WorkDay>, Vec<UnassignedTask>) {
    let mut days = empty_days(capacities);
    let mut unassigned_tasks = Vec::new();
    let mut day_idx = 0usize;
    let mut used = 0.0f64;

    for task in tasks {
        let mut remaining = task.remaining_hours;
        if remaining <= HOURS_EPSILON {
            continue;
        }
        while remaining > HOURS_EPSILON && day_idx < days.len() {
            let free = days[day_idx].available_hours - used;
            if free <= HOURS_EPSILON {
                day_idx += 1;
                used = 0.0;
                continue;
            }
            let hours = remaining.min(free);
            let day = &mut days[day_idx];
            day.segments.push(ScheduledSegment {
                task_key: task.key.clone(),
                allocated_hours: hours,
                reason: format!("Part of task scheduled in {} ({hours}h)", day_name(day.day)),
            });
            used += hours;
            remaining -= hours;
        }
        if remaining > HOURS_EPSILON {
            unassigned_tasks.push(unassigned(task, remaining));
        }
    }
    (days, unassigned_tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskPriority;
    use chrono::Weekday;

    fn cap(day: Weekday, hours: f64) -> DayCapacity {
        DayCapacity {
            day,
            available_hours: hours,
        }
    }

    #[test]
    fn splits_across_days_and_skips_empty_tasks() {
        let tasks = [
            Task::new("A", TaskPriority::High, 10.0),
            Task::new("Z", TaskPriority::High, 0.0),
        ];
        let ordered = fallback_order(&tasks);
        let week = [cap(Weekday::Mon, 8.0), cap(Weekday::Tue, 8.0)];
        let (days, unassigned) = pack(&ordered, &week);
        assert_eq!(days[0].segments.len(), 1);
        assert_eq!(days[0].segments[0].allocated_hours, 8.0);
        assert_eq!(days[1].segments[0].allocated_hours, 2.0);
        assert!(unassigned.is_empty());
    }

    #[test]
    fn tied_tasks_keep_input_order() {
        let due = chrono::NaiveDate::from_ymd_opt(2025, 6, 9);
        let tasks: Vec<Task> = ["T-2", "T-9", "T-1"]
            .into_iter()
            .map(|key| {
                let mut task = Task::new(key, TaskPriority::High, 2.0);
                task.due_date = due;
                task
            })
            .collect();
        let ordered = fallback_order(&tasks);
        let keys: Vec<&str> = ordered.iter().map(|task| task.key.as_str()).collect();
        assert_eq!(keys, vec!["T-2", "T-9", "T-1"]);
    }

    #[test]
    fn zero_hour_days_are_skipped() {
        let tasks = [Task::new("A", TaskPriority::Low, 3.0)];
        let ordered = fallback_order(&tasks);
        let (days, _) = pack(&ordered, &[cap(Weekday::Mon, 0.0), cap(Weekday::Tue, 4.0)]);
        assert!(days[0].segments.is_empty());
        assert_eq!(days[1].segments[0].task_key, "A");
        assert!(days[1].segments[0].reason.contains("Tuesday"));
    }
}
