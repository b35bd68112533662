use capacity_planner::calendar::day_name;
use capacity_planner::{Meeting, WorkWeekConfig, parse_work_days};
use chrono::Weekday;

#[test]
fn default_week_is_five_eight_hour_days() {
    let week = WorkWeekConfig::default();
    assert_eq!(week.work_days.first(), Some(&Weekday::Mon));
    assert_eq!(week.work_days.last(), Some(&Weekday::Fri));
    assert_eq!(week.total_available_hours(), 40.0);
}

#[test]
fn meetings_reduce_availability_but_all_day_events_do_not() {
    let week = WorkWeekConfig::default()
        .with_meeting(Weekday::Mon, Meeting::new(1.5).with_subject("Standup and planning"))
        .with_meeting(Weekday::Mon, Meeting::new(2.0))
        .with_meeting(Weekday::Thu, Meeting::all_day().with_subject("Company offsite"));
    assert_eq!(week.available_hours_on(Weekday::Mon), 4.5);
    assert_eq!(week.available_hours_on(Weekday::Thu), 8.0);
    assert_eq!(week.total_available_hours(), 36.5);
}

#[test]
fn availability_never_goes_negative() {
    let week =
        WorkWeekConfig::new([Weekday::Tue], 6.0).with_meeting(Weekday::Tue, Meeting::new(9.0));
    assert_eq!(week.available_hours_on(Weekday::Tue), 0.0);
}

#[test]
fn meetings_on_non_work_days_are_ignored_in_capacity() {
    let week = WorkWeekConfig::new([Weekday::Mon, Weekday::Tue], 8.0)
        .with_meeting(Weekday::Sat, Meeting::new(3.0));
    let capacities = week.day_capacities();
    assert_eq!(capacities.len(), 2);
    assert!(capacities.iter().all(|c| c.available_hours == 8.0));
    assert_eq!(week.meeting_summary().total_meetings, 0);
}

#[test]
fn meeting_summary_rounds_averages() {
    let week = WorkWeekConfig::new([Weekday::Mon, Weekday::Tue, Weekday::Wed], 8.0)
        .with_meeting(Weekday::Mon, Meeting::new(1.0))
        .with_meeting(Weekday::Mon, Meeting::new(0.5))
        .with_meeting(Weekday::Wed, Meeting::new(1.25))
        .with_meeting(Weekday::Wed, Meeting::all_day());
    let summary = week.meeting_summary();
    assert_eq!(summary.total_meetings, 4);
    assert_eq!(summary.total_meeting_hours, 2.75);
    assert_eq!(summary.average_meetings_per_day, 1.3);
    assert_eq!(summary.average_meeting_hours_per_day, 0.92);
}

#[test]
fn day_capacities_follow_configured_order() {
    let week = WorkWeekConfig::new([Weekday::Thu, Weekday::Mon], 4.0);
    let order: Vec<Weekday> = week.day_capacities().iter().map(|c| c.day).collect();
    assert_eq!(order, vec![Weekday::Thu, Weekday::Mon]);
}

#[test]
fn parses_day_lists() {
    assert_eq!(
        parse_work_days("Monday, tue,WED").unwrap(),
        vec![Weekday::Mon, Weekday::Tue, Weekday::Wed]
    );
    assert!(parse_work_days("Mon,Funday").is_err());
    assert_eq!(day_name(Weekday::Sun), "Sunday");
}

#[test]
fn work_week_survives_json() {
    let week = WorkWeekConfig::default().with_meeting(Weekday::Fri, Meeting::new(2.0));
    let json = serde_json::to_string(&week).unwrap();
    let back: WorkWeekConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, week);
    assert_eq!(back.available_hours_on(Weekday::Fri), 6.0);
}
