use capacity_planner::{
    AdvisoryProposal, CapacityPlan, CapacitySharing, InputBundle, Meeting, OptimizationTarget,
    PlannerConfig, PlanningPeriod, PlanningRequest, ScheduleResult, ScheduleSource,
    calendar::day_name, forecast, generate_capacity_plan, load_bundle_from_json,
    load_plans_from_csv, load_projects_from_csv, load_resources_from_csv, load_tasks_from_csv,
    parse_work_days, save_bundle_to_json, save_plans_to_csv, save_projects_to_csv,
    save_resources_to_csv, save_tasks_to_csv, schedule, utilization_report,
};
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

struct Session {
    config: PlannerConfig,
    bundle: InputBundle,
    period: PlanningPeriod,
    target: OptimizationTarget,
}

impl Session {
    fn new(config: PlannerConfig) -> Self {
        let today = Utc::now().date_naive();
        let start = today.with_day(1).unwrap_or(today);
        let end = start
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(start);
        Self {
            config,
            bundle: InputBundle::default(),
            period: PlanningPeriod::new(start, end),
            target: OptimizationTarget::default(),
        }
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show loaded inputs and settings\n  load <json_path>                   Load resources, projects, tasks and history from JSON\n  import <resources|projects|tasks|plans> <csv_path>\n                                     Replace one input list from CSV\n  export <resources|projects|tasks|plans> <csv_path>\n                                     Write one input list to CSV\n  save <json_path>                   Save inputs and history to JSON\n  config <json_path>                 Load planner configuration\n  config save <json_path>            Save planner configuration\n  period <YYYY-MM-DD> <YYYY-MM-DD>   Set the planning period\n  target <utilization|cost|efficiency>\n                                     Set the optimization target\n  mode <layered|isolated>            Set how strategies share capacity\n  plan                               Generate a capacity plan and record it\n  forecast <months> [YYYY-MM-DD]     Forecast utilization from recorded plans\n  report <YYYY-MM>                   Utilization report for one month\n  week show                          Show the work week and meeting load\n  week days <Mon,Tue,...>            Set work days\n  week hours <float>                 Set hours per day\n  meeting <day> <hours|all-day> [subject...]\n                                     Add a meeting\n  meeting clear                      Remove all meetings\n  schedule [advisory_path]           Schedule tasks over the week\n  quit|exit                          Exit"
    );
}

fn print_show(session: &Session) {
    println!("Resources          : {}", session.bundle.resources.len());
    println!("Projects           : {}", session.bundle.projects.len());
    println!("Tasks              : {}", session.bundle.tasks.len());
    println!("Recorded plans     : {}", session.bundle.history.len());
    println!("Planning period    : {}", session.period);
    println!("Target             : {:?}", session.target);
    println!("Capacity sharing   : {:?}", session.config.capacity_sharing);
}

fn print_plans(plans: &[CapacityPlan]) {
    println!(
        "{:<12} {:<12} {:>8} {:>12} {:>10} {:<24}",
        "resource", "project", "planned", "utilization", "efficiency", "strategy"
    );
    for plan in plans {
        println!(
            "{:<12} {:<12} {:>8.2} {:>12.2} {:>10.2} {:<24}",
            plan.resource_id,
            plan.project_id,
            plan.planned_capacity,
            plan.utilization_rate,
            plan.efficiency_score,
            plan.strategy.map(|s| s.as_str()).unwrap_or("-"),
        );
    }
}

fn print_schedule(result: &ScheduleResult) {
    for day in &result.schedule {
        println!(
            "{} ({:.1}h available)",
            day_name(day.day),
            day.available_hours
        );
        for segment in &day.segments {
            println!("  {:<14} {:>5.1}h", segment.task_key, segment.allocated_hours);
        }
    }
    for task in &result.unassigned_tasks {
        println!("Unassigned {}: {}", task.task_key, task.reason);
    }
    let source = match &result.summary.source {
        ScheduleSource::Fallback => "fallback".to_string(),
        ScheduleSource::Advisory => "advisory".to_string(),
        ScheduleSource::AdvisoryRepaired { days } => format!(
            "advisory (repaired {})",
            days.iter().map(|d| day_name(*d)).collect::<Vec<_>>().join(", ")
        ),
    };
    println!(
        "Utilization {:.1}% from {source}",
        result.utilization_percentage
    );
}

fn parse_date(input: Option<&str>) -> Option<NaiveDate> {
    input.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn run_plan(session: &mut Session) {
    let request = PlanningRequest::new(session.period, session.target);
    match generate_capacity_plan(
        &session.bundle.resources,
        &session.bundle.projects,
        &request,
        &session.config,
    ) {
        Ok(result) => {
            println!("Generated {} plans for {}", result.plans.len(), session.period);
            print_plans(&result.plans);
            if let Some(summary) = &result.summary {
                println!(
                    "Utilization {:.2}, satisfaction {:.2}, efficiency {:.2}, cost {:.2}",
                    summary.capacity_utilization_rate,
                    summary.requirement_satisfaction_rate,
                    summary.average_efficiency_score,
                    summary.total_cost
                );
            } else {
                println!("No projects participate in {}", session.period);
            }
            if !result.recommendations.is_empty() {
                println!("Recommendations:");
                for rec in &result.recommendations {
                    println!("  - {rec}");
                }
            }
            session.bundle.history.extend(result.plans);
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn run_schedule(session: &Session, advisory_path: Option<&str>) {
    let proposal = match advisory_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => AdvisoryProposal::from_text(&text),
            Err(e) => {
                println!("Error reading advisory file: {e}");
                return;
            }
        },
        None => AdvisoryProposal::None,
    };
    match schedule(&session.bundle.tasks, &session.config.work_week, proposal) {
        Ok(result) => print_schedule(&result),
        Err(e) => println!("Error: {e}"),
    }
}

fn run_import(session: &mut Session, kind: &str, path: &str) {
    let outcome = match kind {
        "resources" => load_resources_from_csv(path).map(|v| {
            let n = v.len();
            session.bundle.resources = v;
            n
        }),
        "projects" => load_projects_from_csv(path).map(|v| {
            let n = v.len();
            session.bundle.projects = v;
            n
        }),
        "tasks" => load_tasks_from_csv(path).map(|v| {
            let n = v.len();
            session.bundle.tasks = v;
            n
        }),
        "plans" => load_plans_from_csv(path).map(|v| {
            let n = v.len();
            session.bundle.history = v;
            n
        }),
        _ => {
            println!("Usage: import <resources|projects|tasks|plans> <csv_path>");
            return;
        }
    };
    match outcome {
        Ok(n) => println!("Imported {n} {kind} from {path}"),
        Err(e) => println!("Import failed: {e}"),
    }
}

fn run_export(session: &Session, kind: &str, path: &str) {
    let outcome = match kind {
        "resources" => save_resources_to_csv(&session.bundle.resources, path),
        "projects" => save_projects_to_csv(&session.bundle.projects, path),
        "tasks" => save_tasks_to_csv(&session.bundle.tasks, path),
        "plans" => save_plans_to_csv(&session.bundle.history, path),
        _ => {
            println!("Usage: export <resources|projects|tasks|plans> <csv_path>");
            return;
        }
    };
    match outcome {
        Ok(()) => println!("Exported {kind} to {path}"),
        Err(e) => println!("Export failed: {e}"),
    }
}

fn parse_weekday(input: &str) -> Option<Weekday> {
    input.parse::<Weekday>().ok()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match PlannerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring configuration: {e}");
            PlannerConfig::default()
        }
    };
    let mut session = Session::new(config);

    println!("Capacity Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_show(&session),
            "load" => match parts.next() {
                Some(path) => match load_bundle_from_json(path) {
                    Ok(bundle) => {
                        println!(
                            "Loaded {} resources, {} projects, {} tasks from {path}",
                            bundle.resources.len(),
                            bundle.projects.len(),
                            bundle.tasks.len()
                        );
                        session.bundle = bundle;
                    }
                    Err(e) => println!("Load failed: {e}"),
                },
                None => println!("Usage: load <json_path>"),
            },
            "save" => match parts.next() {
                Some(path) => match save_bundle_to_json(&session.bundle, path) {
                    Ok(()) => println!("Saved inputs to {path}"),
                    Err(e) => println!("Save failed: {e}"),
                },
                None => println!("Usage: save <json_path>"),
            },
            "import" => match (parts.next(), parts.next()) {
                (Some(kind), Some(path)) => run_import(&mut session, kind, path),
                _ => println!("Usage: import <resources|projects|tasks|plans> <csv_path>"),
            },
            "export" => match (parts.next(), parts.next()) {
                (Some(kind), Some(path)) => run_export(&session, kind, path),
                _ => println!("Usage: export <resources|projects|tasks|plans> <csv_path>"),
            },
            "config" => match parts.next() {
                Some("save") => match parts.next() {
                    Some(path) => match session.config.save_json_file(path) {
                        Ok(()) => println!("Configuration saved to {path}"),
                        Err(e) => println!("Config save failed: {e}"),
                    },
                    None => println!("Usage: config save <json_path>"),
                },
                Some(path) => match PlannerConfig::from_json_file(path) {
                    Ok(config) => {
                        session.config = config;
                        println!("Configuration loaded from {path}");
                    }
                    Err(e) => println!("Config failed: {e}"),
                },
                None => println!("Usage: config <json_path>"),
            },
            "period" => match (parse_date(parts.next()), parse_date(parts.next())) {
                (Some(start), Some(end)) if start <= end => {
                    session.period = PlanningPeriod::new(start, end);
                    println!("Planning period set to {}", session.period);
                }
                (Some(_), Some(_)) => println!("Period start must be on or before its end."),
                _ => println!("Usage: period <YYYY-MM-DD> <YYYY-MM-DD>"),
            },
            "target" => match parts.next().and_then(OptimizationTarget::from_str) {
                Some(target) => {
                    session.target = target;
                    println!("Target set to {:?}", target);
                }
                None => println!("Usage: target <utilization|cost|efficiency>"),
            },
            "mode" => match parts.next() {
                Some("layered") => {
                    session.config.capacity_sharing = CapacitySharing::Layered;
                    println!("Strategies share one capacity pool");
                }
                Some("isolated") => {
                    session.config.capacity_sharing = CapacitySharing::Isolated;
                    println!("Strategies run on independent capacity snapshots");
                }
                _ => println!("Usage: mode <layered|isolated>"),
            },
            "plan" => run_plan(&mut session),
            "forecast" => {
                let months = parts.next().and_then(|s| s.parse::<u32>().ok());
                let reference = parse_date(parts.next()).unwrap_or(session.period.start);
                match months {
                    Some(months) => {
                        let result = forecast(months, reference, &session.bundle.history);
                        if result.is_empty() {
                            println!("No history matches the next {months} months.");
                        }
                        for (month, entry) in &result {
                            println!(
                                "{month}: utilization {:.2} (confidence {:.1}, {} samples)",
                                entry.predicted_utilization,
                                entry.confidence_level,
                                entry.sample_size
                            );
                        }
                    }
                    None => println!("Usage: forecast <months> [YYYY-MM-DD]"),
                }
            }
            "report" => {
                let parsed = parts.next().and_then(|s| {
                    let (year, month) = s.split_once('-')?;
                    Some((year.parse::<i32>().ok()?, month.parse::<u32>().ok()?))
                });
                match parsed {
                    Some((year, month)) => {
                        match utilization_report(&session.bundle.history, month, year) {
                            Ok(report) if report.total_plans == 0 => {
                                println!("No plans recorded for {year}-{month:02}")
                            }
                            Ok(report) => {
                                println!("Report {year}-{month:02}: {} plans", report.total_plans);
                                for r in &report.resources {
                                    println!(
                                        "  resource {:<12} planned {:>8.2} utilization {:.2}",
                                        r.resource_id,
                                        r.total_planned_capacity,
                                        r.average_utilization_rate
                                    );
                                }
                                for p in &report.projects {
                                    println!(
                                        "  project  {:<12} allocated {:>8.2} resources {}",
                                        p.project_id,
                                        p.total_allocated_capacity,
                                        p.resources_assigned
                                    );
                                }
                            }
                            Err(e) => println!("Report failed: {e}"),
                        }
                    }
                    None => println!("Usage: report <YYYY-MM>"),
                }
            }
            "week" => match parts.next() {
                Some("show") => {
                    let week = &session.config.work_week;
                    for capacity in week.day_capacities() {
                        println!(
                            "{:<10} {:.1}h available",
                            day_name(capacity.day),
                            capacity.available_hours
                        );
                    }
                    let summary = week.meeting_summary();
                    println!(
                        "Meetings: {} ({:.2}h), {:.1} per day",
                        summary.total_meetings,
                        summary.total_meeting_hours,
                        summary.average_meetings_per_day
                    );
                }
                Some("days") => match parts.next().map(parse_work_days) {
                    Some(Ok(days)) if !days.is_empty() => {
                        session.config.work_week.work_days = days;
                        println!("Work days updated");
                    }
                    Some(Err(e)) => println!("{e}"),
                    _ => println!("Usage: week days <Mon,Tue,...>"),
                },
                Some("hours") => match parts.next().and_then(|s| s.parse::<f64>().ok()) {
                    Some(hours) if hours > 0.0 && hours <= 24.0 => {
                        session.config.work_week.hours_per_day = hours;
                        println!("Hours per day set to {hours}");
                    }
                    _ => println!("Usage: week hours <float within (0, 24]>"),
                },
                _ => println!("Usage: week <show|days|hours>"),
            },
            "meeting" => match parts.next() {
                Some("clear") => {
                    session.config.work_week.meetings_by_day.clear();
                    println!("Meetings cleared");
                }
                Some(day) => {
                    let Some(day) = parse_weekday(day) else {
                        println!("Unknown day '{day}'");
                        continue;
                    };
                    let meeting = match parts.next() {
                        Some("all-day") => Meeting::all_day(),
                        Some(hours) => match hours.parse::<f64>() {
                            Ok(h) if h >= 0.0 => Meeting::new(h),
                            _ => {
                                println!("Invalid meeting hours");
                                continue;
                            }
                        },
                        None => {
                            println!("Usage: meeting <day> <hours|all-day> [subject...]");
                            continue;
                        }
                    };
                    let subject = parts.collect::<Vec<_>>().join(" ");
                    let meeting = if subject.is_empty() {
                        meeting
                    } else {
                        meeting.with_subject(subject)
                    };
                    session.config.work_week.add_meeting(day, meeting);
                    println!(
                        "{} now has {:.1}h available",
                        day_name(day),
                        session.config.work_week.available_hours_on(day)
                    );
                }
                None => println!("Usage: meeting <day> <hours|all-day> [subject...]"),
            },
            "schedule" => run_schedule(&session, parts.next()),
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
