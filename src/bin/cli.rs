use chrono::NaiveTime;
use polars::prelude::{AnyValue, DataFrame};
use staffing_tool::{
    DayPlan, IntervalRow, StaffingPolicy, load_plan_from_csv, load_plan_from_json,
    save_plan_to_csv, save_plan_to_json, solve,
};
use std::io::{self, Write};

fn format_cell(av: &AnyValue, column: &str) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Float64(v) => match column {
            "intensity" | "service_level" | "occupancy" => format!("{v:.4}"),
            _ => v.to_string(),
        },
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    // Compute column widths
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                let s = format_cell(av, col.name());
                if s.len() > widths[ci] {
                    widths[ci] = s.len();
                }
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    // Build output
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    // Header
    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    // Rows
    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let mut s = String::new();
            if let Ok(ref av) = col.get(row_idx) {
                s = format_cell(av, col.name());
            }
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the current plan\n  add <calls> [HH:MM]                Append a forecast interval\n  set <idx> <calls>                  Update the call volume of an interval\n  delete <idx>                       Remove an interval\n  policy show                        Show the staffing policy\n  policy set <param> <value>         Update one policy parameter:\n                                       interval_minutes, handling_time_seconds,\n                                       service_level_target, service_level_time_seconds,\n                                       max_occupancy_target, shrinkage\n  solve <calls>                      Evaluate one call volume with the current policy\n  compute                            Recompute required agents for every interval\n  save <json|csv> <path>             Persist plan to disk\n  load <json|csv> <path>             Load plan from disk (plain CSVs with a Calls column work)\n  quit|exit                          Exit"
    );
}

fn print_policy(plan: &DayPlan) {
    let policy = plan.policy();
    println!("interval_minutes           : {}", policy.interval_minutes);
    println!("handling_time_seconds      : {}", policy.handling_time_seconds);
    println!("service_level_target       : {}", policy.service_level_target);
    println!(
        "service_level_time_seconds : {}",
        policy.service_level_time_seconds
    );
    println!("max_occupancy_target       : {}", policy.max_occupancy_target);
    println!("shrinkage                  : {}", policy.shrinkage);
}

fn apply_policy_value(
    policy: &mut StaffingPolicy,
    parameter: &str,
    value: f64,
) -> Result<(), String> {
    match parameter {
        "interval_minutes" => policy.interval_minutes = value,
        "handling_time_seconds" => policy.handling_time_seconds = value,
        "service_level_target" => policy.service_level_target = value,
        "service_level_time_seconds" => policy.service_level_time_seconds = value,
        "max_occupancy_target" => policy.max_occupancy_target = value,
        "shrinkage" => policy.shrinkage = value,
        other => return Err(format!("unknown policy parameter '{other}'")),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let mut plan = DayPlan::new();

    println!("Staffing Tool (CLI) - type 'help' for commands\n");
    println!("{}", render_df_as_text_table(plan.dataframe()));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "show" => {
                println!("{}", render_df_as_text_table(plan.dataframe()));
            }
            "add" => {
                let calls_s = parts.next();
                let time_s = parts.next();
                match calls_s {
                    Some(calls_s) => {
                        let calls: f64 = match calls_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid call volume");
                                continue;
                            }
                        };
                        let row = match time_s {
                            Some(time_s) => {
                                match NaiveTime::parse_from_str(time_s, "%H:%M") {
                                    Ok(time) => IntervalRow::with_time(time, calls),
                                    Err(_) => {
                                        println!("Invalid time (HH:MM)");
                                        continue;
                                    }
                                }
                            }
                            None => IntervalRow::new(calls),
                        };
                        match plan.push_interval(row) {
                            Ok(_) => {
                                println!("Interval added.");
                                println!("{}", render_df_as_text_table(plan.dataframe()));
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    None => println!("Usage: add <calls> [HH:MM]"),
                }
            }
            "set" => {
                let idx_s = parts.next();
                let calls_s = parts.next();
                match (idx_s, calls_s) {
                    (Some(idx_s), Some(calls_s)) => {
                        let idx: usize = match idx_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid index");
                                continue;
                            }
                        };
                        let calls: f64 = match calls_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid call volume");
                                continue;
                            }
                        };
                        let existing = match plan.interval(idx) {
                            Ok(Some(row)) => row,
                            Ok(None) => {
                                println!("Interval {idx} not found.");
                                continue;
                            }
                            Err(e) => {
                                println!("Error: {}", e);
                                continue;
                            }
                        };
                        let mut row = existing;
                        row.calls = calls;
                        match plan.replace_interval(idx, row) {
                            Ok(true) => {
                                println!("Interval updated.");
                                println!("{}", render_df_as_text_table(plan.dataframe()));
                            }
                            Ok(false) => println!("Interval {idx} not found."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: set <idx> <calls>"),
                }
            }
            "delete" => {
                let idx_s = parts.next();
                match idx_s {
                    Some(idx_s) => match idx_s.parse::<usize>() {
                        Ok(idx) => match plan.delete_interval(idx) {
                            Ok(true) => {
                                println!("Deleted interval {idx}.");
                                println!("{}", render_df_as_text_table(plan.dataframe()));
                            }
                            Ok(false) => println!("Interval {idx} not found."),
                            Err(e) => println!("Error deleting interval: {}", e),
                        },
                        Err(_) => println!("Invalid index"),
                    },
                    None => println!("Usage: delete <idx>"),
                }
            }
            "policy" => match parts.next() {
                Some("show") | None => print_policy(&plan),
                Some("set") => {
                    let param_s = parts.next();
                    let value_s = parts.next();
                    match (param_s, value_s) {
                        (Some(param), Some(value_s)) => {
                            let value: f64 = match value_s.parse() {
                                Ok(v) => v,
                                Err(_) => {
                                    println!("Invalid value");
                                    continue;
                                }
                            };
                            let mut policy = plan.policy().clone();
                            if let Err(message) = apply_policy_value(&mut policy, param, value) {
                                println!("{message}");
                                continue;
                            }
                            match plan.set_policy(policy) {
                                Ok(_) => {
                                    println!("Policy updated.");
                                    print_policy(&plan);
                                }
                                Err(e) => println!("Error: {}", e),
                            }
                        }
                        _ => println!("Usage: policy set <param> <value>"),
                    }
                }
                Some(other) => {
                    println!("Unknown policy command '{}'.", other);
                    println!("Usage: policy show|set <param> <value>");
                }
            },
            "solve" => {
                let calls_s = parts.next();
                match calls_s {
                    Some(calls_s) => {
                        let calls: f64 = match calls_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid call volume");
                                continue;
                            }
                        };
                        match solve(calls, plan.policy()) {
                            Ok(requirement) => {
                                println!(
                                    "calls={} intensity={:.4} base_agents={} required_agents={} service_level={:.4} occupancy={:.4}",
                                    requirement.calls,
                                    requirement.intensity,
                                    requirement.base_agents,
                                    requirement.required_agents,
                                    requirement.service_level,
                                    requirement.occupancy,
                                );
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    None => println!("Usage: solve <calls>"),
                }
            }
            "compute" => match plan.refresh() {
                Ok(summary) => {
                    println!(
                        "Computed ({})\n{}",
                        summary.to_cli_summary(),
                        render_df_as_text_table(plan.dataframe())
                    );
                }
                Err(e) => println!("Compute error: {}", e),
            },
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_plan_to_json(&plan, path) {
                        Ok(_) => println!("Plan saved to {}.", path),
                        Err(e) => println!("Error saving plan: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_plan_to_csv(&plan, path) {
                        Ok(_) => println!("Plan saved to {}.", path),
                        Err(e) => println!("Error saving plan: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_plan_from_json(path) {
                        Ok(mut loaded) => {
                            if let Err(e) = loaded.refresh() {
                                println!("Loaded plan but compute failed: {}", e);
                            }
                            plan = loaded;
                            println!("Plan loaded from {}.", path);
                            println!("{}", render_df_as_text_table(plan.dataframe()));
                        }
                        Err(e) => println!("Error loading plan: {}", e),
                    },
                    (Some("csv"), Some(path)) => match load_plan_from_csv(path) {
                        Ok(mut loaded) => {
                            if let Err(e) = loaded.refresh() {
                                println!("Loaded plan but compute failed: {}", e);
                            }
                            plan = loaded;
                            println!("Plan loaded from {}.", path);
                            println!("{}", render_df_as_text_table(plan.dataframe()));
                        }
                        Err(e) => println!("Error loading plan: {}", e),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
