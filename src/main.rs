//! Command line entry point: import a Strong export and summarise its plans.

use std::fs::File;
use std::io::BufReader;

use log::{error, info};

use strong_progress::import::format_load_message;
use strong_progress::{Settings, StrongData, charts_for_plan, export, import_file};

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load();
    let path = match std::env::args().nth(1).or_else(|| settings.last_file.clone()) {
        Some(p) => p,
        None => return Err("usage: strong_progress <export.csv>".into()),
    };

    let rows = import_file(BufReader::new(File::open(&path)?))?;
    info!("{}", format_load_message(rows.len(), &path));

    let mut data = StrongData::with_settings(&settings);
    data.add_all_workouts(&rows)?;

    for name in data.plan_display_names() {
        if let Some(plan) = data.plan_by_display_name(&name) {
            println!("{name}: {} workouts", plan.workouts().len());
        }
    }

    if let Some(out) = settings.export_json.as_deref() {
        let mut charts = Vec::new();
        for plan in data.workout_plans() {
            charts.push((plan.display_name(), charts_for_plan(plan)?));
        }
        export::write_json(&charts, out)?;
        info!("Wrote chart data for {} plans to {}", charts.len(), out);
    }

    settings.last_file = Some(path);
    settings.save();
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e}");
        eprintln!("Could not process the export file: {e}");
        std::process::exit(1);
    }
}
