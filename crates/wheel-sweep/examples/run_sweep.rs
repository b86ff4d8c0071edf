use std::env;
use std::path::PathBuf;

use wheel_sweep::{load_plan, logging, run_sweep};

fn main() {
    logging::init("info", false).expect("logging");
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("plans/smoke.yaml"));
    let plan = load_plan(&path).expect("load plan");
    let report = run_sweep(&plan).expect("sweep");

    for outcome in report.ranked().into_iter().take(5) {
        let derived = outcome
            .derived
            .as_ref()
            .map(|d| d.render('?'))
            .unwrap_or_default();
        println!(
            "#{:<4} {:<14} {:>3} determined, {:>3} to close  {}",
            outcome.index,
            outcome.constraint_set,
            outcome.determined(),
            outcome.min_additional().unwrap_or_default(),
            outcome.point.label()
        );
        println!("      {derived}");
    }
    let bytes = report.to_canonical_json_bytes().expect("json");
    println!("{}", String::from_utf8_lossy(&bytes));
}
