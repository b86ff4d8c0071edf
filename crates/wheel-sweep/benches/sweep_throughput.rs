use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, Criterion};
use wheel_solve::{
    coverage, derive, solve, Anchor, Classing, ConstraintSet, Family, KeySchedule, SolveContext,
    WheelSpec,
};
use wheel_sweep::{load_plan, run_sweep};

fn smoke_plan_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("plans/smoke.yaml")
}

fn bench_single_point(c: &mut Criterion) {
    let plan = load_plan(smoke_plan_path()).expect("load plan");
    let ct = &plan.scenario.ciphertext;
    let classing = Classing::parity_triad();
    let schedule = KeySchedule::uniform(6, WheelSpec::new(Family::Additive, 17));
    let anchors: Vec<Anchor> = plan.scenario.anchors.clone();
    let constraints = ConstraintSet::from_anchors(&anchors, ct.len()).expect("anchors");
    let ctx = SolveContext::new(ct, &classing, &schedule);

    c.bench_function("solve_derive_cover", |b| {
        b.iter(|| {
            let wheels = solve(&ctx, &constraints).expect("valid").expect("consistent");
            let derived = derive(ct, &classing, &wheels);
            coverage(&classing, &wheels, &derived, &[])
        });
    });
}

fn bench_sweep(c: &mut Criterion) {
    let mut plan = load_plan(smoke_plan_path()).expect("load plan");
    let mut group = c.benchmark_group("sweep_throughput");
    for threads in [1usize, 4] {
        plan.scheduler.parallelism = threads;
        group.bench_function(format!("smoke_{threads}_threads"), |b| {
            b.iter(|| run_sweep(&plan).expect("sweep runs"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_point, bench_sweep);
criterion_main!(benches);
