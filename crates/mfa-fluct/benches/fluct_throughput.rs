use criterion::{criterion_group, criterion_main, Criterion};
use mfa_core::SpinConfig;
use mfa_dyn::{linear_annealing, record_trajectory, sk_instance};
use mfa_fluct::{analyze_fluctuations, build_generators, FluctOpts};

fn bench_fluct(c: &mut Criterion) {
    let interaction = sk_instance(16, 7).expect("instance");
    let schedule = linear_annealing(40, 2.0, Some(2.0 / 160.0)).expect("schedule");
    let trajectory =
        record_trajectory(&SpinConfig::polarized_x(15), &interaction, &schedule).expect("record");
    c.bench_function("generators_sk16_p40", |b| {
        b.iter(|| {
            let _ = build_generators(&trajectory, &interaction, &schedule).expect("generators");
        });
    });
    let opts = FluctOpts::with_tau(0.5);
    c.bench_function("analyze_sk16_p40", |b| {
        b.iter(|| {
            let _ = analyze_fluctuations(&trajectory, &interaction, &schedule, &opts)
                .expect("report");
        });
    });
}

criterion_group!(benches, bench_fluct);
criterion_main!(benches);
