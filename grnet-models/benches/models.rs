use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grnet_models::{BinaryPc, CiTest, Pc, PcConfig, PcSkeleton, PcVariant, StructureLearner};
use grnet_omics::SampleTable;

fn random_table(n_samples: usize, n_genes: usize, seed: u64) -> SampleTable {
    let mut state = seed;
    let rows = (0..n_samples)
        .map(|_| {
            let mut prev = 0.0;
            (0..n_genes)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                    let noise = (state >> 11) as f64 / (1u64 << 53) as f64;
                    // Each gene follows its predecessor, giving a chain.
                    prev = 0.6 * prev + noise;
                    prev
                })
                .collect()
        })
        .collect();
    let genes = (0..n_genes).map(|g| format!("g{g}")).collect();
    SampleTable::with_genes(rows, genes).unwrap()
}

fn bench_pc_skeleton(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc_skeleton");
    let table = random_table(500, 12, 42);

    for variant in [PcVariant::Original, PcVariant::Stable, PcVariant::Parallel] {
        let config = PcConfig {
            variant,
            ..PcConfig::default()
        };
        group.bench_function(format!("500x12_{variant:?}"), |b| {
            b.iter(|| PcSkeleton.learn(black_box(&table), &config))
        });
    }

    group.finish();
}

fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimator");
    let table = random_table(1_000, 8, 7);

    group.bench_function("pc_1000x8_subsample_200", |b| {
        b.iter(|| {
            let mut est = Pc::new(black_box(table.clone()), Some(200), 0).unwrap();
            est.estimate().unwrap();
            est.get_matrix()
        })
    });

    let sparse = table.map_values(|v| if v > 1.0 { v } else { 0.0 });
    let config = PcConfig {
        ci_test: CiTest::GSquare,
        ..PcConfig::binary()
    };
    group.bench_function("binary_pc_1000x8", |b| {
        b.iter(|| {
            let mut est = BinaryPc::new(black_box(sparse.clone()), None, 0)
                .unwrap()
                .with_config(config.clone())
                .unwrap();
            est.estimate().unwrap();
            est.coverage_matrix()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pc_skeleton, bench_estimators);
criterion_main!(benches);
