use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use backprop::linear_algebra::{Matrix, Value};
use backprop::synthetic::random_batch;
use backprop::{deep_cost_gradient, shallow_cost_gradient, Manifest, Network, NetworkConfig};

criterion_main!(benches);
criterion_group!(benches, shallow_mnist, deep_small, deep_mnist);

const BATCH_SIZE: usize = 100;

fn bench_config(
    c: &mut Criterion,
    key: &str,
    config: NetworkConfig,
    oracle: impl Fn(&[Value], &Manifest, &Matrix, &Matrix),
) {
    let mut rng = StdRng::seed_from_u64(0);
    let manifest = config.manifest().unwrap();
    let network = config.network().unwrap();
    let parameters = network.random_parameters(&mut rng, &manifest).unwrap();
    let (inputs, targets) = random_batch(&mut rng, BATCH_SIZE, config.inputs, config.classes());

    c.benchmark_group("benches")
        .measurement_time(Duration::from_secs(10))
        .bench_function(&format!("cost_gradient_{key}"), |b| {
            b.iter(|| {
                oracle(
                    black_box(&parameters),
                    black_box(&manifest),
                    black_box(&inputs),
                    black_box(&targets),
                )
            })
        });
}

pub fn shallow_mnist(c: &mut Criterion) {
    bench_config(c, "shallow_mnist", NetworkConfig::shallow(784, 10), |p, m, i, t| {
        shallow_cost_gradient(p, m, i, t).unwrap();
    });
}

pub fn deep_small(c: &mut Criterion) {
    bench_config(c, "deep_small", NetworkConfig::deep(64, [32, 32, 64], 10), |p, m, i, t| {
        deep_cost_gradient(p, m, i, t).unwrap();
    });
}

pub fn deep_mnist(c: &mut Criterion) {
    let config = NetworkConfig::deep(784, [500, 500, 2000], 10);
    assert_eq!(config.network().unwrap(), Network::deep());

    bench_config(c, "deep_mnist", config, |p, m, i, t| {
        deep_cost_gradient(p, m, i, t).unwrap();
    });
}
