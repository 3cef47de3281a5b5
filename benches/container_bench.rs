#![allow(clippy::unwrap_used)]
//! 服务容器性能基准测试

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use svc_locator::{Factory, ServiceContainer};

/// 测试用的简单服务
struct SimpleService {
    value: usize,
}

/// 基准测试：已解析单例的重复获取
fn bench_singleton_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("singleton_hits");

    for service_count in [1, 10, 100, 1000].iter() {
        let container = ServiceContainer::new();
        for i in 0..*service_count {
            container
                .set_factory(format!("service.{}", i), move |_| SimpleService { value: i })
                .unwrap();
        }
        let keys: Vec<String> = (0..*service_count).map(|i| format!("service.{}", i)).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(service_count),
            service_count,
            |b, _| {
                b.iter(|| {
                    for key in &keys {
                        let service = container.get_as::<SimpleService>(key).unwrap();
                        black_box(service.value);
                    }
                });
            },
        );
    }

    group.finish();
}

/// 基准测试：force-new 工厂每次重新调用
fn bench_force_new(c: &mut Criterion) {
    let container = ServiceContainer::new();
    let factory = Factory::new(|_| SimpleService { value: 42 });
    container
        .set("fresh", container.force_new(factory).unwrap())
        .unwrap();

    c.bench_function("force_new_get", |b| {
        b.iter(|| black_box(container.get("fresh").unwrap()));
    });
}

/// 基准测试：注册后首次解析
fn bench_register_and_resolve(c: &mut Criterion) {
    c.bench_function("register_and_resolve", |b| {
        b.iter(|| {
            let container = ServiceContainer::new();
            container.set_value("dsn", String::from("sqlite::memory:")).unwrap();
            container
                .set_fallible("repository", |c: &ServiceContainer| {
                    c.get_as::<String>("dsn").map(|dsn| dsn.len())
                })
                .unwrap();
            black_box(container.get("repository").unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_singleton_hits,
    bench_force_new,
    bench_register_and_resolve
);
criterion_main!(benches);
