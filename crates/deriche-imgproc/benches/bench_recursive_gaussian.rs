use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use deriche_image::NdImage;
use deriche_imgproc::filter::{
    axis::filter_along_axis, gaussian_smooth_recursive, KernelOrder, RecursiveGaussianFilter,
};
use deriche_imgproc::parallel::ExecutionStrategy;

fn random_image<const N: usize>(shape: [usize; N]) -> NdImage<f32, N> {
    let mut rng = rand::rng();
    let numel = shape.iter().product::<usize>();
    let data = (0..numel).map(|_| rng.random::<f32>()).collect();
    NdImage::new(shape, data).unwrap()
}

fn bench_axis(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recursive Gaussian Axis");

    for (height, width) in [(256, 224), (512, 448), (1024, 896)].iter() {
        for sigma in [1.0, 4.0, 16.0].iter() {
            group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

            let parameter_string = format!("{}x{}x{}", height, width, sigma);

            let src = random_image([*height, *width]);
            let dst = src.filled_like(0.0f32);

            for (name, strategy) in [
                ("serial", ExecutionStrategy::Serial),
                ("parallel", ExecutionStrategy::Parallel),
            ] {
                for axis in 0..2 {
                    group.bench_with_input(
                        BenchmarkId::new(format!("axis{axis}_{name}"), &parameter_string),
                        &(&src, &dst),
                        |b, i| {
                            let (src, mut dst) = (i.0, i.1.clone());
                            b.iter(|| {
                                black_box(filter_along_axis(
                                    src,
                                    &mut dst,
                                    axis,
                                    *sigma,
                                    KernelOrder::Smoothing,
                                    strategy,
                                ))
                            })
                        },
                    );
                }
            }

            // coefficients computed once and reused across iterations
            group.bench_with_input(
                BenchmarkId::new("filter_cached", &parameter_string),
                &(&src, &dst),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    let mut filter = RecursiveGaussianFilter::smoothing(*sigma, 1);
                    b.iter(|| black_box(filter.execute_into(src, &mut dst)))
                },
            );
        }
    }

    group.finish();
}

fn bench_volume(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recursive Gaussian Volume");

    for size in [32, 64, 128].iter() {
        group.throughput(criterion::Throughput::Elements((size * size * size) as u64));

        let src = random_image([*size, *size, *size]);

        group.bench_with_input(BenchmarkId::new("smooth_3d", size), &src, |b, src| {
            b.iter(|| black_box(gaussian_smooth_recursive(src, 2.0, ExecutionStrategy::Parallel)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_axis, bench_volume);
criterion_main!(benches);
