//! Criterion micro-benchmarks for bulk and element-wise relocation.

use std::convert::Infallible;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reloc::{relocate_n, shift_left, shift_right};
use reloc_bench::{BenchProfile, Buffer, Looped, Packed};
use reloc_core::{MoveConstruct, Relocate, Strategy};

fn profiles() -> [BenchProfile; 2] {
    [BenchProfile::new(1_000, 16), BenchProfile::default()]
}

/// Move the live window one shift to the right, or back to the front.
fn shuttle<T>(buf: &mut Buffer<T>, shift: usize)
where
    T: Relocate,
    T::Strategy: Strategy<T, Error = Infallible>,
{
    let n = buf.len();
    let start = buf.start();
    if start == 0 {
        let moved = unsafe { shift_right(buf.as_uninit_mut(), 0..n, n + shift) };
        let first = moved.unwrap_or_else(|e| e.unreachable());
        unsafe { buf.set_window(first) };
    } else {
        let moved = unsafe { shift_left(buf.as_uninit_mut(), start..start + n, 0) };
        moved.unwrap_or_else(|e| e.unreachable());
        unsafe { buf.set_window(0) };
    }
}

fn bench_disjoint<T>(c: &mut Criterion, label: &str, wrap: fn([u64; 4]) -> T)
where
    T: Relocate,
    T::Strategy: Strategy<T, Error = Infallible>,
{
    let mut group = c.benchmark_group(format!("disjoint_{label}"));
    for profile in profiles() {
        let n = profile.element_count;
        group.throughput(Throughput::Elements(n as u64));
        let mut src = Buffer::new(profile.payloads().into_iter().map(wrap), n);
        let mut dst: Buffer<T> = Buffer::new(std::iter::empty(), n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let moved = unsafe { relocate_n(src.cursor(0), n, dst.cursor(0)) };
                black_box(moved.unwrap_or_else(|e| e.unreachable()));
                let back = unsafe { relocate_n(dst.cursor(0), n, src.cursor(0)) };
                black_box(back.unwrap_or_else(|e| e.unreachable()));
            });
        });
    }
    group.finish();
}

fn bench_overlapping<T>(c: &mut Criterion, label: &str, wrap: fn([u64; 4]) -> T)
where
    T: Relocate,
    T::Strategy: Strategy<T, Error = Infallible>,
{
    let mut group = c.benchmark_group(format!("overlapping_{label}"));
    for profile in profiles() {
        let n = profile.element_count;
        group.throughput(Throughput::Elements(2 * n as u64));
        let mut buf = Buffer::new(profile.payloads().into_iter().map(wrap), profile.capacity());
        group.bench_with_input(BenchmarkId::from_parameter(n), &profile, |b, profile| {
            b.iter(|| {
                shuttle(&mut buf, profile.shift);
                shuttle(&mut buf, profile.shift);
                black_box(buf.start());
            });
        });
    }
    group.finish();
}

fn disjoint(c: &mut Criterion) {
    bench_disjoint(c, "bulk", Packed);
    bench_disjoint(c, "looped", Looped);
}

fn overlapping(c: &mut Criterion) {
    bench_overlapping(c, "bulk", Packed);
    bench_overlapping(c, "looped", Looped);
}

fn move_construct_only(c: &mut Criterion) {
    let mut value = Looped([1, 2, 3, 4]);
    c.bench_function("move_construct_looped", |b| {
        b.iter(|| black_box(Looped::move_construct(black_box(&mut value))));
    });
}

criterion_group!(benches, disjoint, overlapping, move_construct_only);
criterion_main!(benches);
