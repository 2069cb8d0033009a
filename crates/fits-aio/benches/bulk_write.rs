//! Criterion benchmarks for bulk FITS I/O.
//!
//! Run with: cargo bench --bench bulk_write
//!
//! Tracks regression in the two paths the layout design exists for:
//! - frame-at-a-time bulk writes into a pre-planned cube
//! - whole-HDU reads of a freshly written file

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fits_aio::{Bitpix, Extent, FitsReader, FitsWriter};
use tempfile::tempdir;

/// Frames per cube in the write benchmarks.
const FRAMES: u64 = 256;

fn bench_bulk_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_write");

    for &(h, w) in &[(64usize, 64usize), (128, 128), (256, 256)] {
        let frame: Vec<f32> = (0..h * w).map(|i| (i % 256) as f32).collect();
        let bytes_per_run = FRAMES * (h * w * 4) as u64;
        let label = format!("{FRAMES}x{h}x{w}");

        group.throughput(Throughput::Bytes(bytes_per_run));

        group.bench_with_input(BenchmarkId::new("sync", &label), &frame, |b, frame| {
            let dir = tempdir().unwrap();
            let path = dir.path().join("bench.fits");
            b.iter(|| {
                let schema = [Extent::new(Bitpix::F32, [FRAMES, h as u64, w as u64])];
                let writer = FitsWriter::create(&path, &schema).unwrap();
                let hdu = writer.hdu(0).unwrap();
                for i in 0..FRAMES {
                    hdu.write_data(&[i], black_box(frame)).unwrap();
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("async", &label), &frame, |b, frame| {
            let dir = tempdir().unwrap();
            let path = dir.path().join("bench.fits");
            b.iter(|| {
                let schema = [Extent::new(Bitpix::F32, [FRAMES, h as u64, w as u64])];
                let writer = FitsWriter::create(&path, &schema).unwrap();
                let hdu = writer.hdu(0).unwrap();
                for i in 0..FRAMES {
                    hdu.async_write_data(&[i], black_box(frame), |res| {
                        res.unwrap();
                    })
                    .unwrap();
                }
                writer.run();
            })
        });
    }

    group.finish();
}

fn bench_full_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_read");

    for &(h, w) in &[(128usize, 128usize), (256, 256)] {
        let dir = tempdir().unwrap();
        let path = dir.path().join("read.fits");
        let frame: Vec<f32> = (0..h * w).map(|i| (i % 256) as f32).collect();
        {
            let schema = [Extent::new(Bitpix::F32, [FRAMES, h as u64, w as u64])];
            let writer = FitsWriter::create(&path, &schema).unwrap();
            let hdu = writer.hdu(0).unwrap();
            for i in 0..FRAMES {
                hdu.write_data(&[i], &frame).unwrap();
            }
        }

        let total = FRAMES as usize * h * w;
        let label = format!("{FRAMES}x{h}x{w}");
        group.throughput(Throughput::Bytes((total * 4) as u64));
        group.bench_with_input(BenchmarkId::new("scan_and_read", &label), &path, |b, path| {
            b.iter(|| {
                let fits = FitsReader::open(black_box(path)).unwrap();
                let view = fits.hdu(0).unwrap().view::<f32>().unwrap();
                let mut buf = vec![0.0f32; total];
                view.read_data(&[], &mut buf).unwrap();
                black_box(buf)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bulk_write, bench_full_read);
criterion_main!(benches);
