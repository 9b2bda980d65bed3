//! Snapshot diff benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pollwatch_core::{diff, EntryMeta, Snapshot};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn synthetic(count: usize, bump_every: usize) -> Snapshot {
    let entries = (0..count).map(|i| {
        let name = format!("file_{}.rs", i);
        let secs = if bump_every > 0 && i % bump_every == 0 { 2 } else { 1 };
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        let meta = EntryMeta::new(&name, format!("/repo/src/{}", name), Some(mtime), 0o644, false);
        (format!("src/{}", name), meta)
    });
    Snapshot::from_entries("/repo", entries)
}

fn bench_diff(c: &mut Criterion) {
    let base = synthetic(10_000, 0);
    let unchanged = base.clone();
    let touched = synthetic(10_000, 100);

    c.bench_function("diff_10k_unchanged", |b| {
        b.iter(|| black_box(diff(black_box(&base), black_box(&unchanged))));
    });

    c.bench_function("diff_10k_one_percent_written", |b| {
        b.iter(|| black_box(diff(black_box(&base), black_box(&touched))));
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    for d in 0..10 {
        let dir = temp_dir.path().join(format!("dir_{}", d));
        fs::create_dir_all(&dir).unwrap();
        for f in 0..100 {
            fs::write(dir.join(format!("f_{}.txt", f)), b"x").unwrap();
        }
    }

    c.bench_function("snapshot_1k_files", |b| {
        b.iter(|| black_box(Snapshot::take(temp_dir.path()).unwrap()));
    });
}

criterion_group!(benches, bench_diff, bench_snapshot);
criterion_main!(benches);
