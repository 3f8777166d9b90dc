//! Benchmarks for manifest parsing and depot assembly.
//!
//! These benchmarks measure the CPU-bound half of a sync: turning template
//! archives into descriptors and descriptors into depot JSON.

use std::io::{Cursor, Write};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use depot_sync::depot::{assemble, parse_depot, OutputFormat};
use depot_sync::manifest::{parse, parse_manifest, TemplateDescriptor};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn manifest(name: &str, version: &str) -> String {
    format!(
        r#"{{"py/object": "pros.conductor.templates.external_template.ExternalTemplate", "py/state": {{"name": "{}", "supported_kernels": "^3.8.0", "target": "v5", "version": "{}"}}}}"#,
        name, version
    )
}

/// A template archive padded with `extra_entries` source files.
fn archive(extra_entries: usize) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..extra_entries {
        let name = format!("include/lib/header_{}.h", i);
        writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"#pragma once\nint answer();\n").unwrap();
    }
    writer
        .start_file("template.pros", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(manifest("kernel", "3.8.0").as_bytes())
        .unwrap();
    writer.finish().unwrap().into_inner()
}

/// `count` descriptors, every fourth one a pre-release.
fn descriptors(count: usize) -> Vec<TemplateDescriptor> {
    (0..count)
        .map(|i| {
            let version = if i % 4 == 0 {
                format!("{}.{}.0-rc.1", i / 10, i % 10)
            } else {
                format!("{}.{}.0", i / 10, i % 10)
            };
            TemplateDescriptor {
                name: format!("template{}", i % 7),
                supported_kernels: "^3.8.0".to_string(),
                target: "v5".to_string(),
                source_url: format!("https://example.com/template{}@{}.zip", i % 7, version),
                version,
            }
        })
        .collect()
}

fn bench_manifest_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_parsing");

    let text = manifest("kernel", "3.8.0");
    group.bench_function("manifest_text", |b| {
        b.iter(|| parse_manifest(black_box(&text), "https://example.com/kernel.zip"))
    });

    for entries in [0usize, 50, 500] {
        let bytes = archive(entries);
        group.bench_with_input(BenchmarkId::new("archive", entries), &bytes, |b, bytes| {
            b.iter(|| parse(black_box(bytes), "https://example.com/kernel.zip"))
        });
    }

    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("depot_assembly");

    for count in [10usize, 100, 1000] {
        let input = descriptors(count);
        group.bench_with_input(BenchmarkId::new("partitioned", count), &input, |b, input| {
            b.iter(|| assemble(black_box(input), false, OutputFormat::Readable))
        });
        group.bench_with_input(BenchmarkId::new("unified_compact", count), &input, |b, input| {
            b.iter(|| assemble(black_box(input), true, OutputFormat::Compact))
        });
    }

    let stable = assemble(&descriptors(1000), true, OutputFormat::Readable)
        .unwrap()
        .stable;
    group.bench_function("parse_depot_1000", |b| {
        b.iter(|| parse_depot(black_box(&stable)))
    });

    group.finish();
}

criterion_group!(benches, bench_manifest_parsing, bench_assembly);
criterion_main!(benches);
