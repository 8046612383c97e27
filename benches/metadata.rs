#![allow(unused)]
extern crate ironscope;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ironscope::{
    metadata::{root::Root, tables::TableId},
    LoadOptions, MetadataTables,
};
use std::hint::black_box;

const TYPES: u32 = 2_000;
const METHODS_PER_TYPE: u32 = 8;

fn pad(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}

/// Table stream with one Module row, `TYPES` TypeDef rows and their MethodDef rows
fn table_stream() -> Vec<u8> {
    let methods = TYPES * METHODS_PER_TYPE;
    let valid: u64 = (1 << TableId::Module as u64)
        | (1 << TableId::TypeDef as u64)
        | (1 << TableId::MethodDef as u64);

    let mut out = Vec::new();
    out.extend_from_slice(&0_u32.to_le_bytes());
    out.extend_from_slice(&[2, 0, 0, 1]);
    out.extend_from_slice(&valid.to_le_bytes());
    out.extend_from_slice(&0_u64.to_le_bytes());
    for rows in [1, TYPES, methods] {
        out.extend_from_slice(&rows.to_le_bytes());
    }

    out.extend_from_slice(&[0; 10]);
    for index in 0..TYPES {
        out.extend_from_slice(&[0; 10]);
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&((index * METHODS_PER_TYPE + 1) as u16).to_le_bytes());
    }
    for _ in 0..methods {
        out.extend_from_slice(&[0; 12]);
        out.extend_from_slice(&1_u16.to_le_bytes());
    }

    pad(&mut out);
    out
}

/// Metadata directory with the table stream and minimal heaps
fn metadata_directory() -> Vec<u8> {
    let streams: [(&str, Vec<u8>); 3] = [
        ("#~", table_stream()),
        ("#Strings", vec![0; 4]),
        ("#GUID", vec![0; 16]),
    ];
    let version = b"v4.0.30319\0\0";

    let mut out = Vec::new();
    out.extend_from_slice(&0x424A_5342_u32.to_le_bytes());
    out.extend_from_slice(&[1, 0, 1, 0, 0, 0, 0, 0]);
    out.extend_from_slice(&(version.len() as u32).to_le_bytes());
    out.extend_from_slice(version);
    out.extend_from_slice(&0_u16.to_le_bytes());
    out.extend_from_slice(&(streams.len() as u16).to_le_bytes());

    let headers: usize = streams
        .iter()
        .map(|(name, _)| 8 + (name.len() + 4) / 4 * 4)
        .sum();
    let mut offset = out.len() + headers;
    for (name, data) in &streams {
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        pad(&mut out);
        offset += data.len();
    }
    for (_, data) in &streams {
        out.extend_from_slice(data);
    }
    out
}

/// Benchmark parsing the root, classifying streams and laying out every table
fn bench_load(c: &mut Criterion) {
    let data = metadata_directory();

    let mut group = c.benchmark_group("metadata_load");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("root_and_tables", |b| {
        b.iter(|| {
            let root = Root::read(black_box(&data)).unwrap();
            let tables = MetadataTables::new(&data, &root, &LoadOptions::default()).unwrap();
            black_box(tables.row_count(TableId::MethodDef))
        });
    });
    group.finish();
}

/// Benchmark owning-range queries in both directions
fn bench_navigation(c: &mut Criterion) {
    let data = metadata_directory();
    let root = Root::read(&data).unwrap();
    let tables = MetadataTables::new(&data, &root, &LoadOptions::default()).unwrap();
    let column = tables
        .table(TableId::TypeDef)
        .column_index("MethodList")
        .unwrap();

    let mut group = c.benchmark_group("metadata_navigation");
    group.bench_function("owned_range", |b| {
        b.iter(|| {
            let mut total = 0;
            for rid in 1..=TYPES {
                total += tables
                    .owned_range(TableId::TypeDef, black_box(rid), column)
                    .unwrap()
                    .len();
            }
            black_box(total)
        });
    });
    group.bench_function("owner_of", |b| {
        b.iter(|| {
            let mut found = 0;
            for method in (1..=TYPES * METHODS_PER_TYPE).step_by(7) {
                if tables
                    .owner_of(TableId::TypeDef, column, black_box(method))
                    .unwrap()
                    .is_some()
                {
                    found += 1;
                }
            }
            black_box(found)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_load, bench_navigation);
criterion_main!(benches);
