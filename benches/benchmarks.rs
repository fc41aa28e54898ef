use criterion::{Criterion, criterion_group, criterion_main};

use bloomier::{BloomFilter, Dict, RangeHasher, compute_table_length};

fn bench_bloom(c: &mut Criterion) {
    let mut hasher = RangeHasher::keyed_random(10_000).unwrap();
    let mut filter = BloomFilter::new(10_000, 8, 4);
    filter.reset_random_salt();

    let items: Vec<Vec<u8>> = (0u32..1_000).map(|i| i.to_le_bytes().to_vec()).collect();
    for item in &items {
        filter.insert(&mut hasher, item).unwrap();
    }

    c.bench_function("bloom_insert", |b| {
        let mut i = 0u32;
        b.iter(|| {
            i = i.wrapping_add(1);
            filter.insert(&mut hasher, &i.to_le_bytes()).unwrap();
        })
    });

    c.bench_function("bloom_contains", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % items.len();
            filter.contains(&mut hasher, &items[i]).unwrap()
        })
    });
}

fn bench_dict(c: &mut Criterion) {
    let item_ct = 100;
    let keys: Vec<String> = (0..item_ct).map(|i| format!("key-{i}")).collect();
    let values: Vec<String> = (0..item_ct).map(|i| format!("value-{i}")).collect();
    let table_length = compute_table_length(item_ct);

    let mut hasher = RangeHasher::keyed_random(table_length as u32).unwrap();
    let mut dict = Dict::new(table_length, 16, 3, 8).unwrap();
    dict.create(&mut hasher, &keys, &values).unwrap();
    let compressed = dict.compress();

    c.bench_function("dict_create_100", |b| {
        b.iter(|| dict.create(&mut hasher, &keys, &values).unwrap())
    });

    c.bench_function("dict_get", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % keys.len();
            dict.get(&mut hasher, keys[i].as_bytes()).unwrap()
        })
    });

    c.bench_function("compressed_dict_get", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % keys.len();
            compressed.get(&mut hasher, keys[i].as_bytes()).unwrap()
        })
    });
}

criterion_group!(benches, bench_bloom, bench_dict);
criterion_main!(benches);
