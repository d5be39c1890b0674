use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use formula_audit::audit::audit_base;
use formula_audit::sample::Record;
use formula_audit::sampler::MemorySampler;
use formula_audit::value::FieldValue;

fn booking(i: usize) -> Record {
    let status = match i % 3 {
        0 => "✅ Confirmed",
        1 => "⏳ Pending",
        _ => "❌ Cancelled",
    };
    let mut record = Record::new();
    record.insert("Name".to_string(), FieldValue::String(format!("Stay {i}")));
    record.insert("Nights".to_string(), FieldValue::Integer((i % 14) as i64 + 1));
    record.insert("Guest Count".to_string(), FieldValue::Integer((i % 6) as i64));
    record.insert(
        "Guest Summary".to_string(),
        FieldValue::String(format!("Guest {i} - Party")),
    );
    record.insert("Status".to_string(), FieldValue::String(status.to_string()));
    record.insert("Revenue".to_string(), FieldValue::Float(i as f64 * 12.5));
    record.insert("Paid".to_string(), FieldValue::Boolean(i % 2 == 0));
    record.insert(
        "Guests".to_string(),
        FieldValue::List(vec![format!("rec{i:014}")]),
    );
    record
}

fn sampler(tables: usize, rows: usize) -> (MemorySampler, Vec<String>) {
    let names = (0..tables).map(|t| format!("Table{t}")).collect::<Vec<_>>();
    let sampler = names.iter().fold(MemorySampler::new(), |sampler, name| {
        sampler.with_table(name.clone(), (0..rows).map(booking).collect())
    });
    (sampler, names)
}

fn bench_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("audit_base");
    for (tables, rows) in [(5, 50), (40, 50), (10, 500)] {
        group.bench_function(format!("{tables}x{rows}"), |b| {
            b.iter_batched(
                || sampler(tables, rows),
                |(sampler, names)| audit_base(&sampler, &names, 0),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_audit);
criterion_main!(benches);
