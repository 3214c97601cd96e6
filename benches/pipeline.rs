use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use movie_curate::pipeline::Pipeline;
use movie_curate::record::RawRecord;
use serde_json::json;

fn generate_records(count: usize) -> Vec<Option<RawRecord>> {
    (0..count)
        .map(|i| {
            if i % 50 == 0 {
                return None;
            }
            let country = if i % 4 == 0 { "France" } else { "USA, UK" };
            let kind = if i % 9 == 0 { "series" } else { "movie" };
            RawRecord::from_json(json!({
                "title": format!("Title {}", i % 300),
                "year": format!("{}", 1950 + i % 70),
                "rated": if i % 5 == 0 { "Not Rated" } else { "PG-13" },
                "released": "27 Oct 1978",
                "runtime": format!("{} min", 80 + i % 60),
                "director": "Director",
                "writer": if i % 13 == 0 { serde_json::Value::Null } else { json!("Writer") },
                "actors": "Actor One, Actor Two",
                "plot": "Plot",
                "country": country,
                "type": kind,
                "ratings": [
                    {"source": "Internet Movie Database", "value": "7.1/10"},
                    {"source": "Rotten Tomatoes", "value": "81%"}
                ],
                "metascore": "N/A",
                "imdb_rating": "7.1",
                "imdb_id": format!("tt{:07}", i % 4000),
            }))
        })
        .collect()
}

fn bench_clean(c: &mut Criterion) {
    let records = generate_records(5_000);
    let pipeline = Pipeline::default();
    c.bench_function("clean_5k_records", |b| {
        b.iter_batched(
            || records.clone(),
            |records| pipeline.clean(records).expect("clean"),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_clean);
criterion_main!(benches);
