#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a shard file holding `entries` as a JSON array.
    pub fn write_shard(&self, name: &str, entries: &[Value]) -> PathBuf {
        let body = serde_json::to_string(entries).expect("serialize shard");
        self.write(name, &body)
    }
}

/// A provider-shaped movie record with every field the pipeline touches.
pub fn movie(id: &str, title: &str) -> Value {
    json!({
        "title": title,
        "year": "1978",
        "rated": "R",
        "released": "27 Oct 1978",
        "runtime": "91 min",
        "genre": "Horror, Thriller",
        "director": "John Carpenter",
        "writer": "John Carpenter, Debra Hill",
        "actors": "Donald Pleasence, Jamie Lee Curtis",
        "plot": "Fifteen years after murdering his sister, a killer returns home.",
        "language": "English",
        "country": "USA",
        "awards": "3 wins",
        "poster": "https://example.invalid/poster.jpg",
        "ratings": [
            {"source": "Internet Movie Database", "value": "7.7/10"},
            {"source": "Rotten Tomatoes", "value": "96%"},
            {"source": "Metacritic", "value": "87/100"}
        ],
        "metascore": "87",
        "imdb_rating": "7.7",
        "imdb_votes": "222,000",
        "imdb_id": id,
        "type": "movie",
        "dvd": "N/A",
        "box_office": "N/A",
        "production": "Compass International",
        "website": "N/A",
        "response": "True"
    })
}

/// `movie` with selected fields replaced.
pub fn movie_with(id: &str, title: &str, overrides: Value) -> Value {
    let mut base = movie(id, title);
    if let (Some(target), Value::Object(fields)) = (base.as_object_mut(), overrides) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
    base
}

/// Reads a CSV file into its header row and data rows.
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (headers, rows)
}

pub fn column(headers: &[String], name: &str) -> usize {
    headers
        .iter()
        .position(|header| header == name)
        .unwrap_or_else(|| panic!("Column '{name}' not found in {headers:?}"))
}
