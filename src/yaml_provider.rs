//! YAML persistence for pipeline configuration files.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

pub fn load_from_path<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Opening YAML file {path:?}"))?;
    serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("Parsing YAML file {path:?}"))
}

pub fn save_to_path<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating YAML file {path:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_yaml::to_writer(&mut writer, data)
        .with_context(|| format!("Serializing YAML to {path:?}"))?;
    writer.flush()?;
    Ok(())
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    Ok(serde_yaml::from_str(input)?)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}
