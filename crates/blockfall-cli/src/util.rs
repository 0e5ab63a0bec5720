use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is given.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_json(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_json<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_write_json_ends_with_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &[1, 2]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("]\n"));
        assert_eq!(serde_json::from_str::<Vec<i32>>(&text).unwrap(), [1, 2]);
    }

    #[test]
    fn test_saved_file_reads_back() {
        let path =
            std::env::temp_dir().join(format!("blockfall-util-{}.json", std::process::id()));
        let value = BTreeMap::from([("score".to_owned(), 40), ("lines".to_owned(), 4)]);

        save_json(&value, Some(&path)).unwrap();
        let read: BTreeMap<String, i32> = read_json_file("report", &path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read, value);
    }

    #[test]
    fn test_missing_file_names_kind_and_path() {
        let path = std::env::temp_dir().join("blockfall-util-missing/none.json");
        let err = read_json_file::<i32, _>("config", &path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to open config file"));
    }
}
