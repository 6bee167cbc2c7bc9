//! CSV import and export of game outcomes
//!
//! Import files hold one round per line as `<label> <game_id>,<crash_value>`,
//! where the game id is the last whitespace-separated token of the label.
//! Exports are plain `game_id,crash_value` lines, which import back unchanged.

use crash_types::{GameId, GameRecord};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// File written by an export inside the data directory
pub const EXPORT_FILE_NAME: &str = "exported_data.csv";

/// Outcome of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// CSV files read
    pub files: usize,
    /// Non-empty lines seen
    pub lines: usize,
    /// Rounds written
    pub inserted: u64,
    /// Well-formed rounds already stored
    pub skipped: u64,
    /// Lines that could not be parsed
    pub malformed: usize,
}

/// Rounds parsed from one or more CSV sources
#[derive(Debug, Default)]
pub struct CsvScan {
    pub files: usize,
    pub lines: usize,
    pub malformed: usize,
    pub games: Vec<GameRecord>,
}

impl ImportSummary {
    /// Record how many of the parsed rounds were actually written.
    pub fn with_inserted(mut self, inserted: u64) -> Self {
        self.inserted = inserted;
        self.skipped = self.skipped.saturating_sub(inserted);
        self
    }
}

impl CsvScan {
    /// Split into the parsed rounds and a summary that counts them all as skipped.
    pub fn into_batch(self) -> (Vec<GameRecord>, ImportSummary) {
        let summary = ImportSummary {
            files: self.files,
            lines: self.lines,
            inserted: 0,
            skipped: self.games.len() as u64,
            malformed: self.malformed,
        };
        (self.games, summary)
    }

    /// Parse every record of `reader`, counting the ones that do not parse.
    pub fn read_from<R: io::Read>(&mut self, reader: R, source: &str) {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        for (index, record) in csv_reader.records().enumerate() {
            self.lines += 1;
            let parsed = record
                .map_err(|e| e.to_string())
                .and_then(|r| parse_record(&r));
            match parsed {
                Ok((game_id, crash_value)) => {
                    self.games.push(GameRecord::finalized(game_id, crash_value));
                }
                Err(reason) => {
                    self.malformed += 1;
                    tracing::warn!(source, line = index + 1, %reason, "skipping malformed csv line");
                }
            }
        }
    }
}

/// Parse one `<label> <game_id>,<crash_value>` record.
pub fn parse_record(record: &csv::StringRecord) -> Result<(GameId, f64), String> {
    if record.len() != 2 {
        return Err(format!("expected 2 fields, found {}", record.len()));
    }

    let id_token = record[0]
        .split_whitespace()
        .last()
        .ok_or_else(|| "missing game id".to_string())?;
    let game_id: i64 = id_token
        .parse()
        .map_err(|_| format!("invalid game id {:?}", id_token))?;
    let crash_value: f64 = record[1]
        .parse()
        .map_err(|_| format!("invalid crash value {:?}", &record[1]))?;

    if !crash_value.is_finite() {
        return Err(format!("invalid crash value {:?}", &record[1]));
    }

    Ok((GameId::new(game_id), crash_value))
}

fn is_csv_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Read every `*.csv` file directly inside `dir`, in file-name order.
pub fn scan_dir_blocking(dir: &Path) -> io::Result<CsvScan> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_csv_file(path))
        .collect();
    paths.sort();

    let mut scan = CsvScan::default();
    for path in paths {
        let source = path.display().to_string();
        match std::fs::File::open(&path) {
            Ok(file) => {
                tracing::info!(file = %source, "importing csv");
                scan.files += 1;
                scan.read_from(file, &source);
            }
            Err(e) => tracing::warn!(file = %source, error = %e, "cannot open csv file"),
        }
    }

    Ok(scan)
}

/// Async wrapper around [`scan_dir_blocking`]
pub async fn scan_dir(dir: PathBuf) -> io::Result<CsvScan> {
    tokio::task::spawn_blocking(move || scan_dir_blocking(&dir))
        .await
        .map_err(io::Error::other)?
}

/// Render games as `game_id,crash_value` lines.
pub fn export_bytes(games: &[GameRecord]) -> io::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for game in games {
        writer.write_record([game.game_id.to_string(), game.crash_value.to_string()])?;
    }
    writer.into_inner().map_err(|e| e.into_error())
}

/// Write an export into `dir`, returning the file path.
pub async fn write_export(dir: &Path, bytes: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(EXPORT_FILE_NAME);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_parse_labelled_record() {
        let (id, value) = parse_record(&record(&["Game 123456", "2.35"])).unwrap();
        assert_eq!(id, GameId::new(123456));
        assert_eq!(value, 2.35);
    }

    #[test]
    fn test_parse_bare_id_record() {
        let (id, value) = parse_record(&record(&["77", "1"])).unwrap();
        assert_eq!(id.value(), 77);
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_parse_rejects_bad_records() {
        assert!(parse_record(&record(&["Game 1"])).is_err());
        assert!(parse_record(&record(&["Game x", "2.0"])).is_err());
        assert!(parse_record(&record(&["Game 1", "fast"])).is_err());
        assert!(parse_record(&record(&["", "2.0"])).is_err());
        assert!(parse_record(&record(&["Game 1", "NaN"])).is_err());
    }

    #[test]
    fn test_read_counts_malformed_lines() {
        let input = "Game 1,1.5\n\nGame 2,oops\nGame 3 , 12.0 \nnot a line\n";
        let mut scan = CsvScan::default();
        scan.read_from(input.as_bytes(), "inline");

        assert_eq!(scan.lines, 4);
        assert_eq!(scan.malformed, 2);
        let ids: Vec<i64> = scan.games.iter().map(|g| g.game_id.value()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(scan.games[1].crash_value, 12.0);
    }

    #[test]
    fn test_scan_dir_reads_only_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), "Game 10,2.0\nGame 11,3.0\n").unwrap();
        std::fs::write(dir.path().join("b.CSV"), "Game 12,4.0").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Game 13,5.0").unwrap();

        let scan = scan_dir_blocking(dir.path()).unwrap();
        assert_eq!(scan.files, 2);
        assert_eq!(scan.lines, 3);
        assert_eq!(scan.games.len(), 3);
    }

    #[test]
    fn test_scan_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_dir_blocking(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_summary_counts_skipped() {
        let mut scan = CsvScan::default();
        scan.read_from("Game 1,1.0\nGame 2,2.0\nGame 3,3.0".as_bytes(), "inline");
        let (games, summary) = scan.into_batch();
        assert_eq!(games.len(), 3);
        let summary = summary.with_inserted(1);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_export_reimports() {
        let games = vec![
            GameRecord::finalized(GameId::new(5), 2.5),
            GameRecord::finalized(GameId::new(6), 10.0),
        ];
        let bytes = export_bytes(&games).unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "5,2.5\n6,10\n");

        let mut scan = CsvScan::default();
        scan.read_from(bytes.as_slice(), "export");
        assert_eq!(scan.malformed, 0);
        assert_eq!(scan.games[1].game_id.value(), 6);
    }

    #[tokio::test]
    async fn test_write_export_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let path = write_export(&target, b"1,2\n").await.unwrap();
        assert!(path.ends_with(EXPORT_FILE_NAME));
        assert_eq!(std::fs::read(path).unwrap(), b"1,2\n");
    }
}
