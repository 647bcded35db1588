use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{DemographicTables, DemographicTablesBuilder};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to open demographic table {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed row in {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unable to parse probability '{value}' in {}", path.display())]
    InvalidNumber { path: PathBuf, value: String },
    #[error("demographic table {} has no entries", path.display())]
    Empty { path: PathBuf },
}

fn default_rank_file() -> String {
    "rank_to_probability.csv".to_string()
}

fn default_rates_file() -> String {
    "birth_and_marriage_rates.csv".to_string()
}

fn default_life_expectancy_file() -> String {
    "life_expectancy.csv".to_string()
}

fn default_first_names_file() -> String {
    "first_names.csv".to_string()
}

fn default_last_names_file() -> String {
    "last_names.csv".to_string()
}

/// File names of the five source tables, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFiles {
    #[serde(default = "default_rank_file")]
    pub rank_to_probability: String,
    #[serde(default = "default_rates_file")]
    pub birth_and_marriage_rates: String,
    #[serde(default = "default_life_expectancy_file")]
    pub life_expectancy: String,
    #[serde(default = "default_first_names_file")]
    pub first_names: String,
    #[serde(default = "default_last_names_file")]
    pub last_names: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            rank_to_probability: default_rank_file(),
            birth_and_marriage_rates: default_rates_file(),
            life_expectancy: default_life_expectancy_file(),
            first_names: default_first_names_file(),
            last_names: default_last_names_file(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatesRow {
    decade: String,
    birth_rate: f64,
    marriage_rate: f64,
}

#[derive(Debug, Deserialize)]
struct LifeExpectancyRow {
    #[serde(rename = "Year")]
    year: i32,
    life_expectancy: String,
}

#[derive(Debug, Deserialize)]
struct FirstNameRow {
    decade: String,
    name: String,
    frequency: f64,
}

#[derive(Debug, Deserialize)]
struct LastNameRow {
    #[serde(rename = "Decade")]
    decade: String,
    #[serde(rename = "LastName")]
    last_name: String,
    #[serde(rename = "Rank")]
    rank: f64,
}

impl DemographicTables {
    /// Reads every table from `data_dir`. Any missing or malformed required
    /// table aborts the load.
    pub fn load(data_dir: impl AsRef<Path>, files: &TableFiles) -> Result<Self, TableError> {
        let dir = data_dir.as_ref();
        info!("Reading demographic tables from {}", dir.display());

        let mut builder = DemographicTables::builder()
            .rank_probabilities(read_rank_probabilities(&dir.join(&files.rank_to_probability))?);
        builder = read_rates(builder, &dir.join(&files.birth_and_marriage_rates))?;
        builder = read_life_expectancy(builder, &dir.join(&files.life_expectancy))?;
        builder = read_first_names(builder, &dir.join(&files.first_names))?;
        builder = read_last_names(builder, &dir.join(&files.last_names))?;

        let tables = builder.build();
        debug!(
            ranks = tables.rank_count(),
            first_name_decades = tables.decades_with_first_names(),
            last_name_decades = tables.decades_with_last_names(),
            "demographic tables loaded"
        );
        Ok(tables)
    }
}

fn open(path: &Path, has_headers: bool) -> Result<csv::Reader<File>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn rows<T>(path: &Path) -> Result<Vec<T>, TableError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut reader = open(path, true)?;
    reader
        .deserialize::<T>()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// The rank table is a single header-less line; position `i` is the weight of rank `i`.
fn read_rank_probabilities(path: &Path) -> Result<Vec<f64>, TableError> {
    let mut reader = open(path, false)?;
    let record = match reader.records().next() {
        Some(record) => record.map_err(|source| TableError::Csv {
            path: path.to_path_buf(),
            source,
        })?,
        None => {
            return Err(TableError::Empty {
                path: path.to_path_buf(),
            })
        }
    };
    let probabilities = record
        .iter()
        .filter(|field| !field.is_empty())
        .map(|field| {
            field.parse::<f64>().map_err(|_| TableError::InvalidNumber {
                path: path.to_path_buf(),
                value: field.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if probabilities.is_empty() {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(probabilities)
}

fn read_rates(
    mut builder: DemographicTablesBuilder,
    path: &Path,
) -> Result<DemographicTablesBuilder, TableError> {
    for row in rows::<RatesRow>(path)? {
        builder = builder.rates(row.decade, row.birth_rate, row.marriage_rate);
    }
    Ok(builder)
}

fn read_life_expectancy(
    mut builder: DemographicTablesBuilder,
    path: &Path,
) -> Result<DemographicTablesBuilder, TableError> {
    for row in rows::<LifeExpectancyRow>(path)? {
        let years = match row.life_expectancy.parse::<f64>() {
            Ok(years) if years.is_finite() => Some(years),
            _ => {
                warn!(
                    year = row.year,
                    value = %row.life_expectancy,
                    "unreadable life expectancy; people born this decade get no death year"
                );
                None
            }
        };
        builder = builder.life_expectancy(row.year, years);
    }
    Ok(builder)
}

fn read_first_names(
    mut builder: DemographicTablesBuilder,
    path: &Path,
) -> Result<DemographicTablesBuilder, TableError> {
    for row in rows::<FirstNameRow>(path)? {
        builder = builder.first_name(row.decade, row.name, row.frequency);
    }
    Ok(builder)
}

fn read_last_names(
    mut builder: DemographicTablesBuilder,
    path: &Path,
) -> Result<DemographicTablesBuilder, TableError> {
    for row in rows::<LastNameRow>(path)? {
        builder = builder.last_name(row.decade, row.last_name, row.rank);
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_tables(dir: &Path) {
        fs::write(dir.join("rank_to_probability.csv"), "0.1,0.6,0.3\n").unwrap();
        fs::write(
            dir.join("birth_and_marriage_rates.csv"),
            "decade,birth_rate,marriage_rate\n1950s,3.0,0.8\n1960s,2.5,0.7\n",
        )
        .unwrap();
        fs::write(
            dir.join("life_expectancy.csv"),
            "Year,life_expectancy\n1950,68.2\n1960,n/a\n",
        )
        .unwrap();
        fs::write(
            dir.join("first_names.csv"),
            "decade,name,frequency\n1950s,Mary,0.05\n1950s,James,0.04\n",
        )
        .unwrap();
        fs::write(
            dir.join("last_names.csv"),
            "Decade,LastName,Rank\n1950s,Smith,1\n1950s,Johnson,2\n",
        )
        .unwrap();
    }

    #[test]
    fn loads_all_tables() {
        let dir = tempdir().expect("tempdir");
        write_tables(dir.path());

        let tables = DemographicTables::load(dir.path(), &TableFiles::default()).unwrap();
        assert_eq!(tables.rank_count(), 3);
        assert_eq!(tables.birth_rate(1955), Some(3.0));
        assert_eq!(tables.marriage_rate(1962), Some(0.7));
        assert_eq!(tables.life_expectancy(1950), Some(68.2));
        assert_eq!(tables.first_names(1950).unwrap().names.len(), 2);
        assert_eq!(tables.last_names(1950).unwrap().weights, vec![0.6, 0.3]);
    }

    #[test]
    fn malformed_life_expectancy_is_not_fatal() {
        let dir = tempdir().expect("tempdir");
        write_tables(dir.path());

        let tables = DemographicTables::load(dir.path(), &TableFiles::default()).unwrap();
        assert_eq!(tables.life_expectancy(1965), None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        write_tables(dir.path());
        fs::remove_file(dir.path().join("last_names.csv")).unwrap();

        let err = DemographicTables::load(dir.path(), &TableFiles::default()).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }), "{err}");
    }

    #[test]
    fn malformed_rate_row_is_fatal() {
        let dir = tempdir().expect("tempdir");
        write_tables(dir.path());
        fs::write(
            dir.path().join("birth_and_marriage_rates.csv"),
            "decade,birth_rate,marriage_rate\n1950s,lots,0.8\n",
        )
        .unwrap();

        let err = DemographicTables::load(dir.path(), &TableFiles::default()).unwrap_err();
        assert!(matches!(err, TableError::Csv { .. }), "{err}");
    }

    #[test]
    fn empty_or_garbled_rank_table_is_rejected() {
        let dir = tempdir().expect("tempdir");
        write_tables(dir.path());

        fs::write(dir.path().join("rank_to_probability.csv"), "").unwrap();
        let err = DemographicTables::load(dir.path(), &TableFiles::default()).unwrap_err();
        assert!(matches!(err, TableError::Empty { .. }), "{err}");

        fs::write(dir.path().join("rank_to_probability.csv"), "0.1,abc\n").unwrap();
        let err = DemographicTables::load(dir.path(), &TableFiles::default()).unwrap_err();
        assert!(matches!(err, TableError::InvalidNumber { .. }), "{err}");
    }
}
