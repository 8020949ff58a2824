use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::de::DeserializeOwned;

use crate::error::{Error, MissingTable, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Finds GTFS text files by trying a list of directories in order. Each table is resolved
/// independently, so one table may come from a fallback directory while another comes from the
/// primary one.
#[derive(Clone, Debug)]
pub struct TableLocator {
    dirs: Vec<PathBuf>,
}

impl TableLocator {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn candidates(&self, table: &str) -> Vec<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(format!("{table}.txt")))
            .collect()
    }

    pub fn locate(&self, table: &str) -> Result<PathBuf> {
        let candidates = self.candidates(table);
        if let Some(path) = candidates.iter().find(|p| p.is_file()) {
            info!("Using {} for {table}", path.display());
            return Ok(path.clone());
        }
        Err(Error::TablesNotFound(vec![MissingTable {
            table: table.to_string(),
            candidates,
        }]))
    }

    /// Resolves every table, reporting all of the missing ones together.
    pub fn locate_all(&self, tables: &[&str]) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for table in tables {
            match self.locate(table) {
                Ok(path) => found.push(path),
                Err(Error::TablesNotFound(mut list)) => missing.append(&mut list),
                Err(err) => return Err(err),
            }
        }
        if !missing.is_empty() {
            return Err(Error::TablesNotFound(missing));
        }
        Ok(found)
    }

    pub fn load(&self, table: &str) -> Result<Table> {
        let path = self.locate(table)?;
        Table::read_file(table, &path)
    }
}

/// A delimited text file with a header row. All values are kept as trimmed strings.
pub struct Table {
    name: String,
    headers: StringRecord,
    columns: BTreeMap<String, usize>,
    records: Vec<StringRecord>,
}

impl Table {
    pub fn read_file(name: &str, path: &Path) -> Result<Self> {
        let bytes = fs_err::read(path)?;
        Self::parse(name, &bytes)
    }

    pub fn parse(name: &str, bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let wrap = |source: csv::Error| Error::Csv {
            table: name.to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let headers = reader.headers().map_err(wrap)?.clone();
        let mut columns = BTreeMap::new();
        for (idx, field) in headers.iter().enumerate() {
            // If a column is repeated, the first one wins
            columns.entry(field.to_string()).or_insert(idx);
        }

        let mut records = Vec::new();
        for rec in reader.records() {
            let mut rec = rec.map_err(wrap)?;
            // Short rows mean the trailing values are empty
            while rec.len() < headers.len() {
                rec.push_field("");
            }
            records.push(rec);
        }
        debug!("{name} has {} rows", records.len());

        Ok(Self {
            name: name.to_string(),
            headers,
            columns,
            records,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row {
            columns: &self.columns,
            record,
        })
    }

    /// Deserializes every row into a typed record, matching struct fields to column names.
    /// Columns the record doesn't name are ignored.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut results = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let rec = record
                .deserialize(Some(&self.headers))
                .map_err(|source| Error::Csv {
                    table: self.name.clone(),
                    source,
                })?;
            results.push(rec);
        }
        Ok(results)
    }
}

/// One row of a table, addressed by column name.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    columns: &'a BTreeMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Returns the empty string if the column doesn't exist or this row is too short.
    pub fn get(&self, field: &str) -> &'a str {
        self.columns
            .get(field)
            .and_then(|idx| self.record.get(*idx))
            .unwrap_or("")
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.columns
            .keys()
            .map(|field| (field.clone(), self.get(field).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn strips_bom_and_whitespace() {
        let table = Table::parse(
            "stops",
            b"\xEF\xBB\xBF stop_id , stop_name\n s1 ,  Kyoto Station \n",
        )
        .unwrap();
        assert_eq!(table.headers().collect::<Vec<_>>(), vec!["stop_id", "stop_name"]);
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("stop_id"), "s1");
        assert_eq!(row.get("stop_name"), "Kyoto Station");
    }

    #[test]
    fn missing_values_are_empty_strings() {
        let table = Table::parse("routes", b"route_id,route_short_name,route_type\nr1,,3\nr2\n")
            .unwrap();
        let rows: Vec<_> = table.rows().map(|r| r.to_map()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["route_short_name"], "");
        assert_eq!(rows[1]["route_type"], "");
        assert_eq!(table.rows().next().unwrap().get("no_such_column"), "");
    }

    #[test]
    fn deserialize_short_rows() {
        #[derive(Deserialize)]
        struct Record {
            #[serde(default)]
            a: String,
            #[serde(default)]
            b: String,
        }

        let table = Table::parse("t", b"a,b,extra\n1,2,3\n4\n").unwrap();
        let records: Vec<Record> = table.deserialize().unwrap();
        assert_eq!(records[0].a, "1");
        assert_eq!(records[0].b, "2");
        assert_eq!(records[1].a, "4");
        assert_eq!(records[1].b, "");
    }

    #[test]
    fn first_existing_candidate_wins() {
        let primary = TempDir::new().unwrap();
        let fallback = TempDir::new().unwrap();
        fs_err::write(fallback.path().join("stops.txt"), "stop_id\nfallback\n").unwrap();
        fs_err::write(fallback.path().join("routes.txt"), "route_id\nfallback\n").unwrap();
        fs_err::write(primary.path().join("routes.txt"), "route_id\nprimary\n").unwrap();

        let locator = TableLocator::new(vec![
            primary.path().to_path_buf(),
            fallback.path().to_path_buf(),
        ]);
        let stops = locator.load("stops").unwrap();
        assert_eq!(stops.rows().next().unwrap().get("stop_id"), "fallback");
        let routes = locator.load("routes").unwrap();
        assert_eq!(routes.rows().next().unwrap().get("route_id"), "primary");
    }

    #[test]
    fn missing_tables_are_reported_together() {
        let dir = TempDir::new().unwrap();
        fs_err::write(dir.path().join("stops.txt"), "stop_id\n").unwrap();
        let locator = TableLocator::new(vec![dir.path().to_path_buf()]);

        let err = locator.locate_all(&["stops", "routes", "trips"]).unwrap_err();
        assert_eq!(err.missing_tables(), vec!["routes", "trips"]);
        match err {
            Error::TablesNotFound(missing) => {
                assert_eq!(missing[0].candidates, vec![dir.path().join("routes.txt")]);
            }
            other => panic!("unexpected {other}"),
        }
    }
}
