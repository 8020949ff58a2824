use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::error::Result;
use crate::feed::{ALL_TABLES, SHAPES, TABLES_WITHOUT_SHAPES};
use crate::{Limits, StopDetail, StopID, TableLocator, TransitOverview, GTFS};

/// Identifies one version of the source files on disk. The ingestion process replaces files
/// wholesale, so path, size and modification time are enough to notice.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Fingerprint(Vec<(PathBuf, u64, Option<SystemTime>)>);

impl Fingerprint {
    fn of(paths: &[PathBuf]) -> Result<Self> {
        let mut files = Vec::new();
        for path in paths {
            let metadata = fs_err::metadata(path)?;
            files.push((path.clone(), metadata.len(), metadata.modified().ok()));
        }
        Ok(Self(files))
    }
}

/// Keeps the last assembled feed around until the files underneath it change.
pub struct FeedCache {
    locator: TableLocator,
    latest: Mutex<Option<(Fingerprint, Arc<GTFS>)>>,
}

impl FeedCache {
    pub fn new(locator: TableLocator) -> Self {
        Self {
            locator,
            latest: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Result<Arc<GTFS>> {
        self.load(&ALL_TABLES)
    }

    /// Loads the feed, insisting only on the `required` tables. shapes is picked up when it's
    /// present anyway, so one cached feed serves every query.
    fn load(&self, required: &[&str]) -> Result<Arc<GTFS>> {
        let mut tables = required.to_vec();
        let mut paths = self.locator.locate_all(required)?;
        if !tables.contains(&SHAPES) {
            match self.locator.locate(SHAPES) {
                Ok(path) => {
                    tables.push(SHAPES);
                    paths.push(path);
                }
                Err(err) => debug!("Loading without route geometry: {err}"),
            }
        }
        let fingerprint = Fingerprint::of(&paths)?;

        // Hold the lock while loading, so concurrent callers don't all parse the same files
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached, gtfs)) = latest.as_ref() {
            if *cached == fingerprint {
                debug!("GTFS files unchanged, reusing the assembled feed");
                return Ok(gtfs.clone());
            }
        }

        let gtfs = Arc::new(GTFS::load_from_paths(&tables, &paths)?);
        *latest = Some((fingerprint, gtfs.clone()));
        Ok(gtfs)
    }

    /// Forget the cached feed
    pub fn clear(&self) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn overview(&self, limits: &Limits) -> Result<TransitOverview> {
        Ok(self.get()?.overview(limits))
    }

    pub fn stop_detail(&self, stop_id: &StopID) -> Result<StopDetail> {
        self.load(&TABLES_WITHOUT_SHAPES)?.stop_detail(stop_id)
    }
}
