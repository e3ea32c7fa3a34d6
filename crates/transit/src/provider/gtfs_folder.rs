//! Record source backed by an unpacked GTFS folder.
//!
//! Reads `stops.txt` and `stop_times.txt` by header name. Optional columns
//! may be absent and rows may be short. Numeric fields wrapped in stray
//! quotes are recovered by stripping the quotes before parsing.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::StringRecord;
use geo::Point;

use crate::identifiers::*;
use crate::models::types::{Result, Stop, TransitError, Visit};
use crate::models::StopMap;
use crate::network::traits::RecordSource;

pub const STOPS_FILE: &str = "stops.txt";
pub const STOP_TIMES_FILE: &str = "stop_times.txt";

/// A GTFS feed in a folder; the folder name labels its outputs.
#[derive(Clone, Debug)]
pub struct GtfsFolderSource {
    feed_id: FeedIdentifier,
    folder: PathBuf,
}

impl GtfsFolderSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        let folder = folder.into();
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "feed".to_string());

        Self {
            feed_id: FeedIdentifier::new(name),
            folder,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Whether `path` looks like a single feed (has a stops file).
    pub fn is_feed_folder(path: &Path) -> bool {
        path.join(STOPS_FILE).is_file()
    }

    /// One source per immediate sub-directory of `parent`, sorted by name.
    pub fn discover(parent: &Path) -> Result<Vec<Self>> {
        let entries = fs::read_dir(parent).map_err(|e| TransitError::io(parent, e))?;

        let mut folders = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TransitError::io(parent, e))?;
            let path = entry.path();
            if path.is_dir() {
                folders.push(path);
            }
        }
        folders.sort();

        Ok(folders.into_iter().map(Self::new).collect())
    }

    fn open(&self, file_name: &str) -> Result<(PathBuf, csv::Reader<File>)> {
        let path = self.folder.join(file_name);
        let file = File::open(&path).map_err(|e| TransitError::io(&path, e))?;
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);
        Ok((path, reader))
    }
}

impl RecordSource for GtfsFolderSource {
    fn feed_id(&self) -> &FeedIdentifier {
        &self.feed_id
    }

    fn load_stops(&self) -> Result<StopMap> {
        let (path, mut reader) = self.open(STOPS_FILE)?;
        let columns = Columns::read(&path, &mut reader)?;

        let id_idx = columns.require("stop_id")?;
        let lat_idx = columns.require("stop_lat")?;
        let lon_idx = columns.require("stop_lon")?;
        let name_idx = columns.find("stop_name");
        let station_idx = columns.find("location_type");
        let parent_idx = columns.find("parent_station");

        let mut stops = StopMap::new();
        for record in records(&path, &mut reader) {
            let Some(record) = record? else {
                continue;
            };

            let id = field(&record, Some(id_idx));
            if id.is_empty() {
                log::debug!("{}: row without stop_id skipped", path.display());
                continue;
            }

            let lat: Option<f64> = parse_number(field(&record, Some(lat_idx)));
            let lon: Option<f64> = parse_number(field(&record, Some(lon_idx)));
            let location = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(Point::new(lon, lat)),
                _ => {
                    log::debug!("{}: stop {} has unreadable coordinates", path.display(), id);
                    None
                }
            };

            let mut stop = Stop::new(id, field(&record, name_idx), location)
                .with_station(strip_quotes(field(&record, station_idx)) == "1");

            let parent = strip_quotes(field(&record, parent_idx));
            if !parent.is_empty() {
                stop = stop.with_parent(parent);
            }

            if let Err(err) = stops.insert(stop) {
                log::debug!("{}: {}", path.display(), err);
            }
        }

        log::debug!("Loaded {} stops from {}", stops.len(), path.display());
        Ok(stops)
    }

    fn load_visits(&self) -> Result<Vec<Visit>> {
        let (path, mut reader) = self.open(STOP_TIMES_FILE)?;
        let columns = Columns::read(&path, &mut reader)?;

        let id_idx = columns.require("stop_id")?;
        let seq_idx = columns.require("stop_sequence")?;

        let mut visits = Vec::new();
        for record in records(&path, &mut reader) {
            // An unreadable row still separates its neighbours
            let Some(record) = record? else {
                visits.push(Visit::unsequenced(""));
                continue;
            };

            let stop_id = field(&record, Some(id_idx));
            match parse_number::<u32>(field(&record, Some(seq_idx))) {
                Some(sequence) => visits.push(Visit::new(stop_id, sequence)),
                None => {
                    log::debug!(
                        "{}: visit of {} has unreadable stop_sequence",
                        path.display(),
                        stop_id
                    );
                    visits.push(Visit::unsequenced(stop_id));
                }
            }
        }

        log::debug!("Loaded {} visits from {}", visits.len(), path.display());
        Ok(visits)
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

struct Columns<'a> {
    path: &'a Path,
    headers: Vec<String>,
}

impl<'a> Columns<'a> {
    fn read(path: &'a Path, reader: &mut csv::Reader<File>) -> Result<Self> {
        let headers = reader
            .headers()
            .map_err(|e| TransitError::csv(path, e))?
            .iter()
            .map(|h| strip_quotes(h.trim_start_matches('\u{feff}')).to_string())
            .collect();
        Ok(Self { path, headers })
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &'static str) -> Result<usize> {
        self.find(name).ok_or_else(|| TransitError::MissingColumn {
            path: self.path.to_path_buf(),
            column: name,
        })
    }
}

/// Records of `reader`; malformed rows come through as `None`, I/O errors are fatal.
fn records<'r>(
    path: &'r Path,
    reader: &'r mut csv::Reader<File>,
) -> impl Iterator<Item = Result<Option<StringRecord>>> + 'r {
    reader.records().map(move |result| match result {
        Ok(record) => Ok(Some(record)),
        Err(err) if err.is_io_error() => Err(TransitError::csv(path, err)),
        Err(err) => {
            log::debug!("{}: skipping malformed row: {}", path.display(), err);
            Ok(None)
        }
    })
}

fn field(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or_default()
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"').trim()
}

/// Parse a numeric field, retrying with all quote characters removed.
fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    if let Ok(value) = raw.parse() {
        return Some(value);
    }
    let unquoted = raw.replace('"', "");
    let value = unquoted.trim().parse().ok();
    if value.is_some() {
        log::trace!("Recovered quoted number {:?}", raw);
    }
    value
}
