//! Filter/query engine over a cached sheet
//!
//! A [`Filter`] is an ordered list of `(field, Criterion)` entries that are
//! all applied (logical AND). Three field names are special:
//!
//! - `Date` cells are parsed as `MM/DD/YYYY`
//! - `Time` cells are parsed as `HH:MM`
//! - `DateTime` is virtual, combining `Date` and `Time` of the same row
//!
//! Ranges are inclusive on both ends except for `Time`, whose upper bound is
//! exclusive.
//!
//! ## Example
//!
//! ```rust
//! use logbook::query::Filter;
//!
//! let filter = Filter::new()
//!     .eq("Date", "10/02/2024")
//!     .between("value", 10, 20)
//!     .one_of("shot_type", ["preshot", "postshot"]);
//! assert_eq!(filter.len(), 3);
//! ```

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use logbook_core::{CellValue, Record, RecordSet, RunNumber};

use crate::error::{LogbookError, Result};
use crate::lookup;

/// Name of the date column
pub const DATE_FIELD: &str = "Date";
/// Name of the time column
pub const TIME_FIELD: &str = "Time";
/// Name of the virtual column combining date and time
pub const DATETIME_FIELD: &str = "DateTime";

/// Format of `Date` cells
pub const DATE_FORMAT: &str = "%m/%d/%Y";
/// Format of `Time` cells
pub const TIME_FORMAT: &str = "%H:%M";

const TIME_FORMATS: &[&str] = &[TIME_FORMAT, "%H:%M:%S"];
const DATE_FORMATS: &[&str] = &[DATE_FORMAT, "%Y-%m-%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// A scalar a criterion compares against
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Number(n as f64)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n as f64)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(d: NaiveDate) -> Self {
        FilterValue::Date(d)
    }
}

impl From<NaiveTime> for FilterValue {
    fn from(t: NaiveTime) -> Self {
        FilterValue::Time(t)
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(dt: NaiveDateTime) -> Self {
        FilterValue::DateTime(dt)
    }
}

/// How one field is matched
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Exact match
    Equals(FilterValue),
    /// Match any of the values
    OneOf(Vec<FilterValue>),
    /// Range match `(low, high)`
    Between(FilterValue, FilterValue),
}

impl Criterion {
    /// Exact match
    pub fn equals<V: Into<FilterValue>>(value: V) -> Self {
        Criterion::Equals(value.into())
    }

    /// Membership in a list
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        Criterion::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Range match
    pub fn between<L: Into<FilterValue>, H: Into<FilterValue>>(low: L, high: H) -> Self {
        Criterion::Between(low.into(), high.into())
    }
}

/// An ordered set of field criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<(String, Criterion)>,
}

impl Filter {
    /// Create an empty filter (matches every row)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion for a field
    pub fn with<S: Into<String>>(mut self, field: S, criterion: Criterion) -> Self {
        self.entries.push((field.into(), criterion));
        self
    }

    /// Add an exact-match criterion
    pub fn eq<S: Into<String>, V: Into<FilterValue>>(self, field: S, value: V) -> Self {
        self.with(field, Criterion::equals(value))
    }

    /// Add a list-membership criterion
    pub fn one_of<S, I, V>(self, field: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.with(field, Criterion::one_of(values))
    }

    /// Add a range criterion
    pub fn between<S, L, H>(self, field: S, low: L, high: H) -> Self
    where
        S: Into<String>,
        L: Into<FilterValue>,
        H: Into<FilterValue>,
    {
        self.with(field, Criterion::between(low, high))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the filter has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.entries.iter().map(|(f, c)| (f.as_str(), c))
    }
}

/// One matching run with every field resolved
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QueryRow {
    /// Run number
    pub run: RunNumber,
    /// `(field, value)` pairs in column order
    pub values: Vec<(String, CellValue)>,
}

impl QueryRow {
    /// Value of a field
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

/// Matching runs in result order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct QueryResult {
    rows: Vec<QueryRow>,
}

impl QueryResult {
    /// Number of runs
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if nothing matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Run numbers in result order
    pub fn runs(&self) -> Vec<RunNumber> {
        self.rows.iter().map(|r| r.run).collect()
    }

    /// Row of a run
    pub fn get(&self, run: RunNumber) -> Option<&QueryRow> {
        self.rows.iter().find(|r| r.run == run)
    }

    /// Iterate over rows in result order
    pub fn iter(&self) -> std::slice::Iter<'_, QueryRow> {
        self.rows.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = QueryRow;
    type IntoIter = std::vec::IntoIter<QueryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a QueryRow;
    type IntoIter = std::slice::Iter<'a, QueryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Run a query against a clean record set
///
/// Every field of every surviving run is resolved with the lookup policy,
/// so empty cells inherit from earlier runs exactly as direct lookups do.
/// Unresolvable values come back as `"n/a"`.
pub fn query(
    records: &RecordSet,
    filter: &Filter,
    sort_by: Option<&str>,
    verbose: bool,
) -> Result<QueryResult> {
    let mut rows = Vec::new();

    for (run, _) in select(records, filter, sort_by)? {
        let Some(run) = run else {
            continue;
        };

        let values = records
            .keys()
            .iter()
            .map(|field| {
                let value = lookup::soften(lookup::resolve(records, field, run), verbose)?;
                Ok((field.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        rows.push(QueryRow { run, values });
    }

    Ok(QueryResult { rows })
}

/// Rows matching `filter`, optionally sorted ascending by `sort_by`
pub fn select<'a>(
    records: &'a RecordSet,
    filter: &Filter,
    sort_by: Option<&str>,
) -> Result<Vec<(Option<RunNumber>, Record<'a>)>> {
    let mut compiled = filter
        .iter()
        .map(|(field, criterion)| Compiled::new(records, field, criterion))
        .collect::<Result<Vec<_>>>()?;

    // DateTime derives from Date and Time, so it narrows first
    compiled.sort_by_key(|c| c.kind != FieldKind::DateTime);

    let mut rows: Vec<_> = records.iter().collect();
    for criterion in &compiled {
        rows.retain(|(_, record)| criterion.matches(record));
    }

    if let Some(field) = sort_by {
        let kind = FieldKind::of(field);
        kind.check(records, field)?;

        let mut keyed: Vec<_> = rows
            .into_iter()
            .map(|row| (kind.key(&row.1, field), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| sort_order(a.as_ref(), b.as_ref()));
        rows = keyed.into_iter().map(|(_, row)| row).collect();
    }

    Ok(rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Date,
    Time,
    DateTime,
    Plain,
}

impl FieldKind {
    fn of(field: &str) -> Self {
        match field {
            DATE_FIELD => FieldKind::Date,
            TIME_FIELD => FieldKind::Time,
            DATETIME_FIELD => FieldKind::DateTime,
            _ => FieldKind::Plain,
        }
    }

    /// Columns this kind reads from
    fn columns(&self) -> &'static [&'static str] {
        match self {
            FieldKind::Date => &[DATE_FIELD],
            FieldKind::Time => &[TIME_FIELD],
            FieldKind::DateTime => &[DATE_FIELD, TIME_FIELD],
            FieldKind::Plain => &[],
        }
    }

    fn check(&self, records: &RecordSet, field: &str) -> Result<()> {
        let missing = match self {
            FieldKind::Plain => (!records.has_field(field)).then_some(field),
            _ => self
                .columns()
                .iter()
                .copied()
                .find(|c| !records.has_field(c)),
        };

        match missing {
            Some(column) => Err(LogbookError::FieldNotFound(column.to_string())),
            None => Ok(()),
        }
    }

    /// Comparable key of a row for this kind
    fn key(&self, record: &Record<'_>, field: &str) -> Option<Key> {
        match self {
            FieldKind::Date => cell_text(record, DATE_FIELD)
                .and_then(parse_date)
                .map(Key::Date),
            FieldKind::Time => cell_text(record, TIME_FIELD)
                .and_then(parse_time)
                .map(Key::Time),
            FieldKind::DateTime => {
                let date = cell_text(record, DATE_FIELD).and_then(parse_date)?;
                let time = cell_text(record, TIME_FIELD).and_then(parse_time)?;
                Some(Key::DateTime(date.and_time(time)))
            }
            FieldKind::Plain => match record.get(field).value()? {
                CellValue::Number(n) => Some(Key::Number(*n)),
                CellValue::Boolean(b) => Some(Key::Number(if *b { 1.0 } else { 0.0 })),
                CellValue::Text(s) => Some(Key::Text(s.clone())),
                CellValue::Empty => None,
            },
        }
    }

    /// Interpret a criterion value for this kind
    fn coerce(&self, field: &str, value: &FilterValue) -> Result<Key> {
        let invalid = |expected: &str| {
            LogbookError::invalid_filter(field, format!("expected {expected}, got {value:?}"))
        };

        match (self, value) {
            (FieldKind::Date, FilterValue::Date(d)) => Ok(Key::Date(*d)),
            (FieldKind::Date, FilterValue::Text(s)) => {
                parse_date(s).map(Key::Date).ok_or_else(|| invalid("a MM/DD/YYYY date"))
            }
            (FieldKind::Date, _) => Err(invalid("a date")),

            (FieldKind::Time, FilterValue::Time(t)) => Ok(Key::Time(*t)),
            (FieldKind::Time, FilterValue::Text(s)) => {
                parse_time(s).map(Key::Time).ok_or_else(|| invalid("an HH:MM time"))
            }
            (FieldKind::Time, _) => Err(invalid("a time")),

            (FieldKind::DateTime, FilterValue::DateTime(dt)) => Ok(Key::DateTime(*dt)),
            (FieldKind::DateTime, FilterValue::Date(d)) => {
                Ok(Key::DateTime(d.and_time(NaiveTime::MIN)))
            }
            (FieldKind::DateTime, FilterValue::Text(s)) => parse_datetime(s)
                .map(Key::DateTime)
                .ok_or_else(|| invalid("a date and time")),
            (FieldKind::DateTime, _) => Err(invalid("a date and time")),

            (FieldKind::Plain, FilterValue::Number(n)) => Ok(Key::Number(*n)),
            (FieldKind::Plain, FilterValue::Text(s)) => Ok(Key::Text(s.clone())),
            (FieldKind::Plain, FilterValue::Date(d)) => {
                Ok(Key::Text(d.format(DATE_FORMAT).to_string()))
            }
            (FieldKind::Plain, FilterValue::Time(t)) => {
                Ok(Key::Text(t.format(TIME_FORMAT).to_string()))
            }
            (FieldKind::Plain, FilterValue::DateTime(dt)) => Ok(Key::Text(
                dt.format(&format!("{DATE_FORMAT} {TIME_FORMAT}")).to_string(),
            )),
        }
    }
}

/// A comparable cell value
#[derive(Debug, Clone, PartialEq)]
enum Key {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Key {
    /// Compare keys of the same kind; mixed kinds are incomparable
    fn compare(&self, other: &Key) -> Option<Ordering> {
        match (self, other) {
            (Key::Number(a), Key::Number(b)) => a.partial_cmp(b),
            (Key::Text(a), Key::Text(b)) => Some(a.cmp(b)),
            (Key::Date(a), Key::Date(b)) => Some(a.cmp(b)),
            (Key::Time(a), Key::Time(b)) => Some(a.cmp(b)),
            (Key::DateTime(a), Key::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::Number(_) => 0,
            Key::Date(_) => 1,
            Key::Time(_) => 2,
            Key::DateTime(_) => 3,
            Key::Text(_) => 4,
        }
    }
}

/// Ascending order with numbers before text and missing values last
fn sort_order(a: Option<&Key>, b: Option<&Key>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a
            .compare(b)
            .unwrap_or_else(|| a.rank().cmp(&b.rank())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug)]
enum Test {
    Equals(Key),
    OneOf(Vec<Key>),
    Between(Key, Key),
}

/// A criterion bound to its field and with its values interpreted
#[derive(Debug)]
struct Compiled<'f> {
    field: &'f str,
    kind: FieldKind,
    test: Test,
}

impl<'f> Compiled<'f> {
    fn new(records: &RecordSet, field: &'f str, criterion: &Criterion) -> Result<Self> {
        let kind = FieldKind::of(field);
        kind.check(records, field)?;

        let test = match criterion {
            Criterion::Equals(v) => Test::Equals(kind.coerce(field, v)?),
            Criterion::OneOf(vs) => Test::OneOf(
                vs.iter()
                    .map(|v| kind.coerce(field, v))
                    .collect::<Result<_>>()?,
            ),
            Criterion::Between(low, high) => {
                Test::Between(kind.coerce(field, low)?, kind.coerce(field, high)?)
            }
        };

        Ok(Self { field, kind, test })
    }

    fn matches(&self, record: &Record<'_>) -> bool {
        let Some(key) = self.kind.key(record, self.field) else {
            return false;
        };

        match &self.test {
            Test::Equals(want) => key.compare(want) == Some(Ordering::Equal),
            Test::OneOf(wants) => wants
                .iter()
                .any(|want| key.compare(want) == Some(Ordering::Equal)),
            Test::Between(low, high) => {
                let above_low = matches!(
                    key.compare(low),
                    Some(Ordering::Greater | Ordering::Equal)
                );
                let below_high = match key.compare(high) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => self.kind != FieldKind::Time,
                    _ => false,
                };
                above_low && below_high
            }
        }
    }
}

fn cell_text<'a>(record: &Record<'a>, column: &str) -> Option<&'a str> {
    record.get(column).value().and_then(CellValue::as_text)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use logbook_core::Table;
    use pretty_assertions::assert_eq;

    fn records() -> RecordSet {
        let rows: &[&[&str]] = &[
            &["run_number", "Date", "Time", "value", "shot_type"],
            &["1", "10/01/2024", "23:30", "5", "preshot"],
            &["2", "10/02/2024", "00:15", "10", "mainshot"],
            &["3", "10/02/2024", "13:00", "15", "mainshot"],
            &["4", "10/02/2024", "14:30", "20", "postshot"],
            &["5", "10/03/2024", "09:00", "25", "mainshot"],
            &["6", "", "", "", ""],
        ];
        let grid = rows
            .iter()
            .map(|r| r.iter().map(|s| CellValue::parse(s)).collect())
            .collect();
        RecordSet::from_table(&Table::from_grid(grid, 1), "run_number")
    }

    fn runs(filter: &Filter, sort_by: Option<&str>) -> Vec<RunNumber> {
        select(&records(), filter, sort_by)
            .unwrap()
            .into_iter()
            .filter_map(|(run, _)| run)
            .collect()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_empty_filter_keeps_all() {
        assert_eq!(runs(&Filter::new(), None), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_date_equals_text_and_typed() {
        let by_text = Filter::new().eq("Date", "10/02/2024");
        assert_eq!(runs(&by_text, None), vec![2, 3, 4]);

        let by_date = Filter::new().eq("Date", date(10, 2));
        assert_eq!(runs(&by_date, None), vec![2, 3, 4]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filter = Filter::new().between("Date", date(10, 1), date(10, 2));
        assert_eq!(runs(&filter, None), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_date_list() {
        let filter = Filter::new().one_of("Date", ["10/01/2024", "10/03/2024"]);
        assert_eq!(runs(&filter, None), vec![1, 5]);
    }

    #[test]
    fn test_time_range_excludes_upper_bound() {
        let filter = Filter::new().between("Time", time(13, 0), time(14, 30));
        assert_eq!(runs(&filter, None), vec![3]);
    }

    #[test]
    fn test_time_equals() {
        assert_eq!(runs(&Filter::new().eq("Time", "14:30"), None), vec![4]);
    }

    #[test]
    fn test_datetime_range_spans_midnight() {
        let low = date(10, 1).and_time(time(23, 0));
        let high = date(10, 2).and_time(time(1, 0));
        let filter = Filter::new().between("DateTime", low, high);
        assert_eq!(runs(&filter, None), vec![1, 2]);
    }

    #[test]
    fn test_datetime_text_values() {
        let filter = Filter::new().one_of("DateTime", ["10/02/2024 13:00", "2024-10-03T09:00:00"]);
        assert_eq!(runs(&filter, None), vec![3, 5]);
    }

    #[test]
    fn test_numeric_range_is_inclusive() {
        let filter = Filter::new().between("value", 10, 20);
        assert_eq!(runs(&filter, None), vec![2, 3, 4]);
    }

    #[test]
    fn test_text_exact_and_list() {
        assert_eq!(runs(&Filter::new().eq("shot_type", "mainshot"), None), vec![2, 3, 5]);
        let filter = Filter::new().one_of("shot_type", ["preshot", "postshot"]);
        assert_eq!(runs(&filter, None), vec![1, 4]);
    }

    #[test]
    fn test_type_mismatch_does_not_match() {
        assert!(runs(&Filter::new().eq("value", "10"), None).is_empty());
        assert!(runs(&Filter::new().eq("shot_type", 1), None).is_empty());
    }

    #[test]
    fn test_filters_combine() {
        let filter = Filter::new()
            .eq("Date", "10/02/2024")
            .eq("shot_type", "mainshot");
        assert_eq!(runs(&filter, None), vec![2, 3]);
    }

    #[test]
    fn test_sort_descending_input() {
        let filter = Filter::new().eq("shot_type", "mainshot");
        assert_eq!(runs(&filter, Some("Time")), vec![2, 5, 3]);
        assert_eq!(runs(&Filter::new(), Some("value")), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            runs(&Filter::new(), Some("shot_type")),
            vec![2, 3, 5, 4, 1, 6]
        );
    }

    #[test]
    fn test_unknown_field() {
        let err = select(&records(), &Filter::new().eq("gain", 1), None).unwrap_err();
        assert!(matches!(err, LogbookError::FieldNotFound(f) if f == "gain"));

        let err = select(&records(), &Filter::new(), Some("gain")).unwrap_err();
        assert!(matches!(err, LogbookError::FieldNotFound(_)));
    }

    #[test]
    fn test_invalid_date_value() {
        let err = select(&records(), &Filter::new().eq("Date", "2nd of October"), None)
            .unwrap_err();
        assert!(matches!(err, LogbookError::InvalidFilter { .. }));

        let err = select(&records(), &Filter::new().eq("Time", 5), None).unwrap_err();
        assert!(matches!(err, LogbookError::InvalidFilter { .. }));
    }

    #[test]
    fn test_query_resolves_with_fallback() {
        let rows: &[&[&str]] = &[
            &["run_number", "mode", "comment"],
            &["1", "fast", "ok"],
            &["2", "", ""],
        ];
        let grid = rows
            .iter()
            .map(|r| r.iter().map(|s| CellValue::parse(s)).collect())
            .collect();
        let set = RecordSet::from_table(&Table::from_grid(grid, 1), "run_number");

        let result = query(&set, &Filter::new(), None, false).unwrap();
        assert_eq!(result.runs(), vec![1, 2]);

        let second = result.get(2).unwrap();
        assert_eq!(second.get("mode"), Some(&CellValue::text("fast")));
        assert!(second.get("comment").unwrap().is_not_available());
        assert_eq!(second.get("run_number"), Some(&CellValue::Number(2.0)));
    }
}
