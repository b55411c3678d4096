//! Generation config loaded from YAML.
//!
//! The YAML form keeps one optional key per generation mode (`value`, `range`,
//! `set`, `ref`, `inc`, `array`). At load time every column is decoded into a
//! closed [`ColumnMode`] so nothing downstream inspects raw maps again.
//!
//! ```yaml
//! tables:
//!   - name: person
//!     rows: 1000
//!     columns:
//!       - name: id
//!         value: ${uuid}
//!       - name: age
//!         range: int
//!         props: { min: 18, max: 80 }
//!   - name: pet
//!     rows: 5000
//!     columns:
//!       - name: owner_id
//!         ref: person.id
//! ```

use crate::duration::{self, parse_duration};
use crate::sequence::Sequence;
use crate::sort;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing or writing YAML
    #[error("Failed to process YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Column '{table}.{column}' has no generation mode")]
    MissingMode { table: String, column: String },

    #[error("Column '{table}.{column}' has more than one generation mode: {modes}")]
    MultipleModes {
        table: String,
        column: String,
        modes: String,
    },

    #[error("Invalid props for column '{table}.{column}': {reason}")]
    InvalidProps {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Unknown range kind '{kind}' for column '{table}.{column}'")]
    UnknownRangeKind {
        table: String,
        column: String,
        kind: String,
    },

    #[error("Malformed ref '{target}' for column '{table}.{column}' (expected table.column)")]
    MalformedRef {
        table: String,
        column: String,
        target: String,
    },

    #[error("Column '{table}.{column}' references unknown column '{target}'")]
    UnknownRefColumn {
        table: String,
        column: String,
        target: String,
    },

    #[error("Set for column '{table}.{column}' is empty")]
    EmptySet { table: String, column: String },

    #[error("Invalid duration for column '{table}.{column}': {reason}")]
    InvalidDuration {
        table: String,
        column: String,
        reason: String,
    },

    #[error("Table '{0}' is defined more than once")]
    DuplicateTable(String),

    /// Ref edges between tables form a cycle
    #[error("Dependency cycle between tables: {}", tables.join(", "))]
    DependencyCycle { tables: Vec<String> },
}

// ============================================================================
// Column Modes
// ============================================================================

/// Target of a `ref` column, written as `table.column` in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefTarget {
    pub table: String,
    pub column: String,
}

impl RefTarget {
    /// Parse `table.column`. The last dot separates the column, so a
    /// schema-qualified table such as `public.person.id` is accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let (table, column) = s.trim().rsplit_once('.')?;
        if table.is_empty() || column.is_empty() {
            return None;
        }
        Some(Self {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    /// Key used by the referential integrity cache.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Integer bounds for `int` ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntProps {
    pub min: i64,
    pub max: i64,
}

/// Float bounds for `float` ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatProps {
    pub min: f64,
    pub max: f64,
}

/// Length bounds for `bytes`, `string` and `bit` ranges, and the element
/// count of arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthProps {
    pub min: usize,
    pub max: usize,
}

impl Default for LengthProps {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

/// Bounds for `timestamp` ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampProps {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,

    /// strftime layout applied to generated values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Bounds for `interval` ranges, whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalProps {
    #[serde(serialize_with = "duration::serialize")]
    pub min: Duration,
    #[serde(serialize_with = "duration::serialize")]
    pub max: Duration,
}

/// Center and radius for `point` ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointProps {
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
}

/// Typed payload of a `range` column.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSpec {
    Int(IntProps),
    Float(FloatProps),
    Bytes(LengthProps),
    String(LengthProps),
    BitString(LengthProps),
    Timestamp(TimestampProps),
    Interval(IntervalProps),
    Point(PointProps),
}

impl RangeSpec {
    /// Kind name as written in YAML.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::BitString(_) => "bit",
            Self::Timestamp(_) => "timestamp",
            Self::Interval(_) => "interval",
            Self::Point(_) => "point",
        }
    }

    /// Reject bounds no value can be sampled from.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Float(p) => {
                if !p.min.is_finite() || !p.max.is_finite() {
                    return Err(format!(
                        "float bounds must be finite, got {} and {}",
                        p.min, p.max
                    ));
                }
                if !(p.max - p.min).is_finite() {
                    return Err(format!("float range {} to {} is too wide", p.min, p.max));
                }
            }
            Self::Point(p) => {
                if !(-90.0..=90.0).contains(&p.lat) {
                    return Err(format!("latitude {} is outside [-90, 90]", p.lat));
                }
                if !p.lon.is_finite() {
                    return Err(format!("longitude {} is not finite", p.lon));
                }
                if !p.distance_km.is_finite() || p.distance_km < 0.0 {
                    return Err(format!(
                        "distance_km {} must be finite and non-negative",
                        p.distance_km
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// How values for a column are produced.
#[derive(Debug, Clone)]
pub enum ColumnMode {
    /// Template with zero or more `${token}` placeholders
    Value {
        template: String,
        format: Option<String>,
    },

    /// Random value from a typed range
    Range {
        spec: RangeSpec,
        format: Option<String>,
    },

    /// Uniform pick from a fixed pool
    Set { pool: Vec<String> },

    /// Uniform pick from values written to another table's column
    Ref { target: RefTarget },

    /// Next value of a column-private sequence
    Inc { sequence: Arc<Sequence> },

    /// Array of expanded templates
    Array { item: String, count: LengthProps },
}

impl ColumnMode {
    /// Mode name as written in YAML.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Value { .. } => "value",
            Self::Range { .. } => "range",
            Self::Set { .. } => "set",
            Self::Ref { .. } => "ref",
            Self::Inc { .. } => "inc",
            Self::Array { .. } => "array",
        }
    }
}

// ============================================================================
// Config Types
// ============================================================================

/// A column and its generation mode.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub mode: ColumnMode,
}

impl Column {
    pub fn new(name: impl Into<String>, mode: ColumnMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }

    /// Ref target if this is a `ref` column.
    pub fn ref_target(&self) -> Option<&RefTarget> {
        match &self.mode {
            ColumnMode::Ref { target } => Some(target),
            _ => None,
        }
    }
}

/// A table to populate.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,

    /// Target row count
    pub rows: u64,

    pub columns: Vec<Column>,

    /// Own columns that some other table references, in first-reference order
    referenced_columns: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: u64, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            rows,
            columns,
            referenced_columns: Vec::new(),
        }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names in declared order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns other tables of the config reference.
    pub fn referenced_columns(&self) -> &[String] {
        &self.referenced_columns
    }

    fn mark_referenced(&mut self, column: &str) {
        if !self.referenced_columns.iter().any(|c| c == column) {
            self.referenced_columns.push(column.to_string());
        }
    }
}

/// Validated config with tables in dependency order.
#[derive(Debug, Clone)]
pub struct Config {
    tables: Vec<Table>,
    table_map: HashMap<String, usize>,
}

impl Config {
    /// Validate tables, record referenced columns, and order tables so every
    /// table follows the tables it references.
    pub fn new(mut tables: Vec<Table>) -> Result<Self, ConfigError> {
        let mut index = HashMap::new();
        for (idx, table) in tables.iter().enumerate() {
            if index.insert(table.name.clone(), idx).is_some() {
                return Err(ConfigError::DuplicateTable(table.name.clone()));
            }
        }

        let mut marks = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if let ColumnMode::Range { spec, .. } = &column.mode {
                    spec.validate().map_err(|reason| ConfigError::InvalidProps {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        reason,
                    })?;
                }

                let Some(target) = column.ref_target() else {
                    continue;
                };
                let Some(&parent) = index.get(&target.table) else {
                    continue;
                };
                if tables[parent].get_column(&target.column).is_none() {
                    return Err(ConfigError::UnknownRefColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        target: target.to_string(),
                    });
                }
                marks.push((parent, target.column.clone()));
            }
        }
        for (parent, column) in marks {
            tables[parent].mark_referenced(&column);
        }

        let tables = sort::sort_tables(tables)?;
        let table_map = tables
            .iter()
            .enumerate()
            .map(|(idx, table)| (table.name.clone(), idx))
            .collect();

        Ok(Self { tables, table_map })
    }

    /// Load config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        let tables = raw
            .tables
            .into_iter()
            .map(RawTable::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tables)
    }

    /// Render the config back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        let raw = RawConfig {
            tables: self
                .tables
                .iter()
                .map(RawTable::encode)
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(serde_yaml::to_string(&raw)?)
    }

    /// Tables in dependency order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.table_map
            .get(name)
            .and_then(|&idx| self.tables.get(idx))
    }

    /// Get all table names in dependency order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Ref targets whose table is not part of this config, deduplicated.
    pub fn external_refs(&self) -> Vec<RefTarget> {
        let mut refs: Vec<RefTarget> = Vec::new();
        for column in self.tables.iter().flat_map(|t| t.columns.iter()) {
            if let Some(target) = column.ref_target() {
                if !self.table_map.contains_key(&target.table) && !refs.contains(target) {
                    refs.push(target.clone());
                }
            }
        }
        refs
    }
}

// ============================================================================
// YAML Form
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct RawConfig {
    tables: Vec<RawTable>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawTable {
    name: String,
    #[serde(default)]
    rows: u64,
    #[serde(default)]
    columns: Vec<RawColumn>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawColumn {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    set: Option<Vec<String>>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inc: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    array: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    props: Option<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

/// Interval bound as written in YAML: plain seconds or a duration string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationText {
    Secs(u64),
    Text(String),
}

impl DurationText {
    fn to_duration(&self) -> Result<Duration, String> {
        match self {
            Self::Secs(secs) => Ok(Duration::from_secs(*secs)),
            Self::Text(s) => parse_duration(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawIntervalProps {
    min: DurationText,
    max: DurationText,
}

impl RawTable {
    fn decode(self) -> Result<Table, ConfigError> {
        let columns = self
            .columns
            .into_iter()
            .map(|c| c.decode(&self.name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table::new(self.name, self.rows, columns))
    }

    fn encode(table: &Table) -> Result<Self, ConfigError> {
        Ok(Self {
            name: table.name.clone(),
            rows: table.rows,
            columns: table
                .columns
                .iter()
                .map(RawColumn::encode)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl RawColumn {
    fn decode(self, table: &str) -> Result<Column, ConfigError> {
        let mut modes = Vec::new();
        if self.value.is_some() {
            modes.push("value");
        }
        if self.range.is_some() {
            modes.push("range");
        }
        if self.set.is_some() {
            modes.push("set");
        }
        if self.reference.is_some() {
            modes.push("ref");
        }
        if self.inc.is_some() {
            modes.push("inc");
        }
        if self.array.is_some() {
            modes.push("array");
        }

        match modes.len() {
            0 => {
                return Err(ConfigError::MissingMode {
                    table: table.to_string(),
                    column: self.name.clone(),
                })
            }
            1 => {}
            _ => {
                return Err(ConfigError::MultipleModes {
                    table: table.to_string(),
                    column: self.name.clone(),
                    modes: modes.join(", "),
                })
            }
        }

        let invalid_props = |reason: String| ConfigError::InvalidProps {
            table: table.to_string(),
            column: self.name.clone(),
            reason,
        };

        if self.props.is_some() && self.range.is_none() && self.array.is_none() {
            return Err(invalid_props(
                "props are only valid with range or array".to_string(),
            ));
        }

        if self.format.is_some() && self.value.is_none() && self.range.is_none() {
            return Err(invalid_props(
                "format is only valid with value or range".to_string(),
            ));
        }

        let mode = if let Some(template) = &self.value {
            ColumnMode::Value {
                template: template.clone(),
                format: self.format.clone(),
            }
        } else if let Some(kind) = &self.range {
            let props = self
                .props
                .clone()
                .ok_or_else(|| invalid_props(format!("range '{kind}' requires props")))?;
            let spec = decode_range(table, &self.name, kind, props)?;
            if let (RangeSpec::Timestamp(_), Some(layout)) = (&spec, &self.format) {
                check_layout(table, &self.name, layout)?;
            }
            ColumnMode::Range {
                spec,
                format: self.format.clone(),
            }
        } else if let Some(pool) = &self.set {
            if pool.is_empty() {
                return Err(ConfigError::EmptySet {
                    table: table.to_string(),
                    column: self.name.clone(),
                });
            }
            ColumnMode::Set { pool: pool.clone() }
        } else if let Some(target) = &self.reference {
            let target = RefTarget::parse(target).ok_or_else(|| ConfigError::MalformedRef {
                table: table.to_string(),
                column: self.name.clone(),
                target: target.clone(),
            })?;
            ColumnMode::Ref { target }
        } else if let Some(start) = self.inc {
            ColumnMode::Inc {
                sequence: Arc::new(Sequence::new(start)),
            }
        } else if let Some(item) = &self.array {
            let count = match self.props.clone() {
                Some(props) => serde_yaml::from_value::<LengthProps>(props)
                    .map_err(|e| invalid_props(e.to_string()))?,
                None => LengthProps::default(),
            };
            ColumnMode::Array {
                item: item.clone(),
                count,
            }
        } else {
            return Err(ConfigError::MissingMode {
                table: table.to_string(),
                column: self.name.clone(),
            });
        };

        Ok(Column::new(self.name, mode))
    }

    fn encode(column: &Column) -> Result<Self, ConfigError> {
        let mut raw = RawColumn {
            name: column.name.clone(),
            ..Default::default()
        };
        match &column.mode {
            ColumnMode::Value { template, format } => {
                raw.value = Some(template.clone());
                raw.format = format.clone();
            }
            ColumnMode::Range { spec, format } => {
                raw.range = Some(spec.kind().to_string());
                raw.props = Some(encode_range(spec)?);
                raw.format = format.clone();
            }
            ColumnMode::Set { pool } => raw.set = Some(pool.clone()),
            ColumnMode::Ref { target } => raw.reference = Some(target.to_string()),
            ColumnMode::Inc { sequence } => raw.inc = Some(sequence.start()),
            ColumnMode::Array { item, count } => {
                raw.array = Some(item.clone());
                raw.props = Some(serde_yaml::to_value(count)?);
            }
        }
        Ok(raw)
    }
}

fn decode_range(
    table: &str,
    column: &str,
    kind: &str,
    props: serde_yaml::Value,
) -> Result<RangeSpec, ConfigError> {
    fn typed<T: serde::de::DeserializeOwned>(
        table: &str,
        column: &str,
        props: serde_yaml::Value,
    ) -> Result<T, ConfigError> {
        serde_yaml::from_value(props).map_err(|e| ConfigError::InvalidProps {
            table: table.to_string(),
            column: column.to_string(),
            reason: e.to_string(),
        })
    }

    let spec = match kind {
        "int" => RangeSpec::Int(typed(table, column, props)?),
        "float" => RangeSpec::Float(typed(table, column, props)?),
        "bytes" => RangeSpec::Bytes(typed(table, column, props)?),
        "string" => RangeSpec::String(typed(table, column, props)?),
        "bit" => RangeSpec::BitString(typed(table, column, props)?),
        "timestamp" => {
            let props: TimestampProps = typed(table, column, props)?;
            if let Some(layout) = &props.format {
                check_layout(table, column, layout)?;
            }
            RangeSpec::Timestamp(props)
        }
        "interval" => {
            let raw: RawIntervalProps = typed(table, column, props)?;
            let invalid = |reason: String| ConfigError::InvalidDuration {
                table: table.to_string(),
                column: column.to_string(),
                reason,
            };
            RangeSpec::Interval(IntervalProps {
                min: raw.min.to_duration().map_err(invalid)?,
                max: raw.max.to_duration().map_err(invalid)?,
            })
        }
        "point" => RangeSpec::Point(typed(table, column, props)?),
        other => {
            return Err(ConfigError::UnknownRangeKind {
                table: table.to_string(),
                column: column.to_string(),
                kind: other.to_string(),
            })
        }
    };
    Ok(spec)
}

/// Reject strftime layouts chrono cannot render.
fn check_layout(table: &str, column: &str, layout: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidProps {
            table: table.to_string(),
            column: column.to_string(),
            reason: format!("invalid timestamp format '{layout}'"),
        });
    }
    Ok(())
}

fn encode_range(spec: &RangeSpec) -> Result<serde_yaml::Value, serde_yaml::Error> {
    match spec {
        RangeSpec::Int(p) => serde_yaml::to_value(p),
        RangeSpec::Float(p) => serde_yaml::to_value(p),
        RangeSpec::Bytes(p) | RangeSpec::String(p) | RangeSpec::BitString(p) => {
            serde_yaml::to_value(p)
        }
        RangeSpec::Timestamp(p) => serde_yaml::to_value(p),
        RangeSpec::Interval(p) => serde_yaml::to_value(p),
        RangeSpec::Point(p) => serde_yaml::to_value(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"
tables:
  - name: pet
    rows: 5000
    columns:
      - name: owner_id
        ref: person.id
      - name: kind
        set: [cat, dog]
  - name: person
    rows: 1000
    columns:
      - name: id
        value: ${uuid}
      - name: age
        range: int
        props: { min: 18, max: 80 }
      - name: created_at
        range: timestamp
        props: { min: 2020-01-01T00:00:00Z, max: 2024-01-01T00:00:00Z, format: "%Y-%m-%d" }
      - name: tags
        array: ${word}
        props: { min: 1, max: 4 }
      - name: seq
        inc: 1
      - name: wait
        range: interval
        props: { min: 90s, max: 2h }
"#;

    #[test]
    fn test_parse_and_order() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.table_names(), vec!["person", "pet"]);

        let person = config.get_table("person").unwrap();
        assert_eq!(person.rows, 1000);
        assert_eq!(person.referenced_columns(), &["id".to_string()]);

        let pet = config.get_table("pet").unwrap();
        assert!(pet.referenced_columns().is_empty());
        assert_eq!(
            pet.get_column("owner_id").unwrap().ref_target(),
            Some(&RefTarget {
                table: "person".to_string(),
                column: "id".to_string()
            })
        );
    }

    #[test]
    fn test_decoded_modes() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let person = config.get_table("person").unwrap();

        match &person.get_column("age").unwrap().mode {
            ColumnMode::Range {
                spec: RangeSpec::Int(p),
                format: None,
            } => assert_eq!((p.min, p.max), (18, 80)),
            other => panic!("unexpected mode {other:?}"),
        }

        match &person.get_column("created_at").unwrap().mode {
            ColumnMode::Range {
                spec: RangeSpec::Timestamp(p),
                ..
            } => {
                assert_eq!(p.min, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
                assert_eq!(p.format.as_deref(), Some("%Y-%m-%d"));
            }
            other => panic!("unexpected mode {other:?}"),
        }

        match &person.get_column("tags").unwrap().mode {
            ColumnMode::Array { item, count } => {
                assert_eq!(item, "${word}");
                assert_eq!(*count, LengthProps { min: 1, max: 4 });
            }
            other => panic!("unexpected mode {other:?}"),
        }

        match &person.get_column("wait").unwrap().mode {
            ColumnMode::Range {
                spec: RangeSpec::Interval(p),
                ..
            } => {
                assert_eq!(p.min, Duration::from_secs(90));
                assert_eq!(p.max, Duration::from_secs(7200));
            }
            other => panic!("unexpected mode {other:?}"),
        }

        match &person.get_column("seq").unwrap().mode {
            ColumnMode::Inc { sequence } => assert_eq!(sequence.next(), 1),
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_array_count_defaults() {
        let yaml = r#"
tables:
  - name: t
    rows: 1
    columns:
      - name: words
        array: ${word}
"#;
        let config = Config::from_yaml(yaml).unwrap();
        match &config.tables()[0].columns[0].mode {
            ColumnMode::Array { count, .. } => assert_eq!(*count, LengthProps { min: 1, max: 5 }),
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_missing_and_multiple_modes() {
        let missing = "tables:\n  - name: t\n    rows: 1\n    columns:\n      - name: a\n";
        assert!(matches!(
            Config::from_yaml(missing),
            Err(ConfigError::MissingMode { .. })
        ));

        let multiple = "tables:\n  - name: t\n    rows: 1\n    columns:\n      - name: a\n        value: x\n        set: [y]\n";
        match Config::from_yaml(multiple) {
            Err(ConfigError::MultipleModes { modes, .. }) => assert_eq!(modes, "value, set"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_invalid_columns() {
        let cases = [
            ("range: nope\n        props: { min: 1, max: 2 }", "unknown range"),
            ("range: int", "missing props"),
            ("range: int\n        props: { min: a, max: 2 }", "bad props"),
            ("set: []", "empty set"),
            ("ref: nodot", "malformed ref"),
            ("range: interval\n        props: { min: 5x, max: 1h }", "bad duration"),
            ("range: float\n        props: { min: -.inf, max: .inf }", "bad props"),
            ("range: float\n        props: { min: .nan, max: 1.0 }", "bad props"),
            ("range: float\n        props: { min: -1.0e308, max: 1.0e308 }", "bad props"),
            ("range: point\n        props: { lat: 91.0, lon: 0.0, distance_km: 1.0 }", "bad props"),
            ("range: point\n        props: { lat: 0.0, lon: .nan, distance_km: 1.0 }", "bad props"),
            ("range: point\n        props: { lat: 0.0, lon: 0.0, distance_km: .inf }", "bad props"),
            ("set: [a]\n        format: \"{}!\"", "bad props"),
            ("inc: 1\n        format: \"#{}\"", "bad props"),
            ("array: ${word}\n        format: \"{}\"", "bad props"),
        ];
        for (body, label) in cases {
            let yaml = format!(
                "tables:\n  - name: t\n    rows: 1\n    columns:\n      - name: a\n        {body}\n"
            );
            let result = Config::from_yaml(&yaml);
            let ok = match (label, &result) {
                ("unknown range", Err(ConfigError::UnknownRangeKind { .. })) => true,
                ("missing props", Err(ConfigError::InvalidProps { .. })) => true,
                ("bad props", Err(ConfigError::InvalidProps { .. })) => true,
                ("empty set", Err(ConfigError::EmptySet { .. })) => true,
                ("malformed ref", Err(ConfigError::MalformedRef { .. })) => true,
                ("bad duration", Err(ConfigError::InvalidDuration { .. })) => true,
                _ => false,
            };
            assert!(ok, "{label}: unexpected result {result:?}");
        }
    }

    #[test]
    fn test_unknown_ref_column() {
        let yaml = r#"
tables:
  - name: a
    rows: 1
    columns:
      - name: id
        inc: 1
  - name: b
    rows: 1
    columns:
      - name: a_id
        ref: a.missing
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::UnknownRefColumn { .. })
        ));
    }

    #[test]
    fn test_external_refs() {
        let yaml = r#"
tables:
  - name: order
    rows: 10
    columns:
      - name: customer_id
        ref: customer.id
      - name: other_customer_id
        ref: customer.id
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let external = config.external_refs();
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].key(), "customer.id");
    }

    #[test]
    fn test_cycle_is_rejected() {
        let yaml = r#"
tables:
  - name: a
    rows: 1
    columns:
      - name: id
        ref: b.id
  - name: b
    rows: 1
    columns:
      - name: id
        ref: a.id
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::DependencyCycle { .. })
        ));
    }

    #[test]
    fn test_yaml_round_trip_keeps_modes() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let yaml = config.to_yaml().unwrap();
        let reloaded = Config::from_yaml(&yaml).unwrap();

        assert_eq!(reloaded.table_names(), config.table_names());
        for (a, b) in config.tables().iter().zip(reloaded.tables()) {
            assert_eq!(a.column_names(), b.column_names());
            for (ca, cb) in a.columns.iter().zip(&b.columns) {
                assert_eq!(ca.mode.name(), cb.mode.name());
            }
        }
        assert!(yaml.contains("max: 2h"));
    }

    #[test]
    fn test_ref_target_parse() {
        let t = RefTarget::parse("public.person.id").unwrap();
        assert_eq!(t.table, "public.person");
        assert_eq!(t.column, "id");
        assert!(RefTarget::parse("person.").is_none());
        assert!(RefTarget::parse(".id").is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.table_names(), Config::from_yaml(SAMPLE).unwrap().table_names());

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(Config::from_file(missing), Err(ConfigError::Io(_))));
    }
}
