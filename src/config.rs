use serde::Serialize;

/// Text every missing cell is replaced with before time parsing.
pub const MISSING_SENTINEL: &str = "0:00.0";

pub const FAMILY_NAME: &str = "Family Name";
pub const GIVEN_NAME: &str = "Given Name";
pub const NATION: &str = "Nation";
pub const RACES: &str = "Races";

pub const IDENTITY_COLUMNS: [&str; 4] = [FAMILY_NAME, GIVEN_NAME, NATION, RACES];

/// Every time-valued column in a season shooting-times sheet.
///
/// `Sh` is shooting time (on the mat), `Rg` is range time (approach to
/// departure). The suffix names the position (prone, standing, total) or the
/// race format (individual, sprint, pursuit, mass start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeColumn {
    #[serde(rename = "Sh_Time_P")]
    ShootingProne,
    #[serde(rename = "Sh_Time_S")]
    ShootingStanding,
    #[serde(rename = "Sh_Time_T")]
    ShootingTotal,
    #[serde(rename = "Rg_Time_P")]
    RangeProne,
    #[serde(rename = "Rg_Time_S")]
    RangeStanding,
    #[serde(rename = "Rg_Time_T")]
    RangeTotal,
    #[serde(rename = "Sh_Time_IN")]
    ShootingIndividual,
    #[serde(rename = "Sh_Time_SP")]
    ShootingSprint,
    #[serde(rename = "Sh_Time_PU")]
    ShootingPursuit,
    #[serde(rename = "Sh_Time_MS")]
    ShootingMassStart,
    #[serde(rename = "Rg_Time_IN")]
    RangeIndividual,
    #[serde(rename = "Rg_Time_SP")]
    RangeSprint,
    #[serde(rename = "Rg_Time_PU")]
    RangePursuit,
    #[serde(rename = "Rg_Time_MS")]
    RangeMassStart,
    #[serde(rename = "Penalty Loop")]
    PenaltyLoop,
}

impl TimeColumn {
    /// Sheet order.
    pub const ALL: [TimeColumn; 15] = [
        TimeColumn::ShootingProne,
        TimeColumn::ShootingStanding,
        TimeColumn::ShootingTotal,
        TimeColumn::RangeProne,
        TimeColumn::RangeStanding,
        TimeColumn::RangeTotal,
        TimeColumn::ShootingIndividual,
        TimeColumn::ShootingSprint,
        TimeColumn::ShootingPursuit,
        TimeColumn::ShootingMassStart,
        TimeColumn::RangeIndividual,
        TimeColumn::RangeSprint,
        TimeColumn::RangePursuit,
        TimeColumn::RangeMassStart,
        TimeColumn::PenaltyLoop,
    ];

    pub const SHOOTING: [TimeColumn; 7] = [
        TimeColumn::ShootingProne,
        TimeColumn::ShootingStanding,
        TimeColumn::ShootingTotal,
        TimeColumn::ShootingIndividual,
        TimeColumn::ShootingSprint,
        TimeColumn::ShootingPursuit,
        TimeColumn::ShootingMassStart,
    ];

    pub const RANGE: [TimeColumn; 7] = [
        TimeColumn::RangeProne,
        TimeColumn::RangeStanding,
        TimeColumn::RangeTotal,
        TimeColumn::RangeIndividual,
        TimeColumn::RangeSprint,
        TimeColumn::RangePursuit,
        TimeColumn::RangeMassStart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TimeColumn::ShootingProne => "Sh_Time_P",
            TimeColumn::ShootingStanding => "Sh_Time_S",
            TimeColumn::ShootingTotal => "Sh_Time_T",
            TimeColumn::RangeProne => "Rg_Time_P",
            TimeColumn::RangeStanding => "Rg_Time_S",
            TimeColumn::RangeTotal => "Rg_Time_T",
            TimeColumn::ShootingIndividual => "Sh_Time_IN",
            TimeColumn::ShootingSprint => "Sh_Time_SP",
            TimeColumn::ShootingPursuit => "Sh_Time_PU",
            TimeColumn::ShootingMassStart => "Sh_Time_MS",
            TimeColumn::RangeIndividual => "Rg_Time_IN",
            TimeColumn::RangeSprint => "Rg_Time_SP",
            TimeColumn::RangePursuit => "Rg_Time_PU",
            TimeColumn::RangeMassStart => "Rg_Time_MS",
            TimeColumn::PenaltyLoop => "Penalty Loop",
        }
    }

    /// Header as it appears in the exported sheet. Note the source spells the
    /// pursuit shooting column `Pu` but the pursuit range column `PU`.
    pub fn raw_header(self) -> &'static str {
        match self {
            TimeColumn::ShootingProne => "Sh Time\nP",
            TimeColumn::ShootingStanding => "Sh Time\nS",
            TimeColumn::ShootingTotal => "Sh Time\nT",
            TimeColumn::RangeProne => "Rg Time\nP",
            TimeColumn::RangeStanding => "Rg Time\nS",
            TimeColumn::RangeTotal => "Rg Time\nT",
            TimeColumn::ShootingIndividual => "Sh Time\nIN",
            TimeColumn::ShootingSprint => "Sh Time\nSP",
            TimeColumn::ShootingPursuit => "Sh Time\nPu",
            TimeColumn::ShootingMassStart => "Sh Time\nMS",
            TimeColumn::RangeIndividual => "Rg Time\nIN",
            TimeColumn::RangeSprint => "Rg Time\nSP",
            TimeColumn::RangePursuit => "Rg Time\nPU",
            TimeColumn::RangeMassStart => "Rg Time\nMS",
            TimeColumn::PenaltyLoop => "Penalty\nLoop",
        }
    }

    pub fn from_name(name: &str) -> Option<TimeColumn> {
        TimeColumn::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Raw sheet header -> canonical column name.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    entries: Vec<(String, String)>,
}

impl ColumnMap {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == raw)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap::new(TimeColumn::ALL.map(|c| (c.raw_header(), c.name())))
    }
}

/// One athlete's season averages, all times in seconds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AthleteRecord {
    pub family_name: String,
    pub given_name: String,
    pub nation: String,
    /// Finished individual races; a zero-filled cell reads as 0.
    pub races: u32,
    pub sh_time_p: f64,
    pub sh_time_s: f64,
    pub sh_time_t: f64,
    pub rg_time_p: f64,
    pub rg_time_s: f64,
    pub rg_time_t: f64,
    pub sh_time_in: f64,
    pub sh_time_sp: f64,
    pub sh_time_pu: f64,
    pub sh_time_ms: f64,
    pub rg_time_in: f64,
    pub rg_time_sp: f64,
    pub rg_time_pu: f64,
    pub rg_time_ms: f64,
    pub penalty_loop: f64,
}

impl AthleteRecord {
    pub fn time(&self, column: TimeColumn) -> f64 {
        *self.time_slot(column)
    }

    pub fn set_time(&mut self, column: TimeColumn, seconds: f64) {
        *self.time_slot_mut(column) = seconds;
    }

    fn time_slot(&self, column: TimeColumn) -> &f64 {
        match column {
            TimeColumn::ShootingProne => &self.sh_time_p,
            TimeColumn::ShootingStanding => &self.sh_time_s,
            TimeColumn::ShootingTotal => &self.sh_time_t,
            TimeColumn::RangeProne => &self.rg_time_p,
            TimeColumn::RangeStanding => &self.rg_time_s,
            TimeColumn::RangeTotal => &self.rg_time_t,
            TimeColumn::ShootingIndividual => &self.sh_time_in,
            TimeColumn::ShootingSprint => &self.sh_time_sp,
            TimeColumn::ShootingPursuit => &self.sh_time_pu,
            TimeColumn::ShootingMassStart => &self.sh_time_ms,
            TimeColumn::RangeIndividual => &self.rg_time_in,
            TimeColumn::RangeSprint => &self.rg_time_sp,
            TimeColumn::RangePursuit => &self.rg_time_pu,
            TimeColumn::RangeMassStart => &self.rg_time_ms,
            TimeColumn::PenaltyLoop => &self.penalty_loop,
        }
    }

    fn time_slot_mut(&mut self, column: TimeColumn) -> &mut f64 {
        match column {
            TimeColumn::ShootingProne => &mut self.sh_time_p,
            TimeColumn::ShootingStanding => &mut self.sh_time_s,
            TimeColumn::ShootingTotal => &mut self.sh_time_t,
            TimeColumn::RangeProne => &mut self.rg_time_p,
            TimeColumn::RangeStanding => &mut self.rg_time_s,
            TimeColumn::RangeTotal => &mut self.rg_time_t,
            TimeColumn::ShootingIndividual => &mut self.sh_time_in,
            TimeColumn::ShootingSprint => &mut self.sh_time_sp,
            TimeColumn::ShootingPursuit => &mut self.sh_time_pu,
            TimeColumn::ShootingMassStart => &mut self.sh_time_ms,
            TimeColumn::RangeIndividual => &mut self.rg_time_in,
            TimeColumn::RangeSprint => &mut self.rg_time_sp,
            TimeColumn::RangePursuit => &mut self.rg_time_pu,
            TimeColumn::RangeMassStart => &mut self.rg_time_ms,
            TimeColumn::PenaltyLoop => &mut self.penalty_loop,
        }
    }
}

/// Table as loaded from disk: every cell is text or missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn missing_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_none()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Seconds(f64),
}

impl Value {
    pub fn as_seconds(&self) -> Option<f64> {
        match self {
            Value::Seconds(v) => Some(*v),
            Value::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Seconds(v) => write!(f, "{:.1}", v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::Seconds(v) => serializer.serialize_f64(*v),
        }
    }
}

/// Normalized table: designated time columns hold seconds, the rest text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|cells| RowView {
            headers: &self.headers,
            cells,
        })
    }
}

/// A row paired with its headers; serializes as an object in column order.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub headers: &'a [String],
    pub cells: &'a [Value],
}

impl Serialize for RowView<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, cell) in self.headers.iter().zip(self.cells) {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}
