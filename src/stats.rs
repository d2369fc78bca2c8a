use serde::Serialize;

use crate::config::{AthleteRecord, RACES, TimeColumn};

/// Running mean and variance (Welford).
struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    fn mean(&self) -> f64 {
        if self.n_vals == 0 { f64::NAN } else { self.mean }
    }

    /// Sample standard deviation.
    fn std_dev(&self) -> f64 {
        if self.n_vals > 1 {
            (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
        } else {
            f64::NAN
        }
    }
}

/// A numeric column of the normalized sheet: the race count or a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Races,
    Time(TimeColumn),
}

impl NumericColumn {
    /// Sheet order: `Races` first, then the times.
    pub fn all() -> Vec<NumericColumn> {
        std::iter::once(NumericColumn::Races)
            .chain(TimeColumn::ALL.into_iter().map(NumericColumn::Time))
            .collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Races => RACES,
            NumericColumn::Time(c) => c.name(),
        }
    }

    fn value(self, record: &AthleteRecord) -> f64 {
        match self {
            NumericColumn::Races => record.races as f64,
            NumericColumn::Time(c) => record.time(c),
        }
    }
}

impl Serialize for NumericColumn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: NumericColumn,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q1: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// Row-major, `columns.len()` squared.
    pub values: Vec<Vec<f64>>,
}

/// Figures behind one box of a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub column: TimeColumn,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Shooting,
    Range,
}

impl Group {
    pub fn columns(self) -> [TimeColumn; 7] {
        match self {
            Group::Shooting => TimeColumn::SHOOTING,
            Group::Range => TimeColumn::RANGE,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Group::Shooting => "Shooting Time Distribution (seconds)",
            Group::Range => "Range Time Distribution (seconds)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: usize,
    pub columns: usize,
    pub describe: Vec<ColumnSummary>,
    pub correlation: CorrelationMatrix,
    pub shooting: Vec<BoxStats>,
    pub range: Vec<BoxStats>,
}

pub fn report(records: &[AthleteRecord], columns: usize) -> Report {
    Report {
        rows: records.len(),
        columns,
        describe: describe(records),
        correlation: correlation(records),
        shooting: box_plot(records, Group::Shooting),
        range: box_plot(records, Group::Range),
    }
}

fn column_values(records: &[AthleteRecord], column: NumericColumn) -> Vec<f64> {
    records.iter().map(|r| column.value(r)).collect()
}

fn sorted(mut vals: Vec<f64>) -> Vec<f64> {
    vals.sort_by(f64::total_cmp);
    vals
}

/// Linear interpolation between the closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// count, mean, std, min, quartiles and max for every numeric column.
pub fn describe(records: &[AthleteRecord]) -> Vec<ColumnSummary> {
    NumericColumn::all()
        .into_iter()
        .map(|column| {
            let vals = sorted(column_values(records, column));
            let mut acc = Accumulator::new();
            vals.iter().for_each(|&v| acc.add(v));
            ColumnSummary {
                column,
                count: vals.len(),
                mean: acc.mean(),
                std: acc.std_dev(),
                min: vals.first().copied().unwrap_or(f64::NAN),
                q1: quantile(&vals, 0.25),
                median: quantile(&vals, 0.5),
                q3: quantile(&vals, 0.75),
                max: vals.last().copied().unwrap_or(f64::NAN),
            }
        })
        .collect()
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;
    let mut num = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let a = a - mx;
        let b = b - my;
        num += a * b;
        sx += a * a;
        sy += b * b;
    }
    if sx == 0.0 || sy == 0.0 {
        f64::NAN
    } else {
        num / (sx.sqrt() * sy.sqrt())
    }
}

/// Pearson correlation between every pair of numeric columns. Constant
/// columns (e.g. all zero-filled) correlate as NaN.
pub fn correlation(records: &[AthleteRecord]) -> CorrelationMatrix {
    let columns = NumericColumn::all();
    let data: Vec<Vec<f64>> = columns
        .iter()
        .map(|&c| column_values(records, c))
        .collect();
    let values = data
        .iter()
        .map(|x| data.iter().map(|y| pearson(x, y)).collect())
        .collect();
    CorrelationMatrix { columns, values }
}

/// Quartiles, 1.5 IQR whiskers and outliers for each column of `group`.
pub fn box_plot(records: &[AthleteRecord], group: Group) -> Vec<BoxStats> {
    group
        .columns()
        .into_iter()
        .map(|column| {
            let vals = sorted(column_values(records, NumericColumn::Time(column)));
            let q1 = quantile(&vals, 0.25);
            let q3 = quantile(&vals, 0.75);
            let iqr = q3 - q1;
            let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
            let (inside, outliers): (Vec<f64>, Vec<f64>) = vals
                .iter()
                .partition(|v| (lo_fence..=hi_fence).contains(*v));
            BoxStats {
                column,
                q1,
                median: quantile(&vals, 0.5),
                q3,
                whisker_low: inside.first().copied().unwrap_or(f64::NAN),
                whisker_high: inside.last().copied().unwrap_or(f64::NAN),
                outliers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Prone shooting times `p`, with range prone `2p + 1`, standing `-p` and
    /// races `3p`.
    fn records(prone: &[f64]) -> Vec<AthleteRecord> {
        prone
            .iter()
            .map(|&p| {
                let mut r = AthleteRecord {
                    races: (3.0 * p) as u32,
                    ..AthleteRecord::default()
                };
                r.set_time(TimeColumn::ShootingProne, p);
                r.set_time(TimeColumn::RangeProne, 2.0 * p + 1.0);
                r.set_time(TimeColumn::ShootingStanding, -p);
                r
            })
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn get(m: &CorrelationMatrix, a: NumericColumn, b: NumericColumn) -> f64 {
        let i = m.columns.iter().position(|&c| c == a).unwrap();
        let j = m.columns.iter().position(|&c| c == b).unwrap();
        m.values[i][j]
    }

    const SP: NumericColumn = NumericColumn::Time(TimeColumn::ShootingProne);

    #[test]
    fn describe_matches_hand_computed() {
        let d = describe(&records(&[4.0, 1.0, 3.0, 2.0]));
        assert_eq!(d.len(), 16);
        let p = &d[1];
        assert_eq!(p.column, SP);
        assert_eq!(p.count, 4);
        assert!(close(p.mean, 2.5));
        assert!(close(p.std, (5.0f64 / 3.0).sqrt()));
        assert_eq!(p.min, 1.0);
        assert!(close(p.q1, 1.75));
        assert!(close(p.median, 2.5));
        assert!(close(p.q3, 3.25));
        assert_eq!(p.max, 4.0);
    }

    #[test]
    fn describe_includes_races() {
        let d = describe(&records(&[4.0, 1.0, 3.0, 2.0]));
        let races = &d[0];
        assert_eq!(races.column, NumericColumn::Races);
        assert_eq!(races.count, 4);
        assert!(close(races.mean, 7.5));
        assert_eq!(races.min, 3.0);
        assert!(close(races.q1, 5.25));
        assert!(close(races.median, 7.5));
        assert!(close(races.q3, 9.75));
        assert_eq!(races.max, 12.0);
    }

    #[test]
    fn describe_small_inputs() {
        let one = describe(&records(&[7.0]));
        assert_eq!(one[1].mean, 7.0);
        assert!(one[1].std.is_nan());
        assert_eq!(one[1].median, 7.0);

        let none = describe(&[]);
        assert_eq!(none[0].count, 0);
        assert!(none[0].mean.is_nan());
        assert!(none[1].min.is_nan());
        assert!(none[1].q1.is_nan());
    }

    #[test]
    fn correlation_of_linear_columns() {
        let m = correlation(&records(&[1.0, 2.0, 5.0, 9.0]));
        let rp = NumericColumn::Time(TimeColumn::RangeProne);
        let ss = NumericColumn::Time(TimeColumn::ShootingStanding);
        assert!(close(get(&m, SP, rp), 1.0));
        assert!(close(get(&m, SP, ss), -1.0));
        assert!(close(get(&m, SP, SP), 1.0));
        // never set, so constant zero
        assert!(get(&m, SP, NumericColumn::Time(TimeColumn::PenaltyLoop)).is_nan());
        assert_eq!(m.values.len(), 16);
    }

    #[test]
    fn correlation_against_races() {
        let m = correlation(&records(&[1.0, 2.0, 5.0, 9.0]));
        assert_eq!(m.columns[0], NumericColumn::Races);
        assert!(close(get(&m, NumericColumn::Races, SP), 1.0));
        let ss = NumericColumn::Time(TimeColumn::ShootingStanding);
        assert!(close(get(&m, ss, NumericColumn::Races), -1.0));
    }

    #[test]
    fn box_plot_flags_outliers() {
        let b = box_plot(&records(&[1.0, 2.0, 3.0, 4.0, 100.0]), Group::Shooting);
        assert_eq!(b.len(), 7);
        let p = &b[0];
        assert_eq!(p.column, TimeColumn::ShootingProne);
        assert_eq!((p.q1, p.median, p.q3), (2.0, 3.0, 4.0));
        assert_eq!(p.whisker_low, 1.0);
        assert_eq!(p.whisker_high, 4.0);
        assert_eq!(p.outliers, vec![100.0]);

        let r = box_plot(&records(&[1.0]), Group::Range);
        assert_eq!(r[0].column, TimeColumn::RangeProne);
        assert!(r[0].outliers.is_empty());
    }

    #[test]
    fn report_shape() {
        let rep = report(&records(&[1.0, 2.0]), 19);
        assert_eq!(rep.rows, 2);
        assert_eq!(rep.columns, 19);
        assert_eq!(rep.shooting.len(), 7);
        assert_eq!(rep.range.len(), 7);
        let json = serde_json::to_value(&rep).unwrap();
        assert_eq!(json["describe"][0]["column"], "Races");
        assert_eq!(json["describe"][1]["column"], "Sh_Time_P");
        assert_eq!(json["correlation"]["columns"][15], "Penalty Loop");
        assert!(json["describe"][1].get("25%").is_some());
    }
}
