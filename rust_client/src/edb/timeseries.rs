//! Typed time-series data returned by the engineering database.

use chrono::{DateTime, Utc};
use csv::ReaderBuilder;

use crate::error::{Error, Result};
use crate::time::mjd::{parse_utc, ModifiedJulianDate};

/// SQL type tags used by the EDB CSV payload. Closed enumeration; any
/// other tag in a payload is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Real,
    Varchar,
}

impl SqlType {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "real" => Ok(SqlType::Real),
            "varchar" => Ok(SqlType::Varchar),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }

    fn cast(&self, raw: &str) -> Result<EdbValue> {
        match self {
            SqlType::Real => raw
                .trim()
                .parse::<f64>()
                .map(EdbValue::Real)
                .map_err(|_| Error::MalformedRecord(format!("expected real value, got '{raw}'"))),
            SqlType::Varchar => Ok(EdbValue::Text(raw.to_string())),
        }
    }
}

/// One telemetry value, typed by the payload's SQL type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum EdbValue {
    Real(f64),
    Text(String),
}

impl EdbValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EdbValue::Real(v) => Some(*v),
            EdbValue::Text(_) => None,
        }
    }
}

/// One telemetry sample: reported UTC time, reported MJD, and the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub mjd: ModifiedJulianDate,
    pub value: EdbValue,
}

/// Summary of consecutive sample spacings, seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceStats {
    /// Number of consecutive-sample intervals
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// A spacing between consecutive samples exceeding the gap threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub seconds: f64,
}

/// Time series for one mnemonic from the JWST engineering database.
#[derive(Debug, Clone)]
pub struct EdbTimeSeries {
    pub mnemonic: String,
    samples: Vec<Sample>,
}

impl EdbTimeSeries {
    /// Parse the CSV payload returned by the MAST EDB interface.
    ///
    /// Columns are `theTime`, `MJD`, `euvalue`, `sqltype`; the header row
    /// is recognized by its first field and skipped.
    pub fn parse(mnemonic: &str, text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes());

        let mut samples = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.get(0) == Some("theTime") {
                continue;
            }
            if record.len() < 4 {
                return Err(Error::MalformedRecord(format!(
                    "expected 4 fields, got {}",
                    record.len()
                )));
            }
            let time = parse_utc(&record[0])?;
            let mjd = record[1].trim().parse::<f64>().map_err(|_| {
                Error::MalformedRecord(format!("expected MJD value, got '{}'", &record[1]))
            })?;
            let value = SqlType::parse(&record[3])?.cast(&record[2])?;
            samples.push(Sample {
                time,
                mjd: ModifiedJulianDate::new(mjd),
                value,
            });
        }

        Ok(Self {
            mnemonic: mnemonic.to_string(),
            samples,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sample times as UTC instants.
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Sample times as reported MJD values.
    pub fn times_mjd(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.mjd.value()).collect()
    }

    /// All values as f64. Fails on the first non-numeric sample.
    pub fn real_values(&self) -> Result<Vec<f64>> {
        self.samples
            .iter()
            .map(|s| {
                s.value.as_f64().ok_or_else(|| {
                    Error::MalformedRecord(format!(
                        "{}: non-numeric value at {}",
                        self.mnemonic, s.time
                    ))
                })
            })
            .collect()
    }

    /// Spacing statistics over consecutive samples. `None` with fewer
    /// than two samples.
    pub fn cadence_stats(&self) -> Option<CadenceStats> {
        let deltas = self.deltas();
        if deltas.is_empty() {
            return None;
        }
        let count = deltas.len();
        let min = deltas.iter().copied().fold(f64::INFINITY, f64::min);
        let max = deltas.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = deltas.iter().sum::<f64>() / count as f64;
        let variance = deltas.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / count as f64;

        let mut sorted = deltas;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        Some(CadenceStats {
            count,
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }

    /// Spacings larger than `threshold` times the median cadence.
    pub fn gaps(&self, threshold: f64) -> Vec<Gap> {
        let Some(stats) = self.cadence_stats() else {
            return Vec::new();
        };
        let cutoff = threshold * stats.median;
        self.samples
            .windows(2)
            .filter_map(|pair| {
                let seconds = seconds_between(pair[1].time, pair[0].time);
                (seconds > cutoff).then(|| Gap {
                    start: pair[0].time,
                    end: pair[1].time,
                    seconds,
                })
            })
            .collect()
    }

    fn deltas(&self) -> Vec<f64> {
        self.samples
            .windows(2)
            .map(|pair| seconds_between(pair[1].time, pair[0].time))
            .collect()
    }
}

fn seconds_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    let d = later.signed_duration_since(earlier);
    d.num_seconds() as f64 + f64::from(d.subsec_nanos()) * 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "\
theTime,MJD,euvalue,sqltype
2022-05-02T06:00:00.000,59701.25,17.25,real
2022-05-02T06:00:01.000,59701.2500115741,17.5,real
2022-05-02T06:00:02.000,59701.2500231481,17.75,real
";

    #[test]
    fn parses_real_samples_and_skips_header() {
        let series = EdbTimeSeries::parse("SA_ZFGGSPOSX", PAYLOAD).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.real_values().unwrap(), vec![17.25, 17.5, 17.75]);
        assert!((series.times_mjd()[0] - 59701.25).abs() < 1e-9);
    }

    #[test]
    fn parses_varchar_samples_as_text() {
        let payload = "\
theTime,MJD,euvalue,sqltype
2022-05-02T06:00:00.000,59701.25,TRACKING,varchar
";
        let series = EdbTimeSeries::parse("SA_ZATTSTAT", payload).unwrap();
        assert_eq!(
            series.samples()[0].value,
            EdbValue::Text("TRACKING".to_string())
        );
        assert!(series.real_values().is_err());
    }

    #[test]
    fn unknown_sqltype_is_an_error() {
        let payload = "2022-05-02T06:00:00.000,59701.25,17.25,datetime2\n";
        assert!(matches!(
            EdbTimeSeries::parse("X", payload),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn short_record_is_malformed() {
        let payload = "2022-05-02T06:00:00.000,59701.25\n";
        assert!(matches!(
            EdbTimeSeries::parse("X", payload),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn cadence_stats_over_regular_series() {
        let series = EdbTimeSeries::parse("X", PAYLOAD).unwrap();
        let stats = series.cadence_stats().unwrap();
        assert_eq!(stats.count, 2);
        assert!((stats.mean - 1.0).abs() < 1e-9);
        assert!((stats.median - 1.0).abs() < 1e-9);
        assert!(stats.std_dev < 1e-9);
        assert!(series.gaps(3.0).is_empty());
    }

    #[test]
    fn gap_detection_flags_oversized_spacings() {
        let payload = "\
theTime,MJD,euvalue,sqltype
2022-05-02T06:00:00.000,59701.25,1.0,real
2022-05-02T06:00:01.000,59701.2500115741,2.0,real
2022-05-02T06:00:02.000,59701.2500231481,3.0,real
2022-05-02T06:00:13.000,59701.2501504630,4.0,real
";
        let series = EdbTimeSeries::parse("X", payload).unwrap();
        let gaps = series.gaps(3.0);
        assert_eq!(gaps.len(), 1);
        assert!((gaps[0].seconds - 11.0).abs() < 1e-9);
    }

    #[test]
    fn single_sample_has_no_cadence() {
        let payload = "2022-05-02T06:00:00.000,59701.25,1.0,real\n";
        let series = EdbTimeSeries::parse("X", payload).unwrap();
        assert!(series.cadence_stats().is_none());
        assert!(series.gaps(3.0).is_empty());
    }
}
