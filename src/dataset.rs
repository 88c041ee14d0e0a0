use chrono::{NaiveTime, Timelike};
use std::collections::BTreeSet;
use std::io::Read;

use crate::error::{StoreError, TrainError};
use crate::models::WeatherReading;
use crate::record::{LogRow, RawRow};
use crate::vocab::{
    Accessory, Activity, Bottoms, ClothingSelection, Footwear, Outerwear, Selection, Sport,
    Vocabulary,
};

/// Which half of the prediction a target column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetGroup {
    Clothing,
    Sports,
}

/// Numeric feature matrix with named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Boolean target matrix with named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetFrame {
    pub names: Vec<String>,
    pub groups: Vec<TargetGroup>,
    pub rows: Vec<Vec<bool>>,
}

/// Features and targets for the same rows, in the same order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    pub features: FeatureFrame,
    pub targets: TargetFrame,
}

/// Column statistics in the spirit of a dataframe `describe()`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, NaN with fewer than two values
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl FeatureFrame {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|column| column == name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.position(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Removes the named columns that exist and returns their names
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let drop: BTreeSet<usize> = names
            .iter()
            .filter_map(|name| self.position(name.as_ref()))
            .collect();
        let dropped = drop.iter().map(|idx| self.names[*idx].clone()).collect();

        self.names = retain_indices(&self.names, &drop);
        for row in &mut self.rows {
            *row = retain_indices(row, &drop);
        }
        dropped
    }

    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            rows: indices.iter().map(|idx| self.rows[*idx].clone()).collect(),
        }
    }

    pub fn describe(&self) -> Vec<FeatureSummary> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<f64> = self.rows.iter().map(|row| row[idx]).collect();
                summarize(name, &values)
            })
            .collect()
    }
}

impl TargetFrame {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names of columns holding fewer than two distinct values
    #[must_use]
    pub fn constant_columns(&self) -> Vec<String> {
        self.constant_indices()
            .into_iter()
            .map(|idx| self.names[idx].clone())
            .collect()
    }

    fn constant_indices(&self) -> BTreeSet<usize> {
        (0..self.names.len())
            .filter(|idx| {
                let first = self.rows.first().map(|row| row[*idx]);
                match first {
                    None => true,
                    Some(first) => self.rows.iter().all(|row| row[*idx] == first),
                }
            })
            .collect()
    }

    /// Removes constant columns, which a classifier cannot learn from.
    /// Returns the names that were removed.
    pub fn drop_constant_columns(&mut self) -> Vec<String> {
        let drop = self.constant_indices();
        let dropped = drop.iter().map(|idx| self.names[*idx].clone()).collect();

        self.names = retain_indices(&self.names, &drop);
        self.groups = retain_indices(&self.groups, &drop);
        for row in &mut self.rows {
            *row = retain_indices(row, &drop);
        }
        dropped
    }

    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            groups: self.groups.clone(),
            rows: indices.iter().map(|idx| self.rows[*idx].clone()).collect(),
        }
    }
}

fn retain_indices<T: Clone>(values: &[T], drop: &BTreeSet<usize>) -> Vec<T> {
    values
        .iter()
        .enumerate()
        .filter(|(idx, _)| !drop.contains(idx))
        .map(|(_, value)| value.clone())
        .collect()
}

fn summarize(name: &str, values: &[f64]) -> FeatureSummary {
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        f64::NAN
    } else {
        (values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    };
    FeatureSummary {
        name: name.to_string(),
        count,
        mean,
        std,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Converts an "HH:MM" time of day to minutes since midnight
pub fn minutes_since_midnight(column: &'static str, value: &str) -> Result<f64, TrainError> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| TrainError::TimeOfDay {
        column,
        value: value.to_string(),
    })?;
    Ok(f64::from(time.hour() * 60 + time.minute()))
}

fn weather_values(weather: &WeatherReading) -> Result<Vec<f64>, TrainError> {
    Ok(vec![
        weather.temperature,
        weather.humidity,
        weather.apparent_temperature,
        weather.precipitation_probability,
        weather.precipitation,
        f64::from(weather.weather_code),
        weather.cloud_cover_low,
        weather.visibility,
        weather.et0,
        weather.wind_speed,
        weather.wind_direction,
        weather.wind_gusts,
        weather.daily_max,
        weather.daily_min,
        minutes_since_midnight("sunrise", &weather.sunrise)?,
        minutes_since_midnight("sunset", &weather.sunset)?,
        weather.daylight_duration,
        weather.sunshine_duration,
        weather.uv_index_max,
        weather.shortwave_radiation_sum,
    ])
}

fn flat_names<V: Vocabulary>() -> impl Iterator<Item = String> {
    V::ALL.iter().map(|option| option.label().to_string())
}

fn nested_names<V: Vocabulary>() -> impl Iterator<Item = String> {
    V::ALL
        .iter()
        .map(|option| format!("{}.{}", V::GROUP, option.label()))
}

fn flags<V: Vocabulary>(selection: &Selection<V>) -> impl Iterator<Item = bool> + '_ {
    selection.flags().map(|(_, value)| value)
}

/// Feature column names: weather fields, then activity options
pub fn feature_names() -> Vec<String> {
    WeatherReading::FIELDS
        .iter()
        .map(|field| field.to_string())
        .chain(flat_names::<Activity>())
        .collect()
}

/// Target column names with their group: `<group>.<option>` for clothing,
/// then `<option>` for sports
pub fn target_columns() -> Vec<(String, TargetGroup)> {
    nested_names::<Outerwear>()
        .chain(nested_names::<Bottoms>())
        .chain(nested_names::<Footwear>())
        .chain(nested_names::<Accessory>())
        .map(|name| (name, TargetGroup::Clothing))
        .chain(flat_names::<Sport>().map(|name| (name, TargetGroup::Sports)))
        .collect()
}

fn clothing_flags(clothing: &ClothingSelection) -> impl Iterator<Item = bool> + '_ {
    flags(&clothing.outerwear)
        .chain(flags(&clothing.bottoms))
        .chain(flags(&clothing.footwear))
        .chain(flags(&clothing.accessories))
}

/// Flattens rows into a feature table and a target table
pub fn flatten(rows: &[LogRow]) -> Result<FlatTable, TrainError> {
    let (target_names, groups): (Vec<_>, Vec<_>) = target_columns().into_iter().unzip();
    let mut table = FlatTable {
        features: FeatureFrame {
            names: feature_names(),
            rows: Vec::with_capacity(rows.len()),
        },
        targets: TargetFrame {
            names: target_names,
            groups,
            rows: Vec::with_capacity(rows.len()),
        },
    };

    for row in rows {
        let mut features = weather_values(&row.weather)?;
        features.extend(flags(&row.activity).map(|value| if value { 1.0 } else { 0.0 }));
        table.features.rows.push(features);

        let targets = clothing_flags(&row.clothing)
            .chain(flags(&row.sports))
            .collect();
        table.targets.rows.push(targets);
    }

    tracing::debug!(
        "Flattened {} rows into {} features and {} targets",
        rows.len(),
        table.features.names.len(),
        table.targets.names.len()
    );
    Ok(table)
}

/// Reads rows from an exported CSV file
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<LogRow>, StoreError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawRow>() {
        let mut row = record?.decode()?;
        // CSV has no NULL, an empty field stands for a missing note
        row.other = row.other.filter(|text| !text.is_empty());
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_time_of_day_to_minutes() {
        assert_eq!(minutes_since_midnight("sunrise", "05:36").unwrap(), 336.0);
        assert_eq!(minutes_since_midnight("sunset", "21:03").unwrap(), 1263.0);
        assert!(matches!(
            minutes_since_midnight("sunset", "9pm"),
            Err(TrainError::TimeOfDay { column: "sunset", .. })
        ));
    }

    #[test]
    fn feature_names_are_weather_then_activity() {
        let names = feature_names();
        assert_eq!(names.len(), 25);
        assert_eq!(names[0], "temperature");
        assert_eq!(names[19], "shortwave_radiation_sum");
        assert_eq!(&names[20..], ["walking", "running", "frisbee", "cycling", "other"]);
    }

    #[test]
    fn target_names_nest_clothing_groups() {
        let columns = target_columns();
        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names.len(), 6 + 4 + 3 + 6 + 3);
        assert_eq!(names[0], "outerwear.none");
        assert_eq!(names[5], "outerwear.heavy jacket");
        assert_eq!(names[6], "bottoms.athletic");
        assert_eq!(names[10], "footwear.running");
        assert_eq!(names[11], "footwear.cold running");
        assert_eq!(names[13], "accessories.none");
        assert_eq!(&names[19..], ["running", "frisbee", "cycling"]);
        assert_eq!(columns[18].1, TargetGroup::Clothing);
        assert_eq!(columns[19].1, TargetGroup::Sports);
    }

    #[test]
    fn drops_constant_target_columns() {
        let mut targets = TargetFrame {
            names: vec!["a".into(), "b".into(), "c".into()],
            groups: vec![TargetGroup::Clothing, TargetGroup::Clothing, TargetGroup::Sports],
            rows: vec![vec![false, true, true], vec![false, false, true]],
        };
        assert_eq!(targets.constant_columns(), vec!["a", "c"]);

        let dropped = targets.drop_constant_columns();
        assert_eq!(dropped, vec!["a", "c"]);
        assert_eq!(targets.names, vec!["b"]);
        assert_eq!(targets.groups, vec![TargetGroup::Clothing]);
        assert_eq!(targets.rows, vec![vec![true], vec![false]]);
    }

    #[test]
    fn drop_columns_ignores_unknown_names() {
        let mut features = FeatureFrame {
            names: vec!["x".into(), "sunrise".into(), "y".into()],
            rows: vec![vec![1.0, 300.0, 2.0]],
        };
        let dropped = features.drop_columns(&["sunrise", "missing"]);
        assert_eq!(dropped, vec!["sunrise"]);
        assert_eq!(features.names, vec!["x", "y"]);
        assert_eq!(features.rows, vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn describe_uses_sample_standard_deviation() {
        let features = FeatureFrame {
            names: vec!["t".into()],
            rows: vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        };
        let summary = &features.describe()[0];
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.std - 1.290_994).abs() < 1e-6);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
    }
}
