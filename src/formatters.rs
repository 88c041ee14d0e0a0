use chrono::NaiveDate;

use crate::dataset::FeatureSummary;
use crate::models::WeatherReading;
use crate::record::Hour;
use crate::training::TrainingOutcome;

/// Formats the fetched weather into the summary shown before the clothing prompts
pub fn format_weather_summary(
    date: NaiveDate,
    hour: Hour,
    location: &str,
    weather: &WeatherReading,
) -> String {
    format!(
        "Weather on {} at {}:XX in {}:\n\
         Temperature: {}\u{00b0}C\n\
         Apparent Temperature: {}\u{00b0}C\n\
         Precipitation Probability: {}%\n\
         Precipitation: {}mm\n\
         Code: {} {} ({})\n\
         Low Cloud Cover: {}%\n\
         Visibility: {} m\n\
         Wind Speed: {} m/s\n",
        date,
        hour,
        location,
        weather.temperature,
        weather.apparent_temperature,
        weather.precipitation_probability,
        weather.precipitation,
        weather.weather_code,
        weather_code_to_emoji(weather.weather_code),
        weather_code_to_description(weather.weather_code),
        weather.cloud_cover_low,
        weather.visibility,
        weather.wind_speed
    )
}

/// Formats per-column statistics of the feature matrix
pub fn format_feature_summary(summaries: &[FeatureSummary]) -> String {
    let width = summaries
        .iter()
        .map(|summary| summary.name.len())
        .max()
        .unwrap_or(0)
        .max(7);

    let mut output = format!(
        "{:<width$} {:>6} {:>12} {:>12} {:>12} {:>12}\n",
        "feature", "count", "mean", "std", "min", "max"
    );
    for summary in summaries {
        output.push_str(&format!(
            "{:<width$} {:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4}\n",
            summary.name, summary.count, summary.mean, summary.std, summary.min, summary.max
        ));
    }
    output
}

/// Formats the evaluation of a training run
pub fn format_training_outcome(outcome: &TrainingOutcome) -> String {
    let report = &outcome.report;
    let mut output = format!(
        "Trained on {} rows, tested on {} rows ({} features, {} targets)\n",
        outcome.train_rows,
        outcome.test_rows,
        outcome.feature_names.len(),
        report.labels.len()
    );
    if !outcome.dropped_targets.is_empty() {
        output.push_str(&format!(
            "Dropped constant targets: {}\n",
            outcome.dropped_targets.join(", ")
        ));
    }

    output.push_str("\nPer-target results:\n");
    for label in &report.labels {
        output.push_str(&format!(
            "  {:<28} accuracy {:.4}  precision {:.4}  recall {:.4}  f1 {:.4}  support {}\n",
            label.name, label.accuracy, label.precision, label.recall, label.f1, label.support
        ));
    }

    output.push('\n');
    if let Some(accuracy) = report.clothing_accuracy {
        output.push_str(&format!("Accuracy (clothing): {:.4}\n", accuracy));
    }
    if let Some(accuracy) = report.sports_accuracy {
        output.push_str(&format!("Accuracy (sports): {:.4}\n", accuracy));
    }
    output.push_str(&format!(
        "Accuracy (overall): {:.4}\n\
         Weighted avg F1: {:.4}\n\
         Weighted avg Precision: {:.4}\n\
         Weighted avg Recall: {:.4}\n",
        report.overall_accuracy, report.weighted_f1, report.weighted_precision, report.weighted_recall
    ));
    output
}

/// Converts WMO weather code to human-readable description
pub fn weather_code_to_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Foggy",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80 | 81 | 82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Converts WMO weather code to an emoji, `❓` when unmapped
pub fn weather_code_to_emoji(code: i32) -> &'static str {
    match code {
        0 => "🌞",
        1 => "🌤️",
        2 => "⛅",
        3 => "🌥️",
        45 | 48 => "🌫️",
        51..=57 | 61 => "💧",
        63 => "🌧️",
        65 => "🌊",
        66 | 67 => "☔",
        71 => "❄️",
        73 | 77 => "🌨️",
        75 => "☃️",
        80 | 81 | 85 | 86 => "🚿",
        95 => "⚡",
        96 => "🌩️",
        97 => "⛈️",
        _ => "❓",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> WeatherReading {
        WeatherReading {
            temperature: 22.5,
            humidity: 60.0,
            apparent_temperature: 23.1,
            precipitation_probability: 10.0,
            precipitation: 0.0,
            weather_code: 2,
            cloud_cover_low: 15.0,
            visibility: 24140.0,
            et0: 0.3,
            wind_speed: 9.4,
            wind_direction: 250.0,
            wind_gusts: 20.2,
            daily_max: 26.0,
            daily_min: 15.2,
            sunrise: "05:36".into(),
            sunset: "21:03".into(),
            daylight_duration: 55620.0,
            sunshine_duration: 48000.0,
            uv_index_max: 7.9,
            shortwave_radiation_sum: 27.4,
        }
    }

    #[test]
    fn weather_summary_mentions_when_and_where() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let summary = format_weather_summary(date, Hour::new(16).unwrap(), "Toronto, Canada", &reading());
        assert!(summary.starts_with("Weather on 2024-06-20 at 16:XX in Toronto, Canada:"));
        assert!(summary.contains("Temperature: 22.5\u{00b0}C"));
        assert!(summary.contains("Code: 2 ⛅ (Partly cloudy)"));
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(weather_code_to_emoji(42), "❓");
        assert_eq!(weather_code_to_description(42), "Unknown");
    }
}
