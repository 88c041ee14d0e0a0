#![allow(dead_code)]

use chrono::NaiveDate;
use clothing_weather::vocab::{Accessory, Activity, Bottoms, Footwear, Outerwear, Sport};
use clothing_weather::{ClothingSelection, Hour, LogRow, Store, WeatherReading};
use tempfile::TempDir;

/// Fresh, initialized store in a temporary directory
pub fn temp_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::new(dir.path().join("clothing_data.db"));
    store.initialize().expect("initialize");
    (dir, store)
}

pub fn weather(temperature: f64) -> WeatherReading {
    WeatherReading {
        temperature,
        humidity: 55.0,
        apparent_temperature: temperature - 1.5,
        precipitation_probability: 10.0,
        precipitation: 0.0,
        weather_code: 1,
        cloud_cover_low: 5.0,
        visibility: 24140.0,
        et0: 0.42,
        wind_speed: 11.3,
        wind_direction: 240.0,
        wind_gusts: 25.6,
        daily_max: temperature + 3.0,
        daily_min: temperature - 7.0,
        sunrise: "05:36".to_string(),
        sunset: "21:03".to_string(),
        daylight_duration: 55620.37,
        sunshine_duration: 50108.12,
        uv_index_max: 7.85,
        shortwave_radiation_sum: 28.71,
    }
}

/// The Toronto afternoon used throughout the tests
pub fn toronto_row() -> LogRow {
    LogRow {
        date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
        time: Hour::new(16).unwrap(),
        location: "Toronto, Canada".to_string(),
        weather: weather(22.5),
        clothing: ClothingSelection {
            outerwear: [Outerwear::None].into_iter().collect(),
            bottoms: [Bottoms::Athletic].into_iter().collect(),
            footwear: [Footwear::Running].into_iter().collect(),
            accessories: [Accessory::None].into_iter().collect(),
        },
        sports: [Sport::Running, Sport::Cycling].into_iter().collect(),
        activity: [Activity::Walking].into_iter().collect(),
        other: None,
    }
}

/// A row whose clothing follows the temperature: cold means jacket and
/// cold pants, warm means shorts and sunglasses
pub fn row_for_temperature(day: u32, temperature: f64) -> LogRow {
    let cold = temperature < 12.0;
    let clothing = if cold {
        ClothingSelection {
            outerwear: [Outerwear::Jacket].into_iter().collect(),
            bottoms: [Bottoms::ColdPants].into_iter().collect(),
            footwear: [Footwear::ColdRunning].into_iter().collect(),
            accessories: [Accessory::Gloves].into_iter().collect(),
        }
    } else {
        ClothingSelection {
            outerwear: [Outerwear::ThinSweater].into_iter().collect(),
            bottoms: [Bottoms::Shorts].into_iter().collect(),
            footwear: [Footwear::Running].into_iter().collect(),
            accessories: [Accessory::Sunglasses].into_iter().collect(),
        }
    };
    let sports = if cold {
        [Sport::Running].into_iter().collect()
    } else {
        [Sport::Running, Sport::Frisbee, Sport::Cycling].into_iter().collect()
    };

    LogRow {
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + chrono::Days::new(u64::from(day)),
        time: Hour::new((day % 24) as u8).unwrap(),
        location: "Toronto, Canada".to_string(),
        weather: weather(temperature),
        clothing,
        sports,
        activity: [Activity::Walking].into_iter().collect(),
        other: None,
    }
}
