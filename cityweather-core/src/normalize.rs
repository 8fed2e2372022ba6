//! Turns the raw JMA documents for one area into a [`CityWeather`].
//!
//! Each field is extracted on its own. A missing block or array only leaves
//! that field empty; nothing in here fails.
//!
//! Positional conventions of the short-range document:
//! - first block, first sub-area: `weathers[0]` today, `weathers[1]` tomorrow
//! - first sub-area anywhere with `temps`: `temps[1]` today's high,
//!   `temps[2]` tomorrow's low, `temps[3]` tomorrow's high
//! - first block whose first sub-area has `pops`: precipitation chances

use std::collections::HashMap;

use tracing::debug;

use crate::{
    forecast::{ForecastDocument, SubArea, TimeSeries},
    model::{CityWeather, WeeklyWeather},
};

const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Normalize one area. `area_code` is the code used for the request, which
/// may differ from the codes inside the documents.
pub fn normalize(area_code: &str, documents: &[ForecastDocument]) -> CityWeather {
    let mut city = CityWeather::new(area_code);

    let Some(short) = documents.first() else {
        debug!(area_code, "no forecast documents to normalize");
        return city;
    };

    city.report_time = short
        .report_datetime
        .map(|dt| dt.format(REPORT_TIME_FORMAT).to_string());

    match short.time_series.first().and_then(TimeSeries::first_area) {
        Some(area) => {
            city.area_name = Some(area.area.name.clone());
            city.today_weather = area.weathers().first().cloned();
            city.tomorrow_weather = area.weathers().get(1).cloned();
            city.winds = area.winds().to_vec();
        }
        None => debug!(area_code, "no weather block in short-range document"),
    }

    match first_area_with_temps(short) {
        Some(area) => {
            let temps = area.temps();
            city.temp_area_name = Some(area.area.name.clone());
            city.temp_today_high = temps.get(1).cloned();
            city.temp_tmrw_low = temps.get(2).cloned();
            city.temp_tmrw_high = temps.get(3).cloned();
        }
        None => debug!(area_code, "no temps in short-range document"),
    }

    match first_block_where(short, |a| !a.pops().is_empty()).and_then(TimeSeries::first_area) {
        Some(area) => city.pops = area.pops().to_vec(),
        None => debug!(area_code, "no pops in short-range document"),
    }

    match documents.get(1) {
        Some(extended) => {
            city.weekly_forecast = weekly_forecast(extended);
            if city.weekly_forecast.is_none() {
                debug!(area_code, "no weekly weather block in extended-range document");
            }
        }
        None => debug!(area_code, "no extended-range document"),
    }

    city
}

/// First block whose first sub-area satisfies `pred`. Later blocks are not
/// looked at once one matches.
pub fn first_block_where<F>(document: &ForecastDocument, pred: F) -> Option<&TimeSeries>
where
    F: Fn(&SubArea) -> bool,
{
    document
        .time_series
        .iter()
        .find(|ts| ts.first_area().is_some_and(&pred))
}

/// First sub-area, across all blocks and all sub-areas in document order,
/// that carries a non-empty `temps` array.
pub fn first_area_with_temps(document: &ForecastDocument) -> Option<&SubArea> {
    document
        .time_series
        .iter()
        .flat_map(|ts| ts.areas.iter())
        .find(|area| !area.temps().is_empty())
}

/// Build the multi-day forecast from the extended-range document.
///
/// Days are taken from the weather-code block; temperatures are merged in by
/// date. Dates only the temperature block knows about are dropped, and a date
/// repeated in the weather-code block is emitted once per occurrence. Blank
/// values (JMA sends `""` for the first day's pop and reliability) are left
/// absent. Returns `None` when there is no weather-code block or it yields no
/// days.
pub fn weekly_forecast(document: &ForecastDocument) -> Option<Vec<WeeklyWeather>> {
    let weather_block = first_block_where(document, |a| !a.weather_codes().is_empty())?;
    let temp_block = first_block_where(document, |a| !a.temps_min().is_empty());

    let mut by_date: HashMap<&str, WeeklyWeather> = HashMap::new();

    if let Some(area) = weather_block.first_area() {
        for (i, stamp) in weather_block.time_defines.iter().enumerate() {
            let date = date_key(stamp);
            let entry = by_date.entry(date).or_insert_with(|| WeeklyWeather::new(date));
            entry.weather_code = non_empty(area.weather_codes(), i);
            entry.pop = non_empty(area.pops(), i);
            entry.reliability = non_empty(area.reliabilities(), i);
        }
    }

    if let Some((block, area)) = temp_block.and_then(|b| b.first_area().map(|a| (b, a))) {
        for (i, stamp) in block.time_defines.iter().enumerate() {
            let date = date_key(stamp);
            let entry = by_date.entry(date).or_insert_with(|| WeeklyWeather::new(date));
            entry.temp_min = non_empty(area.temps_min(), i);
            entry.temp_max = non_empty(area.temps_max(), i);
        }
    }

    let days: Vec<WeeklyWeather> = weather_block
        .time_defines
        .iter()
        .filter_map(|stamp| by_date.get(date_key(stamp)).cloned())
        .collect();

    (!days.is_empty()).then_some(days)
}

fn non_empty(values: &[String], i: usize) -> Option<String> {
    values.get(i).filter(|v| !v.is_empty()).cloned()
}

/// `YYYY-MM-DD` part of a `timeDefines` timestamp.
fn date_key(stamp: &str) -> &str {
    stamp.get(..10).unwrap_or(stamp)
}
