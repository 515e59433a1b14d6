use platform_host::HttpRequest;
use serde::Deserialize;
use terminal_contract::{CommandError, CommandResult};
use terminal_core::CommandContext;

use super::{bound, fetch_json, registration, report_failure, usage_error};
use crate::{CommandRegistration, TerminalServices};

const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![registration(
        "weather",
        "Show current weather",
        "weather [location] | weather set \"location\" | weather default",
        bound(services, weather),
    )]
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Option<Vec<GeocodePlace>>,
}

#[derive(Debug, Deserialize)]
struct GeocodePlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl GeocodePlace {
    fn label(&self) -> String {
        [&self.name, &self.admin1, &self.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
    #[serde(default)]
    current_units: CurrentUnits,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    time: String,
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    weather_code: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentUnits {
    temperature_2m: Option<String>,
    relative_humidity_2m: Option<String>,
    wind_speed_10m: Option<String>,
}

/// Current conditions resolved for one place.
#[derive(Debug, PartialEq)]
struct Report {
    place: String,
    time: String,
    summary: String,
}

/// Describes a WMO weather interpretation code.
fn describe_wmo(code: i64) -> String {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        other => return format!("Weather code {other}"),
    };
    text.to_string()
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), |value| value.to_string())
}

async fn weather(context: CommandContext, services: TerminalServices) -> CommandResult {
    match context.arg(0).map(str::to_lowercase).as_deref() {
        Some("default") => {
            let location = services.default_location().await;
            context.muted(format!("Default location: {location}"));
            return Ok(());
        }
        Some("set") => {
            let location = context.args[1..].join(" ").trim().to_string();
            if location.is_empty() {
                return Err(usage_error("weather set \"London\""));
            }
            if let Err(err) = services.set_default_location(&location).await {
                log::warn!("weather location persist failed: {err}");
            }
            context.good(format!("Default location set: {location}"));
            return Ok(());
        }
        _ => {}
    }

    let mut location = context.args.join(" ").trim().to_string();
    if location.is_empty() {
        location = services.default_location().await;
    }
    context.muted(format!(
        "Fetching weather for: {location} ... (Ctrl+C to abort)"
    ));
    match fetch_report(&context, &services, &location).await {
        Ok(report) => {
            context.muted(format!("{} @ {}", report.place, report.time));
            context.good(report.summary);
            Ok(())
        }
        Err(err) => report_failure(
            &context,
            err,
            "Weather unavailable (network or location).",
        ),
    }
}

async fn fetch_report(
    context: &CommandContext,
    services: &TerminalServices,
    location: &str,
) -> CommandResult<Report> {
    let geocode_url = format!(
        "{GEOCODE_URL}?name={}&count=1&language=en&format=json",
        urlencoding::encode(location)
    );
    let geocode: GeocodeResponse =
        fetch_json(context, services, HttpRequest::get(geocode_url).no_store(), None).await?;
    let place = geocode
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| CommandError::failed("location not found"))?;
    let (Some(latitude), Some(longitude)) = (place.latitude, place.longitude) else {
        return Err(CommandError::failed("location not found"));
    };

    let forecast_url = format!(
        "{FORECAST_URL}?latitude={latitude}&longitude={longitude}\
         &current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m&timezone=auto"
    );
    let forecast: ForecastResponse =
        fetch_json(context, services, HttpRequest::get(forecast_url).no_store(), None).await?;
    let current = forecast
        .current
        .ok_or_else(|| CommandError::failed("weather data unavailable"))?;
    let units = forecast.current_units;

    let summary = format!(
        "{} • {}{} • Humidity {}{} • Wind {}{}",
        current
            .weather_code
            .map_or_else(|| "Weather code ?".to_string(), describe_wmo),
        reading(current.temperature_2m),
        units.temperature_2m.as_deref().unwrap_or("°C"),
        reading(current.relative_humidity_2m),
        units.relative_humidity_2m.as_deref().unwrap_or("%"),
        reading(current.wind_speed_10m),
        units.wind_speed_10m.as_deref().unwrap_or("km/h"),
    );
    Ok(Report {
        place: place.label(),
        time: current.time,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use platform_host::HttpResponse;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::fixture::Fixture;

    const GEOCODE_BODY: &str = r#"{"results":[{"name":"Tokyo","admin1":"Tokyo",
        "country":"Japan","latitude":35.6895,"longitude":139.69171}]}"#;
    const FORECAST_BODY: &str = r#"{"current_units":{"temperature_2m":"°C",
        "relative_humidity_2m":"%","wind_speed_10m":"km/h"},
        "current":{"time":"2024-05-01T12:00","temperature_2m":21.5,
        "relative_humidity_2m":60,"weather_code":2,"wind_speed_10m":11.2}}"#;

    #[test]
    fn wmo_codes_have_descriptions() {
        assert_eq!(describe_wmo(0), "Clear sky");
        assert_eq!(describe_wmo(96), "Thunderstorm with slight hail");
        assert_eq!(describe_wmo(42), "Weather code 42");
    }

    #[test]
    fn reports_conditions_for_the_default_location() {
        let fixture = Fixture::new();
        fixture.run("weather set Tokyo");
        fixture
            .http
            .respond(GEOCODE_URL, HttpResponse::ok_text(GEOCODE_BODY));
        fixture
            .http
            .respond(FORECAST_URL, HttpResponse::ok_text(FORECAST_BODY));

        assert_eq!(
            fixture.run("weather"),
            vec![
                "$ weather",
                "Fetching weather for: Tokyo ... (Ctrl+C to abort)",
                "Tokyo, Tokyo, Japan @ 2024-05-01T12:00",
                "Partly cloudy • 21.5°C • Humidity 60% • Wind 11.2km/h",
            ]
        );
        let requests = fixture.http.requests();
        assert_eq!(
            requests[0].url,
            "https://geocoding-api.open-meteo.com/v1/search?name=Tokyo&count=1&language=en&format=json"
        );
        assert!(requests[1].url.contains("latitude=35.6895&longitude=139.69171"));
    }

    #[test]
    fn missing_place_reports_unavailable() {
        let fixture = Fixture::new();
        fixture
            .http
            .respond(GEOCODE_URL, HttpResponse::ok_text(r#"{"results":[]}"#));
        assert_eq!(
            fixture.run("weather Atlantis"),
            vec![
                "$ weather Atlantis",
                "Fetching weather for: Atlantis ... (Ctrl+C to abort)",
                "Weather unavailable (network or location).",
            ]
        );
    }

    #[test]
    fn default_subcommand_reads_persisted_location() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.run("weather default"),
            vec!["$ weather default", "Default location: Asia"]
        );
        assert_eq!(
            fixture.run("weather set \"New York\""),
            vec!["$ weather set \"New York\"", "Default location set: New York"]
        );
        assert_eq!(
            fixture.prefs.raw("portfolio.terminal.weather.location").as_deref(),
            Some("New York")
        );
    }
}
