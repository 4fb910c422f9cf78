//! Closed enumeration of weather condition identifiers.
//!
//! Upstream forecast feeds report conditions as short categorical strings
//! (`"sunny"`, `"lightning-rainy"`, ...). Anything outside the known set maps
//! to `Unknown`, never a missing value, so the presentation adapter always
//! has a glyph to fall back on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCondition {
    ClearNight,
    Cloudy,
    Exceptional,
    Fog,
    Hail,
    Lightning,
    LightningRainy,
    // The one identifier upstream spells without a separator.
    #[serde(rename = "partlycloudy")]
    PartlyCloudy,
    Pouring,
    Rainy,
    Snowy,
    SnowyRainy,
    Sunny,
    Windy,
    WindyVariant,
    #[serde(other)]
    Unknown,
}

impl WeatherCondition {
    /// Parse a wire identifier. Unrecognized input becomes `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "clear-night" => WeatherCondition::ClearNight,
            "cloudy" => WeatherCondition::Cloudy,
            "exceptional" => WeatherCondition::Exceptional,
            "fog" => WeatherCondition::Fog,
            "hail" => WeatherCondition::Hail,
            "lightning" => WeatherCondition::Lightning,
            "lightning-rainy" => WeatherCondition::LightningRainy,
            "partlycloudy" => WeatherCondition::PartlyCloudy,
            "pouring" => WeatherCondition::Pouring,
            "rainy" => WeatherCondition::Rainy,
            "snowy" => WeatherCondition::Snowy,
            "snowy-rainy" => WeatherCondition::SnowyRainy,
            "sunny" => WeatherCondition::Sunny,
            "windy" => WeatherCondition::Windy,
            "windy-variant" => WeatherCondition::WindyVariant,
            _ => WeatherCondition::Unknown,
        }
    }

    /// The wire identifier this condition serializes to.
    pub fn identifier(&self) -> &'static str {
        match self {
            WeatherCondition::ClearNight => "clear-night",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Exceptional => "exceptional",
            WeatherCondition::Fog => "fog",
            WeatherCondition::Hail => "hail",
            WeatherCondition::Lightning => "lightning",
            WeatherCondition::LightningRainy => "lightning-rainy",
            WeatherCondition::PartlyCloudy => "partlycloudy",
            WeatherCondition::Pouring => "pouring",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Snowy => "snowy",
            WeatherCondition::SnowyRainy => "snowy-rainy",
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Windy => "windy",
            WeatherCondition::WindyVariant => "windy-variant",
            WeatherCondition::Unknown => "unknown",
        }
    }

    /// Condition used for the glyph in the compact hourly/daily forecast
    /// strips, where the partly-cloudy glyph is too busy at small sizes.
    /// The full-size current-conditions panel keeps the original condition.
    pub fn forecast_icon(self) -> Self {
        match self {
            WeatherCondition::PartlyCloudy => WeatherCondition::Cloudy,
            other => other,
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for WeatherCondition {
    fn default() -> Self {
        WeatherCondition::Unknown
    }
}
