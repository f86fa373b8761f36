//! Lookup tables keyed by WMO weather interpretation codes.
//!
//! Open-Meteo reports conditions as WMO codes (0, 1, 2, 3, 45, 48, 51, ...).
//! Every table here has a default arm, so codes outside the known set are
//! never an error.

/// Human-readable description of a weather code.
pub fn description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Material Symbols icon name for a weather code.
pub fn icon(code: i32, is_day: bool) -> &'static str {
    match code {
        0 if is_day => "sunny",
        0 => "clear_night",
        1 | 2 if is_day => "partly_cloudy_day",
        1 | 2 => "partly_cloudy_night",
        3 => "cloudy",
        45 | 48 => "foggy",
        51 | 53 | 55 | 61 | 63 | 65 | 80 | 81 | 82 => "rainy",
        71 | 73 | 75 | 77 | 85 | 86 => "snowing",
        95 | 96 | 99 => "thunderstorm",
        _ => "cloud",
    }
}

/// How strongly the current conditions concentrate (> 1.0) or wash out
/// (< 1.0) pollutants. Used by the AQI estimator.
pub fn pollution_multiplier(code: i32) -> f64 {
    match code {
        // clear skies trap pollutants
        0 => 1.1,
        1 | 2 => 1.0,
        3 => 0.9,
        45 | 48 => 1.3,
        51 | 53 | 55 | 61 | 63 | 65 => 0.7,
        71 | 73 | 75 => 0.6,
        95 | 96 | 99 => 0.8,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_CODES: [i32; 24] = [
        0, 1, 2, 3, 45, 48, 51, 53, 55, 61, 63, 65, 71, 73, 75, 77, 80, 81, 82, 85, 86, 95, 96, 99,
    ];

    #[test]
    fn every_known_code_has_a_description() {
        for code in KNOWN_CODES {
            assert_ne!(description(code), "Unknown", "code {code} should be described");
        }
    }

    #[test]
    fn unknown_code_falls_back() {
        assert_eq!(description(999), "Unknown");
        assert_eq!(icon(999, true), "cloud");
        assert_eq!(icon(-1, false), "cloud");
        assert_eq!(pollution_multiplier(999), 1.0);
    }

    #[test]
    fn icon_depends_on_daylight_only_for_clear_codes() {
        assert_eq!(icon(0, true), "sunny");
        assert_eq!(icon(0, false), "clear_night");
        assert_eq!(icon(2, true), "partly_cloudy_day");
        assert_eq!(icon(1, false), "partly_cloudy_night");
        assert_eq!(icon(3, true), icon(3, false));
        assert_eq!(icon(65, false), "rainy");
        assert_eq!(icon(86, true), "snowing");
        assert_eq!(icon(96, true), "thunderstorm");
    }

    #[test]
    fn pollution_multiplier_table() {
        assert_eq!(pollution_multiplier(0), 1.1);
        assert_eq!(pollution_multiplier(1), 1.0);
        assert_eq!(pollution_multiplier(3), 0.9);
        assert_eq!(pollution_multiplier(48), 1.3);
        assert_eq!(pollution_multiplier(55), 0.7);
        assert_eq!(pollution_multiplier(75), 0.6);
        assert_eq!(pollution_multiplier(99), 0.8);
        // known codes without an adjustment stay neutral
        assert_eq!(pollution_multiplier(77), 1.0);
        assert_eq!(pollution_multiplier(82), 1.0);
        assert_eq!(pollution_multiplier(86), 1.0);
    }
}
