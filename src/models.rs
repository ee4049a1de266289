// API data models
// Wire shapes follow the hydrology open-data API verbatim, mixed casing
// and all

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

// ==================================================================================================
// Administrative divisions and basins
// ==================================================================================================

/// County code entry from `adminDivisions/county`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyInfo {
    pub county_code: String,
    pub county_name: String,
}

/// Town code entry from `adminDivisions/town`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TownInfo {
    /// Code of the county the town belongs to
    pub county_code: String,
    pub county_name: String,
    pub town_code: String,
    pub town_name: String,
}

/// River-basin code entry from `river/basins`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BasinInfo {
    pub code: String,
    pub name: String,
}

// ==================================================================================================
// Measurements
// ==================================================================================================

/// Measured physical quantity attached to a station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "IoWPhysicalQuantityId")]
    pub iow_physical_quantity_id: Uuid,

    /// Observation time
    #[serde(rename = "TimeStamp")]
    pub time_stamp: DateTime<FixedOffset>,

    #[serde(rename = "Name")]
    pub name: String,

    /// SI unit of the value
    #[serde(rename = "SIUnit")]
    pub si_unit: String,

    #[serde(rename = "Value")]
    pub value: MeasurementValue,
}

/// Measurement value: most quantities are plain numbers, a few stations
/// report structured JSON payloads instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Numeric(f64),
    Structured(Value),
}

impl Serialize for MeasurementValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Numeric values are rounded to 4 decimal places on output only;
            // the deserialized value keeps full precision
            MeasurementValue::Numeric(v) => {
                serializer.serialize_f64((v * 10_000.0).round() / 10_000.0)
            }
            MeasurementValue::Structured(v) => v.serialize(serializer),
        }
    }
}

// ==================================================================================================
// Stations
// ==================================================================================================

/// Station kind reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StationType {
    Uswg,
    River,
    Precipitation,
    #[default]
    Other,
}

/// Fields shared by every monitoring station
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StationInfo {
    /// Water-resource IoT platform station id
    #[serde(rename = "IoWStationId")]
    pub iow_station_id: Uuid,

    /// Station id assigned by the managing agency
    pub station_id: String,

    pub name: String,
    pub county_code: String,
    pub county_name: String,
    pub town_code: String,
    pub town_name: String,

    /// WGS84
    pub latitude: f64,

    /// WGS84; field name typo comes from the upstream API
    #[serde(rename = "Longtiude")]
    pub longitude: f64,

    /// Managing agency name
    pub admin_name: String,

    #[serde(default)]
    pub measurements: Vec<Measurement>,

    #[serde(default)]
    pub station_type: StationType,
}

/// River or regional-drainage water-level station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverStationInfo {
    #[serde(flatten)]
    pub station: StationInfo,

    #[serde(rename = "BasinCode")]
    pub basin_code: i32,

    #[serde(rename = "BasinName")]
    pub basin_name: String,
}

/// Urban flood-sensing (USWG) station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UswgStationInfo {
    #[serde(flatten)]
    pub station: StationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_value_is_rounded_on_output() {
        let value = MeasurementValue::Numeric(1.234_567_89);
        assert_eq!(serde_json::to_string(&value).unwrap(), "1.2346");

        // Full precision survives deserialization
        let parsed: MeasurementValue = serde_json::from_str("1.23456789").unwrap();
        assert_eq!(parsed, MeasurementValue::Numeric(1.234_567_89));
    }

    #[test]
    fn test_structured_value_passes_through() {
        let raw = json!({"level": 1.23456789, "unit": "m"});
        let value: MeasurementValue = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(value, MeasurementValue::Structured(raw.clone()));

        // No rounding inside structured payloads
        let out: Value = serde_json::from_str(&serde_json::to_string(&value).unwrap()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_county_and_town_wire_names_are_camel_case() {
        let county: CountyInfo =
            serde_json::from_str(r#"{"countyCode":"64","countyName":"Kaohsiung"}"#).unwrap();
        assert_eq!(county.county_code, "64");

        let town: TownInfo = serde_json::from_str(
            r#"{"countyCode":"64","countyName":"Kaohsiung","townCode":"6401","townName":"Zuoying"}"#,
        )
        .unwrap();
        assert_eq!(town.town_code, "6401");
    }

    #[test]
    fn test_basin_wire_names_are_pascal_case() {
        let basin: BasinInfo =
            serde_json::from_str(r#"{"Code":"165000","Name":"Yanshui River"}"#).unwrap();
        assert_eq!(basin.code, "165000");
        assert_eq!(basin.name, "Yanshui River");
    }

    #[test]
    fn test_river_station_deserializes_with_flattened_base() {
        let raw = json!({
            "IoWStationId": "0d9d4bb1-9a0a-4ba5-9041-7e99f9f76a23",
            "StationId": "1650H021",
            "Name": "Yanshui bridge",
            "CountyCode": "67",
            "CountyName": "Tainan",
            "TownCode": "6701",
            "TownName": "Sinshih",
            "Latitude": 23.003868,
            "Longtiude": 120.226729,
            "AdminName": "WRA",
            "Measurements": [{
                "IoWPhysicalQuantityId": "56b2fd9a-07d0-47e8-9e3b-7b43a7f346bc",
                "TimeStamp": "2020-05-01T10:00:00+08:00",
                "Name": "water level",
                "SIUnit": "m",
                "Value": 12.5
            }],
            "StationType": "River",
            "BasinCode": 165000,
            "BasinName": "Yanshui River"
        });

        let station: RiverStationInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(station.basin_code, 165_000);
        assert_eq!(station.station.station_id, "1650H021");
        assert_eq!(station.station.station_type, StationType::River);
        assert_eq!(
            station.station.measurements[0].value,
            MeasurementValue::Numeric(12.5)
        );
    }

    #[test]
    fn test_station_type_defaults_when_absent() {
        let raw = json!({
            "IoWStationId": "0d9d4bb1-9a0a-4ba5-9041-7e99f9f76a23",
            "StationId": "A001",
            "Name": "somewhere",
            "CountyCode": "67",
            "CountyName": "Tainan",
            "TownCode": "6701",
            "TownName": "Sinshih",
            "Latitude": 23.0,
            "Longtiude": 120.2,
            "AdminName": "WRA"
        });

        let station: UswgStationInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(station.station.station_type, StationType::Other);
        assert!(station.station.measurements.is_empty());
    }
}
