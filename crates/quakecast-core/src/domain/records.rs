use std::fmt::{Display, Formatter};

use quakecast_store::{SeismicRow, TableRow, WeatherRow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::domain::{RecordDate, RecordId, RecordKind};
use crate::ValidationError;

/// A record type served by the gateway and persisted in one store table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    type Row: TableRow;

    /// Build a record from a caller-supplied JSON body. The identifier is
    /// checked before any other field.
    fn from_json(body: Value) -> Result<Self, ValidationError>;

    fn id(&self) -> &RecordId;

    /// Location text searched by collection lookups.
    fn location(&self) -> &str;

    fn to_row(&self) -> Self::Row;

    fn from_row(row: Self::Row) -> Result<Stored<Self>, ValidationError>;
}

/// A record as held by the store, with its storage identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stored<R> {
    #[serde(rename = "_id")]
    pub storage_id: String,
    #[serde(flatten)]
    pub record: R,
}

/// Seismic event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeismicEventPayload")]
pub struct SeismicEvent {
    id: RecordId,
    magnitude: f64,
    depth: f64,
    location: String,
    date: RecordDate,
}

impl SeismicEvent {
    pub fn new(
        id: RecordId,
        magnitude: f64,
        depth: f64,
        location: impl Into<String>,
        date: RecordDate,
    ) -> Result<Self, ValidationError> {
        if id.kind() != RecordKind::Seismic {
            return Err(ValidationError::invalid_id(RecordKind::Seismic));
        }
        validate_non_negative("magnitude", magnitude)?;
        validate_non_negative("depth", depth)?;
        let location = non_empty("location", location.into())?;

        Ok(Self {
            id,
            magnitude,
            depth,
            location,
            date,
        })
    }

    pub const fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub const fn depth(&self) -> f64 {
        self.depth
    }

    pub const fn date(&self) -> RecordDate {
        self.date
    }
}

impl Record for SeismicEvent {
    const KIND: RecordKind = RecordKind::Seismic;

    type Row = SeismicRow;

    fn from_json(body: Value) -> Result<Self, ValidationError> {
        if !body.is_object() {
            return Err(ValidationError::BodyNotObject);
        }
        let payload: SeismicEventPayload =
            serde_json::from_value(body).map_err(|_| ValidationError::BodyNotObject)?;
        Self::try_from(payload)
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn to_row(&self) -> SeismicRow {
        SeismicRow {
            storage_id: String::new(),
            id: self.id.as_str().to_owned(),
            magnitude: self.magnitude,
            depth: self.depth,
            location: self.location.clone(),
            date: self.date.format_iso(),
        }
    }

    fn from_row(row: SeismicRow) -> Result<Stored<Self>, ValidationError> {
        let id = RecordId::parse(RecordKind::Seismic, &row.id)?;
        let date = RecordDate::parse(&row.date)?;
        let record = Self::new(id, row.magnitude, row.depth, row.location, date)?;
        Ok(Stored {
            storage_id: row.storage_id,
            record,
        })
    }
}

#[derive(Deserialize)]
struct SeismicEventPayload {
    id: Option<Value>,
    magnitude: Option<Value>,
    depth: Option<Value>,
    location: Option<Value>,
    date: Option<Value>,
}

impl TryFrom<SeismicEventPayload> for SeismicEvent {
    type Error = ValidationError;

    fn try_from(payload: SeismicEventPayload) -> Result<Self, Self::Error> {
        let id = identifier(RecordKind::Seismic, payload.id)?;
        let magnitude = number("magnitude", payload.magnitude)?;
        let depth = number("depth", payload.depth)?;
        let location = non_empty("location", text("location", payload.location)?)?;
        let date = RecordDate::parse(&text("date", payload.date)?)?;
        Self::new(id, magnitude, depth, location, date)
    }
}

/// Sky condition reported by a weather observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Soleado,
    Nublado,
    Lluvioso,
    Tormenta,
}

impl Condition {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input {
            "Soleado" => Ok(Self::Soleado),
            "Nublado" => Ok(Self::Nublado),
            "Lluvioso" => Ok(Self::Lluvioso),
            "Tormenta" => Ok(Self::Tormenta),
            other => Err(ValidationError::InvalidCondition {
                value: other.to_owned(),
            }),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Soleado => "Soleado",
            Self::Nublado => "Nublado",
            Self::Lluvioso => "Lluvioso",
            Self::Tormenta => "Tormenta",
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Weather observation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeatherObservationPayload")]
pub struct WeatherObservation {
    id: RecordId,
    city: String,
    temperature: f64,
    humidity: f64,
    condition: Condition,
}

impl WeatherObservation {
    pub fn new(
        id: RecordId,
        city: impl Into<String>,
        temperature: f64,
        humidity: f64,
        condition: Condition,
    ) -> Result<Self, ValidationError> {
        if id.kind() != RecordKind::Weather {
            return Err(ValidationError::invalid_id(RecordKind::Weather));
        }
        if !temperature.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "temperature",
            });
        }
        validate_non_negative("humidity", humidity)?;
        let city = non_empty("city", city.into())?;

        Ok(Self {
            id,
            city,
            temperature,
            humidity,
            condition,
        })
    }

    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    pub const fn humidity(&self) -> f64 {
        self.humidity
    }

    pub const fn condition(&self) -> Condition {
        self.condition
    }
}

impl Record for WeatherObservation {
    const KIND: RecordKind = RecordKind::Weather;

    type Row = WeatherRow;

    fn from_json(body: Value) -> Result<Self, ValidationError> {
        if !body.is_object() {
            return Err(ValidationError::BodyNotObject);
        }
        let payload: WeatherObservationPayload =
            serde_json::from_value(body).map_err(|_| ValidationError::BodyNotObject)?;
        Self::try_from(payload)
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn location(&self) -> &str {
        &self.city
    }

    fn to_row(&self) -> WeatherRow {
        WeatherRow {
            storage_id: String::new(),
            id: self.id.as_str().to_owned(),
            city: self.city.clone(),
            temperature: self.temperature,
            humidity: self.humidity,
            condition: self.condition.as_str().to_owned(),
        }
    }

    fn from_row(row: WeatherRow) -> Result<Stored<Self>, ValidationError> {
        let id = RecordId::parse(RecordKind::Weather, &row.id)?;
        let condition = Condition::parse(&row.condition)?;
        let record = Self::new(id, row.city, row.temperature, row.humidity, condition)?;
        Ok(Stored {
            storage_id: row.storage_id,
            record,
        })
    }
}

#[derive(Deserialize)]
struct WeatherObservationPayload {
    id: Option<Value>,
    city: Option<Value>,
    temperature: Option<Value>,
    humidity: Option<Value>,
    condition: Option<Value>,
}

impl TryFrom<WeatherObservationPayload> for WeatherObservation {
    type Error = ValidationError;

    fn try_from(payload: WeatherObservationPayload) -> Result<Self, Self::Error> {
        let id = identifier(RecordKind::Weather, payload.id)?;
        let city = non_empty("city", text("city", payload.city)?)?;
        let temperature = number("temperature", payload.temperature)?;
        let humidity = number("humidity", payload.humidity)?;
        let condition = Condition::parse(&text("condition", payload.condition)?)?;
        Self::new(id, city, temperature, humidity, condition)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

// A missing or non-string id is reported as a format error, like a malformed one.
fn identifier(kind: RecordKind, value: Option<Value>) -> Result<RecordId, ValidationError> {
    match value {
        Some(Value::String(id)) => RecordId::parse(kind, &id),
        _ => Err(ValidationError::invalid_id(kind)),
    }
}

fn number(field: &'static str, value: Option<Value>) -> Result<f64, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or(ValidationError::NonFiniteValue { field }),
        Some(_) => Err(ValidationError::InvalidFieldType {
            field,
            expected: "a number",
        }),
    }
}

fn text(field: &'static str, value: Option<Value>) -> Result<String, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field }),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(ValidationError::InvalidFieldType {
            field,
            expected: "a string",
        }),
    }
}

// Empty text counts as absent.
fn non_empty(field: &'static str, text: String) -> Result<String, ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(text)
}
