//! Typed view of the Wiener Linien `monitor` response.
//!
//! Only the fields the flattener reads are modelled; everything else in the
//! payload (traffic info, coordinates, vehicle details) is ignored.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorResponse {
    pub message: Message,
    pub data: MonitorData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub server_time: String,
    pub value: Option<String>,
    pub message_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorData {
    pub monitors: Vec<Monitor>,
}

/// One stop's real-time entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub location_stop: LocationStop,
    /// Only the first entry of `lines` is typed; the rest are skipped.
    #[serde(rename = "lines", default, deserialize_with = "first_element")]
    pub first_line: Option<Line>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationStop {
    pub properties: StopProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopProperties {
    pub title: String,
    pub attributes: StopAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopAttributes {
    pub rbl: Identifier,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub line_id: Identifier,
    pub richtungs_id: Identifier,
    #[serde(default)]
    pub departures: Departures,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Departures {
    /// Only the first entry of `departure` is typed; the rest are skipped.
    #[serde(rename = "departure", default, deserialize_with = "first_element")]
    pub next: Option<Departure>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub departure_time: DepartureTime,
}

/// Either time may be missing or `null`: no schedule, or no live estimate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureTime {
    #[serde(default)]
    pub time_planned: Option<String>,
    #[serde(default)]
    pub time_real: Option<String>,
}

impl Monitor {
    /// The next departure at this stop: first line, first departure.
    pub fn next_departure(&self) -> Option<(&Line, &Departure)> {
        let line = self.first_line.as_ref()?;
        let departure = line.departures.next.as_ref()?;
        Some((line, departure))
    }
}

/// Deserializes a JSON array into its first element, discarding the others
/// unread so their shape never matters.
fn first_element<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct FirstVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for FirstVisitor<T> {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let first = seq.next_element()?;
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(first)
        }
    }

    deserializer.deserialize_seq(FirstVisitor(PhantomData))
}

/// An identifier the provider sends either as a JSON string or an integer.
///
/// Stored in canonical text form so `4` and `"4"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Identifier(n.to_string()),
            Raw::Text(s) => Identifier(s),
        })
    }
}
