use serde::{Deserialize, Deserializer, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Byte order used to pack a signal into its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Endianness {
    #[default]
    Little = 0,
    Big = 1,
}

impl Endianness {
    pub fn display_name(&self) -> &'static str {
        match self {
            Endianness::Little => "Intel",
            Endianness::Big => "Motorola",
        }
    }
}

/// Multiplexing role of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum MuxType {
    #[default]
    None = 0,
    /// Selects which multiplexed signals are present
    Switch = 1,
    /// Present only when the switch carries `mux_value`
    Signal = 2,
}

/// Value type of an attribute definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum AttributeDataType {
    #[default]
    Int = 0,
    Float = 1,
    String = 2,
    Enum = 3,
}

/// Treat an explicit `null` like a missing field. The backend encodes empty
/// lists and maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A CAN node (ECU)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
}

/// Bus bit timing declaration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaudRate {
    pub rate: u32,
}

/// Named mapping from raw values to labels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueTable {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: BTreeMap<i64, String>,
}

/// A signal packed inside a message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Signal {
    pub name: String,
    pub start_bit: u32,
    pub length: u32,
    pub endianness: Endianness,
    pub is_signed: bool,
    pub factor: f64,
    pub offset: f64,
    #[serde(rename = "min")]
    pub minimum: f64,
    #[serde(rename = "max")]
    pub maximum: f64,
    pub unit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receivers: Vec<String>,
    pub mux_type: MuxType,
    pub mux_value: u32,
    pub comment: String,
}

impl Signal {
    /// Multiplexer marker as written in DBC notation ("M", "m3" or empty)
    pub fn mux_marker(&self) -> String {
        match self.mux_type {
            MuxType::None => String::new(),
            MuxType::Switch => "M".to_string(),
            MuxType::Signal => format!("m{}", self.mux_value),
        }
    }
}

/// A CAN frame definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: u32,
    pub name: String,
    pub dlc: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub transmitters: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub signals: Vec<Signal>,
    pub comment: String,
}

/// Declares a named attribute and the objects it applies to
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeDefinition {
    pub name: String,
    pub data_type: AttributeDataType,
    /// Object keywords such as "BU_", "BO_", "SG_"
    #[serde(deserialize_with = "null_as_default")]
    pub applies_to: Vec<String>,
    pub default_value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enum_values: Vec<String>,
}

/// Assigns an attribute value to one object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeValue {
    pub object_type: String,
    pub object_name: String,
    pub attr_name: String,
    pub value: String,
}

/// Free-form text attached to an object, or to the whole file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub object_type: String,
    pub object_name: String,
    pub text: String,
}

/// Lines the backend kept verbatim
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSection {
    pub keyword: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lines: Vec<String>,
}

/// One loaded DBC file.
///
/// `filename` is the document's identity inside a session; two documents with
/// the same filename are never registered at once.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDocument {
    pub version: String,
    pub created_on: Option<String>,
    pub author: String,
    pub license: String,
    pub filename: String,

    #[serde(deserialize_with = "null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(deserialize_with = "null_as_default")]
    pub baud_rates: Vec<BaudRate>,
    #[serde(deserialize_with = "null_as_default")]
    pub value_tables: Vec<ValueTable>,

    #[serde(deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    #[serde(deserialize_with = "null_as_default")]
    pub attributes: Vec<AttributeDefinition>,
    #[serde(deserialize_with = "null_as_default")]
    pub attr_values: Vec<AttributeValue>,

    #[serde(deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
    #[serde(deserialize_with = "null_as_default")]
    pub raw_sections: Vec<RawSection>,
}

impl FileDocument {
    /// Create an empty document identified by `filename`
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Final path component of the filename, for tab labels
    pub fn title(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.filename)
            .to_string()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Total number of signals across all messages
    pub fn signal_count(&self) -> usize {
        self.messages.iter().map(|m| m.signals.len()).sum()
    }

    /// Summary fields used by tab labels and the status bar
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            filename: self.filename.clone(),
            title: self.title(),
            version: self.version.clone(),
            author: self.author.clone(),
            node_count: self.nodes.len(),
            baud_rate_count: self.baud_rates.len(),
            message_count: self.message_count(),
            signal_count: self.signal_count(),
            value_table_count: self.value_tables.len(),
            attribute_def_count: self.attributes.len(),
            attribute_value_count: self.attr_values.len(),
            comment_count: self.comments.len(),
        }
    }
}

/// Counts and metadata of a document, cheap to clone into snapshots
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSummary {
    pub filename: String,
    pub title: String,
    pub version: String,
    pub author: String,
    pub node_count: usize,
    pub baud_rate_count: usize,
    pub message_count: usize,
    pub signal_count: usize,
    pub value_table_count: usize,
    pub attribute_def_count: usize,
    pub attribute_value_count: usize,
    pub comment_count: usize,
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parsed DBC: {}", self.filename)?;
        writeln!(f, "  version={:?}, author={:?}", self.version, self.author)?;
        writeln!(f, "  Nodes:        {}", self.node_count)?;
        writeln!(f, "  BaudRates:    {}", self.baud_rate_count)?;
        writeln!(f, "  Messages:     {}", self.message_count)?;
        writeln!(f, "    └─ Signals: {}", self.signal_count)?;
        writeln!(f, "  ValueTables:  {}", self.value_table_count)?;
        writeln!(
            f,
            "  Attributes:   {} defs, {} values",
            self.attribute_def_count, self.attribute_value_count
        )?;
        write!(f, "  Comments:     {}", self.comment_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileDocument {
        let mut doc = FileDocument::new("/tmp/bus/powertrain.dbc");
        doc.nodes.push(Node {
            name: "ECU1".to_string(),
        });
        doc.messages.push(Message {
            id: 100,
            name: "EngineData".to_string(),
            dlc: 8,
            transmitters: vec!["ECU1".to_string()],
            signals: vec![
                Signal {
                    name: "Rpm".to_string(),
                    length: 16,
                    factor: 0.25,
                    ..Signal::default()
                },
                Signal {
                    name: "Mode".to_string(),
                    mux_type: MuxType::Switch,
                    ..Signal::default()
                },
            ],
            comment: String::new(),
        });
        doc.messages.push(Message {
            id: 200,
            name: "Status".to_string(),
            ..Message::default()
        });
        doc
    }

    #[test]
    fn test_title_is_final_path_component() {
        assert_eq!(sample().title(), "powertrain.dbc");
        assert_eq!(FileDocument::new("bus1.dbc").title(), "bus1.dbc");
    }

    #[test]
    fn test_counts() {
        let doc = sample();
        assert_eq!(doc.message_count(), 2);
        assert_eq!(doc.signal_count(), 2);

        let summary = doc.summary();
        assert_eq!(summary.node_count, 1);
        assert_eq!(summary.title, "powertrain.dbc");
    }

    #[test]
    fn test_summary_display() {
        let text = sample().summary().to_string();
        assert!(text.starts_with("Parsed DBC: /tmp/bus/powertrain.dbc"));
        assert!(text.contains("Messages:     2"));
        assert!(text.contains("└─ Signals: 2"));
    }

    #[test]
    fn test_mux_marker() {
        let mut sig = Signal::default();
        assert_eq!(sig.mux_marker(), "");
        sig.mux_type = MuxType::Switch;
        assert_eq!(sig.mux_marker(), "M");
        sig.mux_type = MuxType::Signal;
        sig.mux_value = 3;
        assert_eq!(sig.mux_marker(), "m3");
    }

    #[test]
    fn test_decode_sparse_json() {
        let json = r#"{
            "filename": "a.dbc",
            "messages": [
                { "id": 1, "name": "M1", "dlc": 8,
                  "signals": [ { "name": "S1", "endianness": 1, "min": -1.0, "max": 1.0 } ] }
            ]
        }"#;
        let doc: FileDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.filename, "a.dbc");
        assert!(doc.nodes.is_empty());
        let sig = &doc.messages[0].signals[0];
        assert_eq!(sig.endianness, Endianness::Big);
        assert_eq!(sig.minimum, -1.0);
        assert_eq!(sig.mux_type, MuxType::None);
    }

    #[test]
    fn test_decode_backend_shape_with_nulls() {
        // Empty slices arrive as null and enums as integers
        let json = r#"{
            "version": "",
            "created_on": "0001-01-01T00:00:00Z",
            "author": "",
            "license": "",
            "filename": "/can/body.dbc",
            "nodes": null,
            "baud_rates": null,
            "value_tables": [ { "name": "Gear", "values": { "0": "P", "1": "R" } } ],
            "messages": [
                { "id": 291, "name": "Body", "dlc": 8, "transmitters": null,
                  "signals": [
                    { "name": "Door", "start_bit": 7, "length": 1, "endianness": 1,
                      "is_signed": false, "factor": 1, "offset": 0, "min": 0, "max": 1,
                      "unit": "", "receivers": null, "mux_type": 2, "mux_value": 4,
                      "comment": "" }
                  ],
                  "comment": "" }
            ],
            "attributes": [
                { "name": "GenMsgCycleTime", "data_type": 0, "applies_to": ["BO_"],
                  "default_value": "100", "enum_values": null }
            ],
            "attr_values": null,
            "comments": null,
            "raw_sections": [ { "keyword": "NS_", "lines": null } ]
        }"#;

        let doc: FileDocument = serde_json::from_str(json).unwrap();

        assert!(doc.nodes.is_empty());
        assert!(doc.comments.is_empty());
        assert_eq!(doc.value_tables[0].values.get(&1).map(String::as_str), Some("R"));
        let msg = &doc.messages[0];
        assert!(msg.transmitters.is_empty());
        let sig = &msg.signals[0];
        assert_eq!(sig.endianness, Endianness::Big);
        assert_eq!(sig.mux_type, MuxType::Signal);
        assert_eq!(sig.mux_marker(), "m4");
        assert_eq!(doc.attributes[0].data_type, AttributeDataType::Int);
        assert!(doc.raw_sections[0].lines.is_empty());
    }

    #[test]
    fn test_enums_encode_as_integers() {
        let sig = Signal {
            endianness: Endianness::Big,
            mux_type: MuxType::Switch,
            ..Signal::default()
        };
        let value = serde_json::to_value(&sig).unwrap();
        assert_eq!(value["endianness"], 1);
        assert_eq!(value["mux_type"], 1);
    }
}
