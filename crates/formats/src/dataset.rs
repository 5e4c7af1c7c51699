use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use foundation::ids::{FeatureId, VertexId};
use foundation::math::Vec2;
use foundation::time::{Year, YearRange};
use scene::feature::{FeatureSnapshot, PropertySnapshot};

/// World-level metadata persisted alongside the feature sections.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetadata {
    pub slider: YearRange,
    pub world_name: String,
    pub world_description: String,
}

impl Default for DatasetMetadata {
    fn default() -> Self {
        Self {
            slider: YearRange::default(),
            world_name: String::new(),
            world_description: String::new(),
        }
    }
}

/// The persisted dataset: three feature sections plus metadata.
///
/// The wire shape is fixed for compatibility:
/// `{"points": [...], "lines": [...], "polygons": [...], "metadata": {...}}`
/// with `vertexIds` / `points` / `properties` per feature and
/// `sliderMin` / `sliderMax` / `worldName` / `worldDescription` in metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub points: Vec<FeatureSnapshot>,
    pub lines: Vec<FeatureSnapshot>,
    pub polygons: Vec<FeatureSnapshot>,
    pub metadata: DatasetMetadata,
}

#[derive(Debug)]
pub enum DatasetError {
    Parse(String),
    NotAnObject,
    InvalidFeature {
        section: &'static str,
        index: usize,
        reason: String,
    },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Parse(msg) => write!(f, "JSON parse error: {msg}"),
            DatasetError::NotAnObject => write!(f, "expected a dataset object"),
            DatasetError::InvalidFeature {
                section,
                index,
                reason,
            } => {
                write!(f, "invalid feature in {section} at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

// Strict metadata envelope; every key is optional so sparse legacy files load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct MetadataWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slider_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slider_max: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    world_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    world_description: Option<String>,
}

impl Dataset {
    pub fn from_json_str(payload: &str) -> Result<Self, DatasetError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| DatasetError::Parse(e.to_string()))?;
        Self::from_json_value(value)
    }

    /// Tolerant decoder. Accepts legacy records: missing `vertexIds`
    /// (derived from `points` on load), point records carrying bare
    /// `x`/`y`, string or numeric ids, properties with missing or
    /// non-numeric years (kept, but undated). Malformed coordinates
    /// default to the origin rather than failing the load.
    pub fn from_json_value(value: Value) -> Result<Self, DatasetError> {
        let obj = value.as_object().ok_or(DatasetError::NotAnObject)?;

        let metadata = match obj.get("metadata") {
            Some(meta) => {
                let wire: MetadataWire = serde_json::from_value(meta.clone())
                    .map_err(|e| DatasetError::Parse(e.to_string()))?;
                let defaults = YearRange::default();
                DatasetMetadata {
                    slider: YearRange::new(
                        Year(wire.slider_min.unwrap_or(defaults.min.0)),
                        Year(wire.slider_max.unwrap_or(defaults.max.0)),
                    ),
                    world_name: wire.world_name.unwrap_or_default(),
                    world_description: wire.world_description.unwrap_or_default(),
                }
            }
            None => DatasetMetadata::default(),
        };

        Ok(Self {
            points: parse_section(obj, "points")?,
            lines: parse_section(obj, "lines")?,
            polygons: parse_section(obj, "polygons")?,
            metadata,
        })
    }

    /// Always emits the modern shape, `vertexIds` included.
    pub fn to_json_value(&self) -> Value {
        let mut root = Map::new();
        root.insert("points".to_string(), section_to_value(&self.points));
        root.insert("lines".to_string(), section_to_value(&self.lines));
        root.insert("polygons".to_string(), section_to_value(&self.polygons));

        let wire = MetadataWire {
            slider_min: Some(self.metadata.slider.min.0),
            slider_max: Some(self.metadata.slider.max.0),
            world_name: Some(self.metadata.world_name.clone()),
            world_description: Some(self.metadata.world_description.clone()),
        };
        root.insert(
            "metadata".to_string(),
            serde_json::to_value(wire).unwrap_or(Value::Null),
        );
        Value::Object(root)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_json_value())
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json_value())
    }
}

fn parse_section(
    obj: &Map<String, Value>,
    section: &'static str,
) -> Result<Vec<FeatureSnapshot>, DatasetError> {
    let Some(value) = obj.get(section) else {
        return Ok(Vec::new());
    };
    let Some(items) = value.as_array() else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let feature = parse_feature(item).map_err(|reason| DatasetError::InvalidFeature {
            section,
            index,
            reason,
        })?;
        out.push(feature);
    }
    Ok(out)
}

fn parse_feature(value: &Value) -> Result<FeatureSnapshot, String> {
    let obj = value.as_object().ok_or("feature must be an object")?;

    let id = match obj.get("id") {
        Some(Value::String(s)) => FeatureId::new(s.clone()),
        Some(Value::Number(n)) => FeatureId::new(n.to_string()),
        _ => return Err("feature missing id".to_string()),
    };

    let vertex_ids = match obj.get("vertexIds").and_then(|v| v.as_array()) {
        Some(ids) => ids.iter().filter_map(vertex_id_value).collect(),
        None => Vec::new(),
    };

    let mut points: Vec<Vec2> = match obj.get("points").and_then(|v| v.as_array()) {
        Some(items) => items.iter().map(parse_point).collect(),
        None => Vec::new(),
    };
    if points.is_empty() && vertex_ids.is_empty() {
        // Legacy point records carried bare x/y.
        if let (Some(x), Some(y)) = (
            obj.get("x").and_then(|v| v.as_f64()),
            obj.get("y").and_then(|v| v.as_f64()),
        ) {
            points.push(Vec2::new(x, y));
        }
    }

    let properties = match obj.get("properties").and_then(|v| v.as_array()) {
        Some(items) => items.iter().map(parse_property).collect(),
        None => Vec::new(),
    };

    Ok(FeatureSnapshot {
        id,
        vertex_ids,
        points,
        properties,
    })
}

fn vertex_id_value(value: &Value) -> Option<VertexId> {
    match value {
        Value::String(s) => Some(VertexId::new(s.clone())),
        Value::Number(n) => Some(VertexId::new(n.to_string())),
        _ => None,
    }
}

fn parse_point(value: &Value) -> Vec2 {
    let Some(obj) = value.as_object() else {
        return Vec2::ZERO;
    };
    Vec2::new(
        obj.get("x").and_then(|v| v.as_f64()).unwrap_or(0.0),
        obj.get("y").and_then(|v| v.as_f64()).unwrap_or(0.0),
    )
}

fn parse_property(value: &Value) -> PropertySnapshot {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return undated_property(),
    };
    let year = obj.get("year").and_then(parse_year);
    PropertySnapshot {
        year,
        name: obj
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        description: obj
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    }
}

fn parse_year(value: &Value) -> Option<Year> {
    if let Some(n) = value.as_i64() {
        return Some(Year(n as i32));
    }
    // Tolerate fractional years by truncation; reject NaN/inf/non-numbers.
    match value.as_f64() {
        Some(f) if f.is_finite() => Some(Year(f as i32)),
        _ => None,
    }
}

fn undated_property() -> PropertySnapshot {
    PropertySnapshot {
        year: None,
        name: String::new(),
        description: String::new(),
    }
}

fn section_to_value(features: &[FeatureSnapshot]) -> Value {
    Value::Array(features.iter().map(feature_to_value).collect())
}

fn feature_to_value(feature: &FeatureSnapshot) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "id".to_string(),
        Value::String(feature.id.as_str().to_string()),
    );
    obj.insert(
        "vertexIds".to_string(),
        Value::Array(
            feature
                .vertex_ids
                .iter()
                .map(|id| Value::String(id.as_str().to_string()))
                .collect(),
        ),
    );
    obj.insert(
        "points".to_string(),
        Value::Array(feature.points.iter().map(point_to_value).collect()),
    );
    obj.insert(
        "properties".to_string(),
        Value::Array(feature.properties.iter().map(property_to_value).collect()),
    );
    Value::Object(obj)
}

fn point_to_value(p: &Vec2) -> Value {
    let mut obj = Map::new();
    obj.insert("x".to_string(), Value::from(p.x));
    obj.insert("y".to_string(), Value::from(p.y));
    Value::Object(obj)
}

fn property_to_value(p: &PropertySnapshot) -> Value {
    let mut obj = Map::new();
    if let Some(year) = p.year {
        obj.insert("year".to_string(), Value::from(year.0));
    }
    obj.insert("name".to_string(), Value::String(p.name.clone()));
    obj.insert(
        "description".to_string(),
        Value::String(p.description.clone()),
    );
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use foundation::math::Vec2;
    use foundation::time::Year;
    use pretty_assertions::assert_eq;

    use super::Dataset;

    #[test]
    fn parses_the_modern_shape() {
        let payload = r#"{
            "points": [
                {"id": "pt-1", "vertexIds": ["vx-1"], "points": [{"x": 10.0, "y": 20.0}],
                 "properties": [{"year": 1900, "name": "A", "description": "cap"}]}
            ],
            "lines": [],
            "polygons": [],
            "metadata": {"sliderMin": 0, "sliderMax": 5000, "worldName": "Orbis", "worldDescription": ""}
        }"#;
        let ds = Dataset::from_json_str(payload).expect("parse dataset");
        assert_eq!(ds.points.len(), 1);
        assert_eq!(ds.points[0].vertex_ids[0].as_str(), "vx-1");
        assert_eq!(ds.points[0].points, vec![Vec2::new(10.0, 20.0)]);
        assert_eq!(ds.points[0].properties[0].year, Some(Year(1900)));
        assert_eq!(ds.metadata.slider.max, Year(5000));
        assert_eq!(ds.metadata.world_name, "Orbis");
    }

    #[test]
    fn accepts_legacy_records_without_vertex_ids() {
        let payload = r#"{
            "lines": [
                {"id": 42, "points": [{"x": 0, "y": 0}, {"x": 5, "y": 5}],
                 "properties": [{"year": 100, "name": "road", "description": ""}]}
            ]
        }"#;
        let ds = Dataset::from_json_str(payload).expect("parse dataset");
        assert_eq!(ds.lines[0].id.as_str(), "42");
        assert!(ds.lines[0].vertex_ids.is_empty());
        assert_eq!(ds.lines[0].points.len(), 2);
    }

    #[test]
    fn accepts_legacy_points_with_bare_xy() {
        let payload = r#"{"points": [{"id": "p", "x": 3.5, "y": -2.0, "properties": []}]}"#;
        let ds = Dataset::from_json_str(payload).expect("parse dataset");
        assert_eq!(ds.points[0].points, vec![Vec2::new(3.5, -2.0)]);
    }

    #[test]
    fn keeps_undated_properties_as_undated() {
        let payload = r#"{
            "points": [{"id": "p", "points": [{"x": 0, "y": 0}],
                        "properties": [{"name": "no-year", "description": ""},
                                       {"year": "not-a-number", "name": "bad", "description": ""},
                                       {"year": 1850.9, "name": "frac", "description": ""}]}]
        }"#;
        let ds = Dataset::from_json_str(payload).expect("parse dataset");
        let props = &ds.points[0].properties;
        assert_eq!(props[0].year, None);
        assert_eq!(props[1].year, None);
        assert_eq!(props[2].year, Some(Year(1850)));
    }

    #[test]
    fn missing_sections_and_metadata_default() {
        let ds = Dataset::from_json_str("{}").expect("parse dataset");
        assert!(ds.points.is_empty());
        assert_eq!(ds.metadata.slider.min, Year(0));
        assert_eq!(ds.metadata.slider.max, Year(10_000));
    }

    #[test]
    fn feature_without_id_is_rejected() {
        let err = Dataset::from_json_str(r#"{"points": [{"points": []}]}"#).unwrap_err();
        assert!(err.to_string().contains("points at index 0"));
    }

    #[test]
    fn json_round_trip_preserves_the_dataset() {
        let payload = r#"{
            "points": [{"id": "pt-1", "vertexIds": ["vx-1"], "points": [{"x": 1.0, "y": 2.0}],
                        "properties": [{"year": 1900, "name": "A", "description": "d"}]}],
            "lines": [{"id": "ln-1", "vertexIds": ["vx-1", "vx-2"],
                       "points": [{"x": 1.0, "y": 2.0}, {"x": 3.0, "y": 4.0}],
                       "properties": [{"year": 1800, "name": "B", "description": ""}]}],
            "polygons": [],
            "metadata": {"sliderMin": 0, "sliderMax": 2000, "worldName": "W", "worldDescription": "D"}
        }"#;
        let ds = Dataset::from_json_str(payload).expect("parse dataset");
        let encoded = ds.to_json_string().expect("encode dataset");
        let reparsed = Dataset::from_json_str(&encoded).expect("reparse dataset");
        assert_eq!(ds, reparsed);
    }
}
