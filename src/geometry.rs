//! polygon and feature representations of face-centered data
//!
//! [`PolyCollection`] is the input a plotting library needs to draw one filled polygon per
//! face. [`FeatureCollection`] follows the GeoJSON layout and serializes with `serde`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// one polygon per face with the value to color it by
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyCollection {
    /// `(x, y)` vertices of every face, not closed
    pub polygons: Vec<Vec<[f64; 2]>>,
    pub values: Vec<f64>,
}

impl PolyCollection {
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[[f64; 2]], f64)> {
        self.polygons
            .iter()
            .map(Vec::as_slice)
            .zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// rings of `(x, y)` positions, each closed by repeating its first position
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// a polygon feature from an open ring, with `value` stored under `property`
    ///
    /// `NaN` values are stored as `null`.
    pub fn polygon(ring: &[[f64; 2]], property: &str, value: f64) -> Self {
        let mut ring = ring.to_vec();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
            if first != *last {
                ring.push(first);
            }
        }

        let mut properties = Map::new();
        properties.insert(
            property.to_string(),
            Number::from_f64(value).map_or(Value::Null, Value::Number),
        );

        Feature {
            kind: "Feature".into(),
            geometry: Geometry::Polygon {
                coordinates: vec![ring],
            },
            properties,
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// a GeoJSON feature collection with one feature per face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".into(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_json(&self) -> Result<String, crate::Error> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rings_are_closed_once() {
        let open = Feature::polygon(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], "psi", 2.5);
        let Geometry::Polygon { coordinates } = &open.geometry;
        assert_eq!(coordinates[0].len(), 4);
        assert_eq!(coordinates[0][3], [0.0, 0.0]);

        let closed = Feature::polygon(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]], "psi", 2.5);
        assert_eq!(closed.geometry, open.geometry);
    }

    #[test]
    fn geojson_layout() {
        let collection = FeatureCollection::new(vec![
            Feature::polygon(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], "psi", 1.0),
            Feature::polygon(&[[1.0, 0.0], [1.0, 1.0], [0.0, 1.0]], "psi", f64::NAN),
        ]);

        let json: Value = serde_json::from_str(&collection.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(json["features"][0]["properties"]["psi"], 1.0);
        assert_eq!(json["features"][1]["properties"]["psi"], Value::Null);
        assert_eq!(json["features"][1]["geometry"]["coordinates"][0][3][0], 1.0);

        let back: FeatureCollection = serde_json::from_value(json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.features[0], collection.features[0]);
    }
}
