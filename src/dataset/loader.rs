// Dataset loading
// Reads a GeoJSON FeatureCollection from disk and derives per-feature keys

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson};
use std::fs;
use std::path::Path;

use super::{Dataset, DatasetError, HousingRecord};
use crate::config::DatasetConfig;

impl Dataset {
    /// Load the dataset from the file named in the configuration
    pub fn load(config: &DatasetConfig) -> Result<Self, DatasetError> {
        Self::load_path(&config.path, config)
    }

    /// Load the dataset from an explicit path
    pub fn load_path(path: impl AsRef<Path>, config: &DatasetConfig) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson_str(&text, config)
    }

    pub fn from_geojson_str(text: &str, config: &DatasetConfig) -> Result<Self, DatasetError> {
        match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => Self::from_collection(collection, config),
            GeoJson::Feature(_) => Err(DatasetError::NotFeatureCollection("Feature")),
            GeoJson::Geometry(_) => Err(DatasetError::NotFeatureCollection("Geometry")),
        }
    }

    /// Build the table from an already parsed collection, preserving order
    pub fn from_collection(
        collection: FeatureCollection,
        config: &DatasetConfig,
    ) -> Result<Self, DatasetError> {
        let mut unmatched = 0;
        let mut records = Vec::with_capacity(collection.features.len());

        for (index, mut feature) in collection.features.into_iter().enumerate() {
            // Existing ids win over the positional one
            if config.assign_ids && feature.id.is_none() {
                feature.id = Some(Id::String(index.to_string()));
            }

            let muni_key = municipality_key(&feature, &config.filter_key);
            if muni_key.is_none() {
                if config.strict {
                    return Err(DatasetError::MissingKey {
                        index,
                        key: config.filter_key.clone(),
                    });
                }
                unmatched += 1;
            }

            records.push(HousingRecord { feature, muni_key });
        }

        Ok(Self {
            records,
            filter_key: config.filter_key.clone(),
            unmatched,
        })
    }
}

/// Lower-cased string value of `key`, if the feature has one
fn municipality_key(feature: &Feature, key: &str) -> Option<String> {
    feature
        .properties
        .as_ref()?
        .get(key)?
        .as_str()
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-71.06, 42.36]},
             "properties": {"muni": "Boston", "only_single_family": 0}},
            {"type": "Feature", "id": "cam-1", "geometry": {"type": "Point", "coordinates": [-71.11, 42.37]},
             "properties": {"muni": "Cambridge", "only_single_family": 1}},
            {"type": "Feature", "geometry": null,
             "properties": {"only_single_family": 1}}
        ]
    }"#;

    #[test]
    fn test_load_keeps_order_and_derives_keys() {
        let dataset = Dataset::from_geojson_str(COLLECTION, &DatasetConfig::default()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.unmatched(), 1);

        let keys: Vec<_> = dataset.records().iter().map(HousingRecord::muni_key).collect();
        assert_eq!(keys, vec![Some("boston"), Some("cambridge"), None]);
    }

    #[test]
    fn test_assign_ids_only_when_missing() {
        let dataset = Dataset::from_geojson_str(COLLECTION, &DatasetConfig::default()).unwrap();
        let ids: Vec<_> = dataset
            .records()
            .iter()
            .map(|r| r.feature().id.clone())
            .collect();
        assert_eq!(
            ids,
            vec![
                Some(Id::String("0".to_string())),
                Some(Id::String("cam-1".to_string())),
                Some(Id::String("2".to_string())),
            ]
        );

        let config = DatasetConfig {
            assign_ids: false,
            ..DatasetConfig::default()
        };
        let dataset = Dataset::from_geojson_str(COLLECTION, &config).unwrap();
        assert!(dataset.records()[0].feature().id.is_none());
    }

    #[test]
    fn test_strict_rejects_missing_key() {
        let config = DatasetConfig {
            strict: true,
            ..DatasetConfig::default()
        };
        let err = Dataset::from_geojson_str(COLLECTION, &config).unwrap_err();
        assert!(matches!(err, DatasetError::MissingKey { index: 2, .. }));
    }

    #[test]
    fn test_non_string_key_is_unmatched() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": null, "properties": {"muni": 42}},
            {"type": "Feature", "geometry": null, "properties": null}
        ]}"#;
        let dataset = Dataset::from_geojson_str(text, &DatasetConfig::default()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.unmatched(), 2);
    }

    #[test]
    fn test_custom_filter_key() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": null, "properties": {"town": "Quincy"}}
        ]}"#;
        let config = DatasetConfig {
            filter_key: "town".to_string(),
            ..DatasetConfig::default()
        };
        let dataset = Dataset::from_geojson_str(text, &config).unwrap();
        assert_eq!(dataset.filter_key(), "town");
        assert_eq!(dataset.records()[0].muni_key(), Some("quincy"));
    }

    #[test]
    fn test_empty_collection() {
        let text = r#"{"type": "FeatureCollection", "features": []}"#;
        let dataset = Dataset::from_geojson_str(text, &DatasetConfig::default()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_rejects_non_collection() {
        let text = r#"{"type": "Feature", "geometry": null, "properties": {"muni": "Boston"}}"#;
        let err = Dataset::from_geojson_str(text, &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::NotFeatureCollection("Feature")));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Dataset::from_geojson_str("{\"type\": ", &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_feature_without_geometry_member_is_rejected() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"muni": "Boston"}}
        ]}"#;
        let err = Dataset::from_geojson_str(text, &DatasetConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COLLECTION.as_bytes()).unwrap();

        let dataset = Dataset::load_path(file.path(), &DatasetConfig::default()).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatasetConfig {
            path: dir.path().join("absent.geojson").display().to_string(),
            ..DatasetConfig::default()
        };
        let err = Dataset::load(&config).unwrap_err();
        assert!(matches!(err, DatasetError::Read { .. }));
    }
}
