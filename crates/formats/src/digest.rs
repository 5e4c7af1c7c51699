use crate::dataset::Dataset;

/// Content digest of a dataset's canonical (compact) JSON encoding.
///
/// Two datasets with the same ids, geometry, properties and metadata hash
/// identically; useful as a save identity and for quick "did anything
/// change" comparisons across the IPC boundary.
pub fn dataset_digest(dataset: &Dataset) -> String {
    let canonical = dataset
        .to_json_string()
        .unwrap_or_else(|_| String::from("{}"));
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use foundation::ids::FeatureId;
    use foundation::math::Vec2;
    use scene::feature::FeatureSnapshot;

    use super::dataset_digest;
    use crate::dataset::Dataset;

    #[test]
    fn digest_is_stable_for_equal_datasets() {
        let ds = Dataset::default();
        assert_eq!(dataset_digest(&ds), dataset_digest(&ds.clone()));
    }

    #[test]
    fn digest_changes_with_content() {
        let empty = Dataset::default();
        let mut with_point = Dataset::default();
        with_point.points.push(FeatureSnapshot::from_points(
            FeatureId::new("pt-1"),
            vec![Vec2::new(1.0, 2.0)],
            Vec::new(),
        ));
        assert_ne!(dataset_digest(&empty), dataset_digest(&with_point));
    }
}
