use serde::{Deserialize, Serialize};

/// User-facing settings that decide which derived content is cached and how
/// it is extracted.
///
/// This is a passive value: the engine never mutates it, and callers hand a
/// fresh snapshot to every `queue_content` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cache the tag list of markdown files.
    pub show_tags: bool,
    /// Cache preview text of markdown files.
    pub show_file_preview: bool,
    /// Leave heading lines out of the preview text.
    pub skip_headings_in_preview: bool,
    /// Leave fenced code blocks out of the preview text.
    pub skip_code_blocks_in_preview: bool,
    /// Frontmatter properties that, when set, replace the generated preview.
    /// Checked in order; the first non-empty string wins.
    pub preview_properties: Vec<String>,
    /// Cache a feature image for every file.
    pub show_feature_image: bool,
    /// Frontmatter properties that may reference a feature image, in
    /// priority order.
    pub feature_image_properties: Vec<String>,
    /// Derive name/created/modified metadata from frontmatter.
    pub use_frontmatter_metadata: bool,
    /// Frontmatter key holding the display name. Empty means not configured.
    pub frontmatter_name_field: String,
    /// Frontmatter key holding the creation date. Empty means not configured.
    pub frontmatter_created_field: String,
    /// Frontmatter key holding the modification date. Empty means not configured.
    pub frontmatter_modified_field: String,
    /// `time` format description used to parse frontmatter dates, e.g.
    /// `[year]-[month]-[day]`. Empty tries RFC 3339 and a few ISO-ish forms.
    pub frontmatter_date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_tags: true,
            show_file_preview: true,
            skip_headings_in_preview: false,
            skip_code_blocks_in_preview: true,
            preview_properties: Vec::new(),
            show_feature_image: true,
            feature_image_properties: vec!["thumbnail".to_string(), "featureResized".to_string(), "feature".to_string()],
            use_frontmatter_metadata: false,
            frontmatter_name_field: String::new(),
            frontmatter_created_field: "created".to_string(),
            frontmatter_modified_field: "modified".to_string(),
            frontmatter_date_format: String::new(),
        }
    }
}

impl Settings {
    /// `false` when every content kind is switched off, in which case there
    /// is nothing for the engine to do.
    pub fn any_content_enabled(&self) -> bool {
        self.show_tags || self.show_file_preview || self.show_feature_image || self.use_frontmatter_metadata
    }

    /// Compare the extraction inputs of two settings snapshots.
    ///
    /// Only settings that change *what would be extracted* for an enabled
    /// kind are reported. Switching a kind off is not a change of inputs:
    /// the stored values are simply ignored until it is switched back on.
    pub fn changed_inputs(&self, next: &Settings) -> ChangedInputs {
        ChangedInputs {
            // Tag extraction has no tunables.
            tags: false,
            preview: next.show_file_preview
                && (self.skip_headings_in_preview != next.skip_headings_in_preview
                    || self.skip_code_blocks_in_preview != next.skip_code_blocks_in_preview
                    || self.preview_properties != next.preview_properties),
            feature_image: next.show_feature_image && self.feature_image_properties != next.feature_image_properties,
            metadata: next.use_frontmatter_metadata
                && (!self.use_frontmatter_metadata
                    || self.frontmatter_name_field != next.frontmatter_name_field
                    || self.frontmatter_created_field != next.frontmatter_created_field
                    || self.frontmatter_modified_field != next.frontmatter_modified_field
                    || self.frontmatter_date_format != next.frontmatter_date_format),
        }
    }
}

/// Which content kinds need regenerating after a settings change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangedInputs {
    pub tags: bool,
    pub preview: bool,
    pub feature_image: bool,
    pub metadata: bool,
}
impl ChangedInputs {
    pub fn any(&self) -> bool {
        self.tags || self.preview || self.feature_image || self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_content() {
        assert!(Settings::default().any_content_enabled());
    }

    #[test]
    fn everything_disabled() {
        let settings = Settings {
            show_tags: false,
            show_file_preview: false,
            show_feature_image: false,
            use_frontmatter_metadata: false,
            ..Settings::default()
        };
        assert!(!settings.any_content_enabled());
    }

    #[test]
    fn identical_settings_change_nothing() {
        let settings = Settings::default();
        assert!(!settings.changed_inputs(&settings.clone()).any());
    }

    #[test]
    fn preview_tunables_are_reported() {
        let before = Settings::default();
        let after = Settings { skip_headings_in_preview: true, ..before.clone() };
        let changed = before.changed_inputs(&after);
        assert!(changed.preview);
        assert!(!changed.metadata);
        assert!(!changed.feature_image);
    }

    #[test]
    fn disabling_a_kind_is_not_an_input_change() {
        let before = Settings::default();
        let after = Settings {
            show_file_preview: false,
            skip_headings_in_preview: true,
            ..before.clone()
        };
        assert!(!before.changed_inputs(&after).preview);
    }

    #[test]
    fn enabling_metadata_counts_as_change() {
        let before = Settings::default();
        let after = Settings { use_frontmatter_metadata: true, ..before.clone() };
        assert!(before.changed_inputs(&after).metadata);
    }

    #[test]
    fn metadata_field_names_are_reported() {
        let before = Settings { use_frontmatter_metadata: true, ..Settings::default() };
        let after = Settings { frontmatter_created_field: String::new(), ..before.clone() };
        assert!(before.changed_inputs(&after).metadata);
    }
}
