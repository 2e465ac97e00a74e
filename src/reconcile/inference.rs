//! Section inference from the pathname.

use crate::config::schema::SectionsConfig;
use crate::session::Section;

/// Marker segments per section, checked in priority order
/// driver, then admin, then passenger.
#[derive(Debug, Clone)]
pub struct SectionMarkers {
    passenger: Vec<String>,
    driver: Vec<String>,
    admin: Vec<String>,
}

impl SectionMarkers {
    pub fn from_config(config: &SectionsConfig) -> Self {
        Self {
            passenger: config.passenger.clone(),
            driver: config.driver.clone(),
            admin: config.admin.clone(),
        }
    }

    fn markers(&self, section: Section) -> &[String] {
        match section {
            Section::Passenger => &self.passenger,
            Section::Driver => &self.driver,
            Section::Admin => &self.admin,
            Section::None => &[],
        }
    }

    /// The section a path names, or `None` if it carries no marker segment.
    pub fn infer(&self, path: &str) -> Option<Section> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        Section::APPS.into_iter().find(|section| {
            self.markers(*section)
                .iter()
                .any(|marker| segments.contains(&marker.as_str()))
        })
    }
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self::from_config(&SectionsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_by_segment() {
        let markers = SectionMarkers::default();
        assert_eq!(markers.infer("/driver/dashboard"), Some(Section::Driver));
        assert_eq!(markers.infer("/admin/settings"), Some(Section::Admin));
        assert_eq!(markers.infer("/passenger"), Some(Section::Passenger));
        assert_eq!(markers.infer("/ride/42"), Some(Section::Passenger));
        assert_eq!(markers.infer("/"), None);
        // Whole segments only
        assert_eq!(markers.infer("/drivers-club"), None);
    }

    #[test]
    fn test_priority_driver_admin_passenger() {
        let markers = SectionMarkers::default();
        assert_eq!(markers.infer("/admin/driver"), Some(Section::Driver));
        assert_eq!(markers.infer("/passenger/admin"), Some(Section::Admin));
    }
}
