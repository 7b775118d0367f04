//! Form state for the two suggestion journeys.

use poimap_core::{ChangeRfc, Coordinate, SuggestionRfc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Message is required")]
    MissingMessage,
}

/// Fields of the new-POI data sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewPoiForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub wheelchair_accessible: bool,
}

impl NewPoiForm {
    /// # Errors
    ///
    /// [`FormError::MissingTitle`] when the title is blank.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingTitle);
        }
        Ok(())
    }

    /// Builds the RFC payload for `map_id` at `location` (`[lng, lat]`).
    ///
    /// # Errors
    ///
    /// Same as [`NewPoiForm::validate`].
    pub fn to_rfc(&self, map_id: &str, location: [f64; 2]) -> Result<SuggestionRfc, FormError> {
        self.validate()?;
        Ok(SuggestionRfc {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.clone(),
            map_id: map_id.to_string(),
            coordinate: Coordinate::from_lng_lat(location[0], location[1]),
            is_wheelchair_accessible: self.wheelchair_accessible,
        })
    }
}

/// Fields of the change-suggestion data sheet, seeded with the POI's id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeForm {
    pub poi_id: String,
    pub message: String,
}

impl ChangeForm {
    #[must_use]
    pub fn for_poi(poi_id: impl Into<String>) -> Self {
        Self {
            poi_id: poi_id.into(),
            message: String::new(),
        }
    }

    /// # Errors
    ///
    /// [`FormError::MissingMessage`] when the message is blank.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.message.trim().is_empty() {
            return Err(FormError::MissingMessage);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Same as [`ChangeForm::validate`].
    pub fn to_rfc(&self) -> Result<ChangeRfc, FormError> {
        self.validate()?;
        Ok(ChangeRfc::new(self.poi_id.clone(), self.message.trim()))
    }
}
