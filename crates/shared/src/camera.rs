use serde::{Deserialize, Serialize};

use crate::models::LngLat;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
pub const PITCH_RANGE: (f64, f64) = (0.0, 90.0);
pub const BEARING_RANGE: (f64, f64) = (-180.0, 180.0);
pub const ZOOM_RANGE: (f64, f64) = (0.0, 15.0);

/// The map viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub latitude: f64,
    pub longitude: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            latitude: 0.0,
            longitude: 0.0,
            pitch: 0.0,
            bearing: 0.0,
            zoom: 1.0,
        }
    }
}

/// A single editable camera field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraField {
    Latitude,
    Longitude,
    Pitch,
    Bearing,
    Zoom,
}

impl CameraField {
    pub const ALL: [CameraField; 5] = [
        CameraField::Latitude,
        CameraField::Longitude,
        CameraField::Pitch,
        CameraField::Bearing,
        CameraField::Zoom,
    ];

    pub fn range(self) -> (f64, f64) {
        match self {
            CameraField::Latitude => LATITUDE_RANGE,
            CameraField::Longitude => LONGITUDE_RANGE,
            CameraField::Pitch => PITCH_RANGE,
            CameraField::Bearing => BEARING_RANGE,
            CameraField::Zoom => ZOOM_RANGE,
        }
    }

    /// Slider step used by the editor controls.
    pub fn step(self) -> f64 {
        match self {
            CameraField::Latitude | CameraField::Longitude => 0.0001,
            _ => 0.01,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraField::Latitude => "Latitude",
            CameraField::Longitude => "Longitude",
            CameraField::Pitch => "Pitch",
            CameraField::Bearing => "Bearing",
            CameraField::Zoom => "Zoom",
        }
    }

    /// Clamp into range. Non-finite input yields `None`.
    pub fn clamp(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let (min, max) = self.range();
        Some(value.clamp(min, max))
    }
}

impl Camera {
    pub fn center(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }

    pub fn get(&self, field: CameraField) -> f64 {
        match field {
            CameraField::Latitude => self.latitude,
            CameraField::Longitude => self.longitude,
            CameraField::Pitch => self.pitch,
            CameraField::Bearing => self.bearing,
            CameraField::Zoom => self.zoom,
        }
    }

    /// Set one field, clamped. Returns `false` (and leaves the camera alone)
    /// when the value is not a finite number.
    pub fn set(&mut self, field: CameraField, value: f64) -> bool {
        let Some(v) = field.clamp(value) else {
            return false;
        };
        match field {
            CameraField::Latitude => self.latitude = v,
            CameraField::Longitude => self.longitude = v,
            CameraField::Pitch => self.pitch = v,
            CameraField::Bearing => self.bearing = v,
            CameraField::Zoom => self.zoom = v,
        }
        true
    }

    /// Parse raw control input and set the field.
    pub fn set_from_input(&mut self, field: CameraField, raw: &str) -> bool {
        match raw.trim().parse::<f64>() {
            Ok(v) => self.set(field, v),
            Err(_) => false,
        }
    }

    /// Replace non-finite values with defaults and clamp the rest.
    pub fn sanitized(self) -> Camera {
        let fallback = Camera::default();
        let mut out = fallback;
        for field in CameraField::ALL {
            if !out.set(field, self.get(field)) {
                out.set(field, fallback.get(field));
            }
        }
        out
    }

    /// Drop rotation and tilt, used when the free-view camera is turned off.
    pub fn flattened(mut self) -> Camera {
        self.bearing = 0.0;
        self.pitch = 0.0;
        self
    }
}
