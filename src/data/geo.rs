use serde::Serialize;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCoords {
    pub lat: f64,
    pub lng: f64,
}

impl MapCoords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        MapCoords { lat, lng }
    }

    /// Rejects coordinates a web map could not place.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(format!("Non-finite coordinate ({}, {})", self.lat, self.lng).into());
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("Latitude {} out of range", self.lat).into());
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!("Longitude {} out of range", self.lng).into());
        }
        Ok(())
    }
}

impl From<(f64, f64)> for MapCoords {
    fn from((lat, lng): (f64, f64)) -> Self {
        MapCoords { lat, lng }
    }
}

/// Marker palette understood by Leaflet.awesome-markers.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Green,
    Blue,
    Orange,
    Purple,
    DarkGreen,
    LightBlue,
    DarkBlue,
    Pink,
    Black,
}

impl MarkerColor {
    pub fn css_name(&self) -> &'static str {
        match self {
            MarkerColor::Red => "red",
            MarkerColor::Green => "green",
            MarkerColor::Blue => "blue",
            MarkerColor::Orange => "orange",
            MarkerColor::Purple => "purple",
            MarkerColor::DarkGreen => "darkgreen",
            MarkerColor::LightBlue => "lightblue",
            MarkerColor::DarkBlue => "darkblue",
            MarkerColor::Pink => "pink",
            MarkerColor::Black => "black",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            MarkerColor::Red => (0xff, 0x00, 0x00),
            MarkerColor::Green => (0x00, 0x80, 0x00),
            MarkerColor::Blue => (0x00, 0x00, 0xff),
            MarkerColor::Orange => (0xff, 0xa5, 0x00),
            MarkerColor::Purple => (0x80, 0x00, 0x80),
            MarkerColor::DarkGreen => (0x00, 0x64, 0x00),
            MarkerColor::LightBlue => (0xad, 0xd8, 0xe6),
            MarkerColor::DarkBlue => (0x00, 0x00, 0x8b),
            MarkerColor::Pink => (0xff, 0xc0, 0xcb),
            MarkerColor::Black => (0x00, 0x00, 0x00),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub color: MarkerColor,
}

impl Landmark {
    pub fn new(name: &str, lat: f64, lng: f64, color: MarkerColor) -> Self {
        Landmark {
            name: name.to_string(),
            lat,
            lng,
            color,
        }
    }

    /// Labels are "中文 English"; the Chinese part runs up to the first space.
    pub fn chinese_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl From<&Landmark> for MapCoords {
    fn from(value: &Landmark) -> Self {
        MapCoords {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoroughBoundary {
    pub name: String,
    pub coordinates: Vec<MapCoords>,
    pub color: MarkerColor,
}

impl BoroughBoundary {
    pub fn new(name: &str, coordinates: &[(f64, f64)], color: MarkerColor) -> Self {
        BoroughBoundary {
            name: name.to_string(),
            coordinates: coordinates.iter().map(|&pair| pair.into()).collect(),
            color,
        }
    }

    /// Axis-aligned ring, counter-clockwise from the south-west corner and closed.
    pub fn rectangle(name: &str, west: f64, south: f64, east: f64, north: f64, color: MarkerColor) -> Self {
        Self::new(
            name,
            &[
                (south, west),
                (south, east),
                (north, east),
                (north, west),
                (south, west),
            ],
            color,
        )
    }

    pub fn is_closed(&self) -> bool {
        match (self.coordinates.first(), self.coordinates.last()) {
            (Some(first), Some(last)) => self.coordinates.len() > 2 && first == last,
            _ => false,
        }
    }
}
