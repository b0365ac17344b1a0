pub mod template;

use std::{fs, path::Path};

use log::debug;
use quick_xml::escape::escape;
use serde::Serialize;
use tera::{Context, Tera};

use crate::{data::{MapCoords, MarkerColor}, errors::Result};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<String>,
    pub max_zoom: u8,
}

pub enum TileProvider {
    OpenStreetMap,
    StamenTerrain,
    CartoDbPositron,
}

impl TileProvider {
    pub fn layer(&self) -> TileLayer {
        match self {
            TileProvider::OpenStreetMap => TileLayer {
                name: "openstreetmap".to_string(),
                url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
                subdomains: None,
                max_zoom: 19,
            },
            // The old fastly host is gone, Stadia serves the same style now.
            TileProvider::StamenTerrain => TileLayer {
                name: "Stamen Terrain".to_string(),
                url: "https://tiles.stadiamaps.com/tiles/stamen_terrain/{z}/{x}/{y}{r}.png".to_string(),
                attribution: "Map tiles by <a href=\"http://stamen.com\">Stamen Design</a>, <a href=\"http://creativecommons.org/licenses/by/3.0\">CC BY 3.0</a> &mdash; Map data &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
                subdomains: Some("abcd".to_string()),
                max_zoom: 18,
            },
            TileProvider::CartoDbPositron => TileLayer {
                name: "cartodbpositron".to_string(),
                url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>".to_string(),
                subdomains: Some("abcd".to_string()),
                max_zoom: 20,
            },
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Marker {
    pub location: [f64; 2],
    pub popup: String,
    pub tooltip: String,
    pub icon: String,
    pub color: MarkerColor,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Polygon {
    pub locations: Vec<[f64; 2]>,
    pub popup: String,
    pub color: String,
    pub weight: f32,
    pub fill: bool,
    pub fill_color: String,
    pub fill_opacity: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LayerControl {
    pub position: String,
    pub collapsed: bool,
}

impl Default for LayerControl {
    fn default() -> Self {
        LayerControl {
            position: "topright".to_string(),
            collapsed: true,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LeafletMap {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_layers: Vec<TileLayer>,
    pub markers: Vec<Marker>,
    pub polygons: Vec<Polygon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_control: Option<LayerControl>,
    #[serde(skip)]
    pub html_elements: Vec<String>,
}

fn location(coords: &MapCoords) -> Result<[f64; 2]> {
    coords.validate()?;
    Ok([coords.lat, coords.lng])
}

impl LeafletMap {
    pub fn new(center: MapCoords, zoom: u8, tiles: TileProvider) -> Result<Self> {
        Ok(LeafletMap {
            center: location(&center)?,
            zoom,
            tile_layers: vec![tiles.layer()],
            markers: Vec::new(),
            polygons: Vec::new(),
            layer_control: None,
            html_elements: Vec::new(),
        })
    }

    /// Popup and tooltip show `label` as text, never as markup.
    pub fn add_marker(&mut self, coords: MapCoords, label: &str, color: MarkerColor) -> Result<()> {
        let label = escape(label).to_string();
        self.markers.push(Marker {
            location: location(&coords)?,
            popup: label.clone(),
            tooltip: label,
            icon: "info-sign".to_string(),
            color,
        });
        Ok(())
    }

    pub fn add_polygon(&mut self, ring: &[MapCoords], label: &str, color: MarkerColor) -> Result<()> {
        if ring.len() < 3 {
            return Err(format!("Polygon '{}' needs at least 3 points, got {}", label, ring.len()).into());
        }
        let locations = ring.iter()
            .map(location)
            .collect::<Result<Vec<_>>>()?;
        self.polygons.push(Polygon {
            locations,
            popup: escape(label).to_string(),
            color: color.css_name().to_string(),
            weight: 3.0,
            fill: true,
            fill_color: color.css_name().to_string(),
            fill_opacity: 0.1,
        });
        Ok(())
    }

    pub fn add_tile_layer(&mut self, layer: TileLayer) {
        self.tile_layers.push(layer);
    }

    pub fn add_layer_control(&mut self, control: LayerControl) {
        self.layer_control = Some(control);
    }

    /// Raw markup placed at the top of the document body.
    pub fn add_html(&mut self, html: &str) {
        self.html_elements.push(html.to_string());
    }

    pub fn layer_data_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_html(&self) -> Result<String> {
        // A literal "</" would end the surrounding <script> element early.
        let data = self.layer_data_json()?.replace("</", "<\\/");
        let mut context = Context::new();
        context.insert("html_elements", &self.html_elements.join("\n"));
        context.insert("map_data", &data);
        Ok(Tera::one_off(template::PAGE, &context, false)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let html = self.to_html()?;
        debug!(path = path.display().to_string(), bytes = html.len(); "Writing map page");
        fs::write(path, html)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> LeafletMap {
        let mut map = LeafletMap::new(MapCoords::new(40.75, -73.98), 11, TileProvider::OpenStreetMap).unwrap();
        map.add_marker(MapCoords::new(40.7589, -73.9851), "时代广场 <Times Square>", MarkerColor::Red).unwrap();
        map
    }

    #[test]
    fn marker_labels_are_escaped() {
        let map = sample_map();
        assert_eq!(map.markers[0].popup, "时代广场 &lt;Times Square&gt;");
        assert_eq!(map.markers[0].tooltip, map.markers[0].popup);
    }

    #[test]
    fn invalid_marker_coordinate_is_an_error() {
        let mut map = sample_map();
        assert!(map.add_marker(MapCoords::new(f64::INFINITY, 0.0), "bad", MarkerColor::Red).is_err());
        assert_eq!(map.markers.len(), 1);
    }

    #[test]
    fn degenerate_polygon_is_an_error() {
        let mut map = sample_map();
        let ring = [MapCoords::new(40.0, -74.0), MapCoords::new(40.0, -74.0)];
        assert!(map.add_polygon(&ring, "tiny", MarkerColor::Blue).is_err());
    }

    #[test]
    fn json_uses_marker_color_names() {
        let json = sample_map().layer_data_json().unwrap();
        assert!(json.contains("\"color\":\"red\""));
        assert!(json.contains("[40.7589,-73.9851]"));
        assert!(!json.contains("html_elements"));
    }

    #[test]
    fn page_embeds_data_and_html() {
        let mut map = sample_map();
        map.add_html("<h3>Banner</h3>");
        map.add_html("</script>");
        let html = map.to_html().unwrap();
        assert!(html.contains("<h3>Banner</h3>"));
        assert!(html.contains("\"zoom\":11"));
        assert!(!html.contains("{{map_data}}"));
        assert!(!html.contains("{{html_elements}}"));
    }

    #[test]
    fn script_terminator_in_data_is_neutralised() {
        let mut map = sample_map();
        map.add_tile_layer(TileLayer {
            name: "</script>".to_string(),
            url: "https://example.invalid/{z}/{x}/{y}.png".to_string(),
            attribution: String::new(),
            subdomains: None,
            max_zoom: 10,
        });
        let html = map.to_html().unwrap();
        assert!(html.contains("<\\/script>"));
    }

    #[test]
    fn injected_html_is_not_rendered_as_template() {
        let mut map = sample_map();
        map.add_html("<p>{{map_data}}</p>");
        let html = map.to_html().unwrap();
        assert!(html.contains("<p>{{map_data}}</p>"));
        assert_eq!(html.matches("\"zoom\":11").count(), 1);
    }
}
