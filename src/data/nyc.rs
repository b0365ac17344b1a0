use super::geo::{BoroughBoundary, Landmark, MapCoords, MarkerColor};

/// Near Times Square.
pub const CENTER: MapCoords = MapCoords::new(40.7589, -73.9851);
pub const ZOOM_START: u8 = 11;

pub fn landmarks() -> Vec<Landmark> {
    vec![
        // Manhattan sights
        Landmark::new("时代广场 Times Square", 40.7589, -73.9851, MarkerColor::Red),
        Landmark::new("中央公园 Central Park", 40.7829, -73.9654, MarkerColor::Green),
        Landmark::new("帝国大厦 Empire State Building", 40.7484, -73.9857, MarkerColor::Blue),
        Landmark::new("自由女神像 Statue of Liberty", 40.6892, -74.0445, MarkerColor::Orange),
        Landmark::new("布鲁克林大桥 Brooklyn Bridge", 40.7061, -73.9969, MarkerColor::Purple),
        Landmark::new("华尔街 Wall Street", 40.7074, -74.0113, MarkerColor::DarkGreen),
        Landmark::new("联合国总部 UN Headquarters", 40.7489, -73.9680, MarkerColor::LightBlue),
        Landmark::new("洋基体育场 Yankee Stadium", 40.8296, -73.9262, MarkerColor::DarkBlue),
        Landmark::new("大都会艺术博物馆 Metropolitan Museum", 40.7794, -73.9632, MarkerColor::Pink),
        Landmark::new("9/11纪念馆 9/11 Memorial", 40.7115, -74.0134, MarkerColor::Black),

        // Borough centres
        Landmark::new("曼哈顿 Manhattan", 40.7831, -73.9712, MarkerColor::Red),
        Landmark::new("布鲁克林 Brooklyn", 40.6782, -73.9442, MarkerColor::Blue),
        Landmark::new("皇后区 Queens", 40.7282, -73.7949, MarkerColor::Green),
        Landmark::new("布朗克斯 Bronx", 40.8448, -73.8648, MarkerColor::Orange),
        Landmark::new("史泰登岛 Staten Island", 40.5795, -74.1502, MarkerColor::Purple),
    ]
}

pub fn borough_boundaries() -> Vec<BoroughBoundary> {
    vec![
        BoroughBoundary::new(
            "曼哈顿 Manhattan",
            &[
                (40.8007, -73.9512), (40.7831, -73.9712), (40.7489, -73.9680),
                (40.7074, -74.0113), (40.7000, -74.0200), (40.7150, -74.0134),
                (40.7589, -73.9851), (40.8007, -73.9512),
            ],
            MarkerColor::Red,
        ),
        BoroughBoundary::new(
            "布鲁克林 Brooklyn",
            &[
                (40.7361, -73.9906), (40.6782, -73.9442), (40.5795, -74.0000),
                (40.6000, -74.0500), (40.7000, -74.0200), (40.7361, -73.9906),
            ],
            MarkerColor::Blue,
        ),
    ]
}

const STATIC_SUBSET: [&str; 5] = [
    "Times Square",
    "Central Park",
    "Empire State Building",
    "Brooklyn Bridge",
    "Statue of Liberty",
];

/// The five sights plotted on the static chart, in plotting order.
pub fn static_landmarks() -> Vec<Landmark> {
    let all = landmarks();
    STATIC_SUBSET.iter()
        .filter_map(|english| all.iter().find(|landmark| landmark.name.ends_with(english)))
        .cloned()
        .collect()
}

/// Rectangular footprints used by the static chart. Legend labels are Chinese only.
pub fn static_borough_outlines() -> Vec<BoroughBoundary> {
    vec![
        BoroughBoundary::rectangle("曼哈顿", -74.02, 40.70, -73.93, 40.80, MarkerColor::Blue),
        BoroughBoundary::rectangle("布鲁克林", -74.05, 40.58, -73.88, 40.72, MarkerColor::Green),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifteen_landmarks_inside_city_box() {
        let landmarks = landmarks();
        assert_eq!(landmarks.len(), 15);
        for landmark in &landmarks {
            assert!((40.5..=40.9).contains(&landmark.lat), "{} lat {}", landmark.name, landmark.lat);
            assert!((-74.2..=-73.7).contains(&landmark.lng), "{} lng {}", landmark.name, landmark.lng);
        }
    }

    #[test]
    fn every_boundary_ring_is_closed() {
        for borough in borough_boundaries().iter().chain(static_borough_outlines().iter()) {
            assert_eq!(borough.coordinates.first(), borough.coordinates.last(), "{}", borough.name);
            assert!(borough.is_closed());
        }
    }

    #[test]
    fn static_subset_follows_plotting_order() {
        let names: Vec<String> = static_landmarks()
            .iter()
            .map(|landmark| landmark.chinese_name().to_string())
            .collect();
        assert_eq!(names, vec!["时代广场", "中央公园", "帝国大厦", "布鲁克林大桥", "自由女神像"]);
    }

    #[test]
    fn center_is_times_square() {
        assert_eq!(MapCoords::from(&landmarks()[0]), CENTER);
    }
}
