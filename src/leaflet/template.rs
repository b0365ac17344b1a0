// Tera template, rendered with autoescaping off.

pub const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta http-equiv="content-type" content="text/html; charset=UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no" />
    <script src="https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.js"></script>
    <script src="https://code.jquery.com/jquery-3.7.1.min.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/bootstrap@5.2.2/dist/js/bootstrap.bundle.min.js"></script>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/leaflet@1.9.3/dist/leaflet.css" />
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.2.2/dist/css/bootstrap.min.css" />
    <link rel="stylesheet" href="https://netdna.bootstrapcdn.com/bootstrap/3.0.0/css/bootstrap-glyphicons.css" />
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css" />
    <style>
        html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
        #map { position: absolute; top: 0; bottom: 0; right: 0; left: 0; }
        h3 { position: relative; z-index: 1000; margin: 0; padding: 8px 0; background: rgba(255, 255, 255, 0.8); }
    </style>
</head>
<body>
{{html_elements}}
    <div id="map"></div>
    <script id="map-data" type="application/json">{{map_data}}</script>
    <script>
        (function () {
            const data = JSON.parse(document.getElementById("map-data").textContent);

            const map = L.map("map", {
                center: data.center,
                zoom: data.zoom,
                zoomControl: true,
                preferCanvas: false,
            });

            const baseLayers = {};
            data.tile_layers.forEach(function (layer, index) {
                const options = {
                    attribution: layer.attribution,
                    maxZoom: layer.max_zoom,
                    detectRetina: false,
                };
                if (layer.subdomains) {
                    options.subdomains = layer.subdomains;
                }
                const tiles = L.tileLayer(layer.url, options);
                baseLayers[layer.name] = tiles;
                if (index === 0) {
                    tiles.addTo(map);
                }
            });

            data.markers.forEach(function (marker) {
                const icon = L.AwesomeMarkers.icon({
                    icon: marker.icon,
                    markerColor: marker.color,
                    iconColor: "white",
                    prefix: "glyphicon",
                    extraClasses: "fa-rotate-0",
                });
                L.marker(marker.location, { icon: icon })
                    .bindPopup(marker.popup, { maxWidth: "100%" })
                    .bindTooltip("<div>" + marker.tooltip + "</div>", { sticky: true })
                    .addTo(map);
            });

            data.polygons.forEach(function (polygon) {
                L.polygon(polygon.locations, {
                    color: polygon.color,
                    weight: polygon.weight,
                    fill: polygon.fill,
                    fillColor: polygon.fill_color,
                    fillOpacity: polygon.fill_opacity,
                })
                    .bindPopup(polygon.popup, { maxWidth: "100%" })
                    .addTo(map);
            });

            if (data.layer_control) {
                L.control.layers(baseLayers, {}, {
                    position: data.layer_control.position,
                    collapsed: data.layer_control.collapsed,
                    autoZIndex: true,
                }).addTo(map);
            }
        })();
    </script>
</body>
</html>
"#;
