//! Coverage map rendering.
//!
//! The map is a standalone Leaflet document embedded by the index page in an
//! iframe. Clicking it snaps to the nearest axis values and hands the point
//! to `window.parent.handleGridClick(lat, lon)`; the server re-resolves the
//! point on query, so the client-side snap is only for immediate feedback.

use grid_common::BoundingBox;
use grid_processor::GridIndex;
use serde_json::json;

use crate::config::MapConfig;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Render the coverage map for a dataset.
pub fn coverage_map_html(index: &GridIndex, bbox: &BoundingBox, config: &MapConfig) -> String {
    let padded = bbox.padded(config.padding_degrees);
    let (center_lat, center_lon) = bbox.center();

    let markers: Vec<[f64; 2]> = if index.len() <= config.max_markers {
        index.points().map(|p| [p.lat, p.lon]).collect()
    } else {
        Vec::new()
    };

    let options = json!({
        "center": [center_lat, center_lon],
        "bounds": [[padded.min_lat, padded.min_lon], [padded.max_lat, padded.max_lon]],
        "maxBounds": config.max_bounds.map(|b| [[b.south, b.west], [b.north, b.east]]),
        "lats": index.lats(),
        "lons": index.lons(),
        "markers": markers,
    });

    MAP_TEMPLATE
        .replace("{{LEAFLET_CSS}}", LEAFLET_CSS)
        .replace("{{LEAFLET_JS}}", LEAFLET_JS)
        .replace("{{OPTIONS}}", &options.to_string())
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<link rel="stylesheet" href="{{LEAFLET_CSS}}">
<script src="{{LEAFLET_JS}}"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
(function () {
  var opts = {{OPTIONS}};
  var map = L.map('map', opts.maxBounds ? { maxBounds: opts.maxBounds } : {});
  map.setView(opts.center, 4);
  L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors'
  }).addTo(map);

  var coverage = L.rectangle(opts.bounds, { color: 'red', weight: 2, fillOpacity: 0.05 }).addTo(map);
  map.fitBounds(coverage.getBounds());

  opts.markers.forEach(function (p) {
    L.circleMarker(p, { radius: 2, color: '#1f77b4', weight: 1 }).addTo(map);
  });

  function nearest(values, target) {
    var best = values[0], bestDist = Infinity;
    for (var i = 0; i < values.length; i++) {
      var d = (values[i] - target) * (values[i] - target);
      if (d < bestDist) { best = values[i]; bestDist = d; }
    }
    return best;
  }

  var selected = null;
  map.on('click', function (e) {
    var lat = nearest(opts.lats, e.latlng.lat);
    var lon = nearest(opts.lons, e.latlng.lng);
    if (selected) { map.removeLayer(selected); }
    selected = L.circleMarker([lat, lon], { radius: 6, color: 'orange' }).addTo(map);
    if (window.parent && window.parent.handleGridClick) {
      window.parent.handleGridClick(lat, lon);
    }
  });
})();
</script>
</body>
</html>
"#;
