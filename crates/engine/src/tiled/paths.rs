//! Path rules for map-to-map links and map-relative image references.

fn is_absolute_reference(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("//")
        || reference.starts_with('/')
}

fn map_directory(map_path: &str) -> &str {
    match map_path.rfind('/') {
        Some(index) => &map_path[..=index],
        None => "",
    }
}

/// Collapses `.` and `..` segments. A leading `./` and any `..` that would
/// climb above the start of a relative path are kept.
pub fn normalize_path(path: &str) -> String {
    let leading_dot = path.starts_with("./");
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if leading_dot && !joined.starts_with("..") {
        format!("./{joined}")
    } else {
        joined
    }
}

/// Resolves a portal's `targetMap` against the map that holds the portal.
pub fn resolve_map_path(current_map: &str, target: &str) -> String {
    if target.is_empty() || is_absolute_reference(target) {
        return target.to_string();
    }
    normalize_path(&format!("{}{}", map_directory(current_map), target))
}

/// Resolves a tileset or tile image path written inside a map file.
pub fn resolve_map_asset_path(map_path: &str, asset: &str) -> String {
    let asset = asset.replace('\\', "/");
    if asset.is_empty() || is_absolute_reference(&asset) {
        return asset;
    }
    normalize_path(&format!("{}{}", map_directory(map_path), asset))
}

/// Alternate spelling tried once when a target map fails to load.
/// Authored links sometimes use underscores where the file name has spaces.
pub fn underscore_fallback(target: &str) -> Option<String> {
    if target.contains('_') {
        Some(target.replace('_', " "))
    } else {
        None
    }
}
