//! URL template substitution.
//!
//! Templates carry the literal placeholders `{z}`, `{x}` and `{y}`. Each is
//! replaced exactly once with the decimal coordinate value.

const PLACEHOLDERS: [&str; 3] = ["{z}", "{x}", "{y}"];

/// Substitutes tile coordinates into a URL template.
///
/// Only the first occurrence of each placeholder is replaced.
pub fn build_tile_url(template: &str, zoom: u8, x: u32, y: u32) -> String {
    template
        .replacen("{z}", &zoom.to_string(), 1)
        .replacen("{x}", &x.to_string(), 1)
        .replacen("{y}", &y.to_string(), 1)
}

/// Checks that every placeholder appears in the template.
pub(crate) fn validate_template(template: &str) -> Result<(), String> {
    let missing: Vec<&str> = PLACEHOLDERS
        .iter()
        .copied()
        .filter(|p| !template.contains(p))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing placeholder(s) {}", missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tile_url() {
        let url = build_tile_url("https://a.tile.example.org/{z}/{x}/{y}.png", 12, 2048, 1361);
        assert_eq!(url, "https://a.tile.example.org/12/2048/1361.png");
    }

    #[test]
    fn test_build_tile_url_with_query_suffix() {
        let url = build_tile_url(
            "https://tiles.example.ee/tms/1.0.0/foto@GMC/{z}/{x}/{y}.jpg&ASUTUS=X",
            10,
            580,
            700,
        );
        assert_eq!(
            url,
            "https://tiles.example.ee/tms/1.0.0/foto@GMC/10/580/700.jpg&ASUTUS=X"
        );
    }

    #[test]
    fn test_build_tile_url_replaces_once() {
        let url = build_tile_url("http://h/{z}/{x}/{y}?z={z}", 1, 2, 3);
        assert_eq!(url, "http://h/1/2/3?z={z}");
    }

    #[test]
    fn test_build_tile_url_row_first_layout() {
        let url = build_tile_url("http://h/tile/{z}/{y}/{x}", 15, 200, 100);
        assert_eq!(url, "http://h/tile/15/100/200");
    }

    #[test]
    fn test_validate_template() {
        assert!(validate_template("http://h/{z}/{x}/{y}").is_ok());
        let err = validate_template("http://h/{z}/{y}").unwrap_err();
        assert!(err.contains("{x}"));
    }
}
