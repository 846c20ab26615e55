use palette::Srgb;

use crate::error::ConfigurationError;

/// Ordered list of cluster centroids produced by one extraction call.
///
/// Order follows cluster production, not visual prominence: the first entry is
/// *a* cluster mean, not necessarily the dominant one.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Srgb<u8>>,
}

impl Palette {
    pub(crate) fn new(colors: Vec<Srgb<u8>>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Srgb<u8>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Srgb<u8>> {
        self.colors.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Srgb<u8>> + '_ {
        self.colors.iter().copied()
    }

    /// Palette entries as `#rrggbb` strings.
    pub fn to_hex(&self) -> Vec<String> {
        self.colors.iter().map(|&c| to_hex(c)).collect()
    }
}

/// Lowercase `#rrggbb`, the form desktop shells accept for a solid background.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Parse `#RRGGBB` or `RRGGBB` (either case).
pub fn parse_hex(s: &str) -> Result<Srgb<u8>, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidHexColor(s.to_string());
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| invalid())?;
    let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| invalid())?;
    let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| invalid())?;
    Ok(Srgb::new(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_with_hash() {
        assert_eq!(to_hex(Srgb::new(10, 20, 255)), "#0a14ff");
    }

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(parse_hex("#0A14FF").unwrap(), Srgb::new(10, 20, 255));
        assert_eq!(parse_hex("0a14ff").unwrap(), Srgb::new(10, 20, 255));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "#fff", "#12345g", "1234567", "#ééé"] {
            assert_eq!(
                parse_hex(bad),
                Err(ConfigurationError::InvalidHexColor(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn palette_hex_keeps_order() {
        let palette = Palette::new(vec![Srgb::new(255, 0, 0), Srgb::new(0, 0, 0)]);
        assert_eq!(palette.to_hex(), vec!["#ff0000", "#000000"]);
        assert_eq!(palette.get(1), Some(Srgb::new(0, 0, 0)));
        assert_eq!(palette.get(2), None);
        assert_eq!(palette.colors().len(), palette.len());
        assert!(!palette.is_empty());
    }
}
