use std::{fmt, str::FromStr};

/// Identifies the coordinate reference system a set of coordinates is
/// expressed in.
///
/// The engine never reprojects: two sets may only be intersected when their
/// `Crs` values compare equal. `Unknown` only matches `Unknown`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Crs {
    /// An EPSG registry code, e.g. `27700` for the British National Grid.
    Epsg(u32),
    /// No CRS information was available at load time.
    #[default]
    Unknown,
}

impl Crs {
    /// Get the EPSG code, if known.
    #[inline] pub fn epsg(&self) -> Option<u32> {
        match self { Crs::Epsg(code) => Some(*code), Crs::Unknown => None }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{code}"),
            Crs::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<Option<u32>> for Crs {
    fn from(epsg: Option<u32>) -> Self {
        epsg.map_or(Crs::Unknown, Crs::Epsg)
    }
}

/// Parses `"EPSG:27700"`, `"epsg:4326"`, a bare code such as `"27700"`, or
/// `"unknown"`.
impl FromStr for Crs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unknown") { return Ok(Crs::Unknown) }

        let code = match s.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some(_) => return Err(format!("unsupported CRS authority in {s:?}")),
            None => s,
        };
        code.trim().parse::<u32>()
            .map(Crs::Epsg)
            .map_err(|_| format!("invalid EPSG code in {s:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        assert_eq!("EPSG:27700".parse::<Crs>(), Ok(Crs::Epsg(27700)));
        assert_eq!("epsg: 4326".parse::<Crs>(), Ok(Crs::Epsg(4326)));
        assert_eq!("3857".parse::<Crs>(), Ok(Crs::Epsg(3857)));
        assert_eq!("Unknown".parse::<Crs>(), Ok(Crs::Unknown));
        assert!("ESRI:102003".parse::<Crs>().is_err());
        assert!("EPSG:abc".parse::<Crs>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for crs in [Crs::Epsg(27700), Crs::Unknown] {
            assert_eq!(crs.to_string().parse::<Crs>(), Ok(crs));
        }
    }

    #[test]
    fn unknown_only_matches_unknown() {
        assert_eq!(Crs::Unknown, Crs::from(None));
        assert_ne!(Crs::Unknown, Crs::Epsg(4326));
        assert_eq!(Crs::Epsg(4326).epsg(), Some(4326));
    }
}
