use std::collections::BTreeMap;

use geo::Coord;

/// A latitude/longitude pair in decimal degrees.
///
/// The type performs no range checks; callers own the correctness of the
/// values they supply.
///
/// # Examples
/// ```
/// use geocoder_core::Coordinate;
///
/// let coordinate = Coordinate::new(57.097085, -2.267513);
/// assert_eq!(coordinate.latitude(), 57.097085);
/// assert_eq!(coordinate.longitude(), -2.267513);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Construct a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Structured representation keyed by `latitude` and `longitude`.
    ///
    /// # Examples
    /// ```
    /// use geocoder_core::Coordinate;
    ///
    /// let map = Coordinate::new(51.50354, -0.127695).to_map();
    /// assert_eq!(map.get("latitude"), Some(&51.50354));
    /// assert_eq!(map.get("longitude"), Some(&-0.127695));
    /// ```
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([("latitude", self.latitude), ("longitude", self.longitude)])
    }
}

/// `x = longitude`, `y = latitude`.
impl From<Coordinate> for Coord<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            x: coordinate.longitude,
            y: coordinate.latitude,
        }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}
