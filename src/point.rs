/// Fixed point scale used by IGC B records: degrees times 60000.
const MMIN_PER_DEGREE: f64 = 60000.0;

pub trait Point: Sync {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
    fn time(&self) -> i64;
}

/// A single recorded GPS position. Coordinates are stored as signed
/// milli-minutes of arc, the resolution of the B record they come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub lat: i32,
    pub lon: i32,
    pub time: i64,
    pub gps_altitude: i32,
    pub pressure_altitude: i32,
    pub valid: bool,
    pub name: Option<String>,
}

impl Fix {
    pub fn new(lat: i32, lon: i32, time: i64) -> Fix {
        Fix {
            lat,
            lon,
            time,
            gps_altitude: 0,
            pressure_altitude: 0,
            valid: true,
            name: None,
        }
    }

    pub fn from_degrees(lat: f64, lon: f64, time: i64) -> Fix {
        Fix::new(
            (lat * MMIN_PER_DEGREE).round() as i32,
            (lon * MMIN_PER_DEGREE).round() as i32,
            time,
        )
    }
}

impl Point for Fix {
    fn latitude(&self) -> f64 {
        f64::from(self.lat) / MMIN_PER_DEGREE
    }
    fn longitude(&self) -> f64 {
        f64::from(self.lon) / MMIN_PER_DEGREE
    }
    fn time(&self) -> i64 {
        self.time
    }
}
