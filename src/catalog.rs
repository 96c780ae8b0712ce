//! Course catalog: per-track course pools and the shared common-core pool.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub code: String,
    pub name: String,
    pub credit_hours: f64,
}

impl CourseRecord {
    pub fn new(code: &str, name: &str, credit_hours: f64) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            credit_hours,
        }
    }
}

/// Academic college a track belongs to. Drives the differential tuition tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum College {
    Business,
    Science,
    Engineering,
    LiberalArts,
}

impl College {
    pub fn name(&self) -> &'static str {
        match self {
            College::Business => "College of Business",
            College::Science => "College of Science",
            College::Engineering => "College of Engineering",
            College::LiberalArts => "College of Liberal Arts",
        }
    }
}

impl fmt::Display for College {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field of study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    ComputerScience,
    Biology,
    BusinessAdministration,
    Finance,
    MechanicalEngineering,
    Psychology,
    English,
}

impl Track {
    pub const ALL: [Track; 7] = [
        Track::ComputerScience,
        Track::Biology,
        Track::BusinessAdministration,
        Track::Finance,
        Track::MechanicalEngineering,
        Track::Psychology,
        Track::English,
    ];

    /// Display name of the major
    pub fn major(&self) -> &'static str {
        match self {
            Track::ComputerScience => "Computer Science",
            Track::Biology => "Biology",
            Track::BusinessAdministration => "Business Administration",
            Track::Finance => "Finance",
            Track::MechanicalEngineering => "Mechanical Engineering",
            Track::Psychology => "Psychology",
            Track::English => "English",
        }
    }

    /// Degree program the major is offered under
    pub fn program(&self) -> &'static str {
        match self {
            Track::ComputerScience | Track::Biology | Track::MechanicalEngineering => {
                "Bachelor of Science"
            }
            Track::BusinessAdministration | Track::Finance => "Bachelor of Business Administration",
            Track::Psychology | Track::English => "Bachelor of Arts",
        }
    }

    pub fn college(&self) -> College {
        match self {
            Track::ComputerScience | Track::Biology => College::Science,
            Track::BusinessAdministration | Track::Finance => College::Business,
            Track::MechanicalEngineering => College::Engineering,
            Track::Psychology | Track::English => College::LiberalArts,
        }
    }

    fn slug(&self) -> String {
        self.major().to_ascii_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.major())
    }
}

impl FromStr for Track {
    type Err = Error;

    /// Accepts the major name ("Computer Science") or its slug
    /// ("computer-science"), case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Track::ALL
            .iter()
            .copied()
            .find(|t| t.major().to_ascii_lowercase() == wanted || t.slug() == wanted)
            .ok_or_else(|| Error::InvalidTrack(s.to_string()))
    }
}

/// Lookup tables of course records keyed by track, plus the common core.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pools: HashMap<Track, Vec<CourseRecord>>,
    common_core: Vec<CourseRecord>,
}

impl Catalog {
    /// An empty catalog; pools are added with [`Catalog::register`].
    pub fn new(common_core: Vec<CourseRecord>) -> Self {
        Self {
            pools: HashMap::new(),
            common_core,
        }
    }

    pub fn register(&mut self, track: Track, courses: Vec<CourseRecord>) {
        self.pools.insert(track, courses);
    }

    /// Major pool for `track`, or `InvalidTrack` when none is registered.
    pub fn pool(&self, track: Track) -> Result<&[CourseRecord]> {
        self.pools
            .get(&track)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::InvalidTrack(track.to_string()))
    }

    pub fn common_core(&self) -> &[CourseRecord] {
        &self.common_core
    }

    /// Tracks that have a registered pool, in `Track::ALL` order.
    pub fn tracks(&self) -> Vec<Track> {
        Track::ALL
            .iter()
            .copied()
            .filter(|t| self.pools.contains_key(t))
            .collect()
    }

    /// The built-in catalog covering every track.
    pub fn standard() -> Self {
        let mut catalog = Catalog::new(to_records(COMMON_CORE));
        for track in Track::ALL {
            catalog.register(track, to_records(standard_pool(track)));
        }
        catalog
    }
}

fn to_records(rows: &[(&str, &str, f64)]) -> Vec<CourseRecord> {
    rows.iter()
        .map(|(code, name, hours)| CourseRecord::new(code, name, *hours))
        .collect()
}

const COMMON_CORE: &[(&str, &str, f64)] = &[
    ("ENGL 1301", "Composition I", 3.0),
    ("ENGL 1302", "Composition II", 3.0),
    ("MATH 1314", "College Algebra", 3.0),
    ("HIST 1301", "United States History I", 3.0),
    ("GOVT 2305", "Federal Government", 3.0),
    ("COMM 1315", "Public Speaking", 3.0),
    ("PHIL 1301", "Introduction to Philosophy", 3.0),
    ("ARTS 1301", "Art Appreciation", 3.0),
    ("KINE 1164", "Lifetime Fitness", 1.0),
];

fn standard_pool(track: Track) -> &'static [(&'static str, &'static str, f64)] {
    match track {
        Track::ComputerScience => &[
            ("COSC 1336", "Programming Fundamentals I", 3.0),
            ("COSC 1337", "Programming Fundamentals II", 3.0),
            ("COSC 2336", "Data Structures", 3.0),
            ("COSC 2325", "Computer Organization", 3.0),
            ("COSC 3320", "Algorithms", 3.0),
            ("COSC 3340", "Operating Systems", 3.0),
        ],
        Track::Biology => &[
            ("BIOL 1406", "General Biology I", 4.0),
            ("BIOL 1407", "General Biology II", 4.0),
            ("BIOL 2416", "Genetics", 4.0),
            ("BIOL 3320", "Cell Biology", 3.0),
            ("BIOL 3350", "Ecology", 3.0),
            ("CHEM 1411", "General Chemistry I", 4.0),
        ],
        Track::BusinessAdministration => &[
            ("BUSI 1301", "Business Principles", 3.0),
            ("ACCT 2301", "Financial Accounting", 3.0),
            ("ACCT 2302", "Managerial Accounting", 3.0),
            ("MGMT 3310", "Organizational Behavior", 3.0),
            ("MKTG 3301", "Principles of Marketing", 3.0),
            ("BUSI 2305", "Business Statistics", 3.0),
        ],
        Track::Finance => &[
            ("FINC 3310", "Corporate Finance", 3.0),
            ("FINC 3320", "Investments", 3.0),
            ("FINC 3330", "Financial Markets and Institutions", 3.0),
            ("ACCT 2301", "Financial Accounting", 3.0),
            ("ECON 2301", "Principles of Macroeconomics", 3.0),
            ("ECON 2302", "Principles of Microeconomics", 3.0),
        ],
        Track::MechanicalEngineering => &[
            ("ENGR 1201", "Introduction to Engineering", 2.0),
            ("ENGR 2301", "Statics", 3.0),
            ("ENGR 2302", "Dynamics", 3.0),
            ("MECH 3310", "Thermodynamics", 3.0),
            ("MECH 3320", "Fluid Mechanics", 3.0),
            ("PHYS 2425", "University Physics I", 4.0),
        ],
        Track::Psychology => &[
            ("PSYC 2301", "General Psychology", 3.0),
            ("PSYC 2314", "Lifespan Development", 3.0),
            ("PSYC 2317", "Statistical Methods in Psychology", 3.0),
            ("PSYC 3310", "Abnormal Psychology", 3.0),
            ("PSYC 3320", "Cognitive Psychology", 3.0),
            ("PSYC 3330", "Social Psychology", 3.0),
        ],
        Track::English => &[
            ("ENGL 2322", "British Literature I", 3.0),
            ("ENGL 2327", "American Literature I", 3.0),
            ("ENGL 2332", "World Literature I", 3.0),
            ("ENGL 3310", "Literary Theory", 3.0),
            ("ENGL 3320", "Shakespeare", 3.0),
            ("ENGL 3330", "Creative Writing", 3.0),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_covers_every_track() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.tracks().len(), Track::ALL.len());
        for track in Track::ALL {
            assert!(catalog.pool(track).unwrap().len() >= 3);
        }
        assert!(catalog.common_core().len() >= 3);
    }

    #[test]
    fn missing_pool_is_invalid_track() {
        let catalog = Catalog::new(Vec::new());
        let err = catalog.pool(Track::Finance).unwrap_err();
        assert!(matches!(err, Error::InvalidTrack(ref t) if t == "Finance"));
    }

    #[test]
    fn track_parses_name_and_slug() {
        assert_eq!("Computer Science".parse::<Track>().unwrap(), Track::ComputerScience);
        assert_eq!("mechanical-engineering".parse::<Track>().unwrap(), Track::MechanicalEngineering);
        assert!(matches!("Astrology".parse::<Track>(), Err(Error::InvalidTrack(_))));
    }

    #[test]
    fn science_tracks_live_in_the_science_college() {
        assert_eq!(Track::ComputerScience.college(), College::Science);
        assert!(Track::ComputerScience.college().name().contains("Science"));
        assert_eq!(Track::Finance.college(), College::Business);
    }
}
