use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "data/raw/Observations 2012-2025.xlsx";

/// Names of the three sheets of the survey workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub species: String,
    pub gps: String,
    pub observations: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            species: "ESPECES".to_string(),
            gps: "GPS-MILIEU".to_string(),
            observations: "NOM FRANÇAIS".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
    pub sheets: SheetNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            sheets: SheetNames::default(),
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults for
    /// unset variables. A variable that is set but not valid unicode is an error.
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = Config::default();

        Ok(Config {
            data_file: var_or("BIRDS_DATA_FILE", DEFAULT_DATA_FILE)?.into(),
            sheets: SheetNames {
                species: var_or("BIRDS_SPECIES_SHEET", &defaults.sheets.species)?,
                gps: var_or("BIRDS_GPS_SHEET", &defaults.sheets.gps)?,
                observations: var_or("BIRDS_OBSERVATIONS_SHEET", &defaults.sheets.observations)?,
            },
        })
    }

    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }
}

fn var_or(key: &str, default: &str) -> Result<String, env::VarError> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(e),
    }
}
