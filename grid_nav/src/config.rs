use yaml_rust::{Yaml, YamlLoader};

use crate::error::ConfigError;

/// Occupancy grid construction parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct MapperConfig {
    /// The grid is `size` x `size` cells
    pub size: usize,
    /// Both rays must be shorter than this for their endpoints to be joined by a wall
    pub dist_cutoff: f64,
    /// Endpoints closer than this are treated as one contiguous surface
    pub connect_cutoff: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            size: 100,
            dist_cutoff: 8.0,
            connect_cutoff: 5.0,
        }
    }
}

impl MapperConfig {
    pub fn new(size: usize, dist_cutoff: f64, connect_cutoff: f64) -> Self {
        Self {
            size,
            dist_cutoff,
            connect_cutoff,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidSize);
        }
        check_cutoff("dist_cutoff", self.dist_cutoff)?;
        check_cutoff("connect_cutoff", self.connect_cutoff)?;
        Ok(())
    }
}

fn check_cutoff(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0f64 {
        return Err(ConfigError::InvalidCutoff { name, value });
    }
    Ok(())
}

/// A* parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Abort the search after this many node expansions. `None` searches until the open set
    /// is exhausted.
    pub max_expansions: Option<usize>,
}

impl PlannerConfig {
    pub fn bounded(max_expansions: usize) -> Self {
        Self {
            max_expansions: Some(max_expansions),
        }
    }
}

/// Top level configuration document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavConfig {
    pub mapper: MapperConfig,
    pub planner: PlannerConfig,
}

impl NavConfig {
    /// Load from a YAML document of the form
    ///
    /// ```yaml
    /// mapper:
    ///   size: 80
    ///   dist_cutoff: 10
    ///   connect_cutoff: 10
    /// planner:
    ///   max_expansions: 50000
    /// ```
    ///
    /// Absent sections and fields keep their defaults.
    pub fn from_yaml(yaml_str: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(yaml_str)?;
        let mut config = NavConfig::default();

        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(config),
        };

        let mapper = &doc["mapper"];
        if let Some(size) = read_i64(mapper, "size", "mapper.size")? {
            if size <= 0 {
                return Err(ConfigError::InvalidSize);
            }
            config.mapper.size = size as usize;
        }
        if let Some(dist_cutoff) = read_f64(mapper, "dist_cutoff", "mapper.dist_cutoff")? {
            config.mapper.dist_cutoff = dist_cutoff;
        }
        if let Some(connect_cutoff) =
            read_f64(mapper, "connect_cutoff", "mapper.connect_cutoff")?
        {
            config.mapper.connect_cutoff = connect_cutoff;
        }

        let planner = &doc["planner"];
        if let Some(max_expansions) =
            read_i64(planner, "max_expansions", "planner.max_expansions")?
        {
            if max_expansions < 0 {
                return Err(ConfigError::WrongType {
                    field: "planner.max_expansions",
                });
            }
            config.planner.max_expansions = Some(max_expansions as usize);
        }

        config.mapper.validate()?;
        Ok(config)
    }
}

fn read_i64(section: &Yaml, key: &str, field: &'static str) -> Result<Option<i64>, ConfigError> {
    match &section[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(v) => Ok(Some(*v)),
        _ => Err(ConfigError::WrongType { field }),
    }
}

/// Integers are accepted where a float is expected, `dist_cutoff: 10` is common.
fn read_f64(section: &Yaml, key: &str, field: &'static str) -> Result<Option<f64>, ConfigError> {
    match &section[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(v) => Ok(Some(*v as f64)),
        Yaml::Real(v) => v
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError::WrongType { field }),
        _ => Err(ConfigError::WrongType { field }),
    }
}
