use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid direction: `{token}`")]
    InvalidDirection { token: String },

    #[error("Malformed line {line_no}: `{line}`")]
    MalformedLine { line_no: usize, line: String },

    #[error("Malformed border `{border}` in line {line_no}: `{line}`")]
    MalformedBorder { line_no: usize, border: String, line: String },

    #[error("Unknown border direction `{direction}` for city `{city}` in line {line_no}")]
    UnknownDirection { line_no: usize, direction: String, city: String },

    #[error("City `{city}` cannot border itself (line {line_no})")]
    SelfBorder { line_no: usize, city: String },

    #[error("Cannot have more aliens than cities: {requested} > {cities}")]
    TooManyAgents { requested: usize, cities: usize },

    #[error("City `{city}` is already occupied by alien {alien}")]
    CityOccupied { city: String, alien: u64 },

    #[error("Map depth must be at least 1, got {depth}")]
    InvalidDepth { depth: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
