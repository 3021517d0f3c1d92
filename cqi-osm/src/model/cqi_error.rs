use thiserror::Error;

#[derive(Error, Debug)]
pub enum CqiError {
    #[error("invalid index configuration: {0}")]
    ConfigurationError(String),
    #[error("no valid input file at '{0}'")]
    MissingInputFile(String),
    #[error("failure reading file {0}: {1}")]
    FileReadError(String, std::io::Error),
    #[error("failure writing file {0}: {1}")]
    FileWriteError(String, std::io::Error),
    #[error("failure decoding GeoJSON: {source}")]
    GeoJsonError {
        #[from]
        source: geojson::Error,
    },
    #[error("input collection contains no linestring features")]
    NoWaysFound,
    #[error("invalid way geometry for feature '{0}': {1}")]
    InvalidGeometry(String, String),
    #[error("{0}")]
    InternalError(String),
}
