//! Output-safety validation for route paths and rewrites

mod manifests;
mod path;
mod route;

pub use path::{
    validate_path, validate_prefix_rewrite, validate_rewrite, validate_route_path, PathError,
    RouteValidationError, INVALID_PATH_SEQUENCES, INVALID_PATH_SUFFIXES, VALID_PATH_PATTERN,
};
pub use manifests::validate_manifests;
pub use route::validate_http_route;
