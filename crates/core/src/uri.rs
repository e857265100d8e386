//! Request URI construction

use crate::config::Config;
use crate::error::Result;

/// Build the request URI for `path`
///
/// One leading and one trailing slash are stripped from the path.
pub fn build_uri(path: &str, config: &Config) -> Result<String> {
    let host = config.host()?;
    let scheme = if config.use_tls { "https" } else { "http" };
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);

    let uri = format!("{scheme}://{host}/{path}");
    url::Url::parse(&uri)?;
    Ok(uri)
}
