//! Preview URL construction.
//!
//! ```text
//! embedded:   {base}/app-runner/{appId}?t={timestamp}&embed=true
//! shareable:  {base}/app/{remoteAppId}?t={timestamp}
//! ```
//!
//! The timestamp only busts caches; a fresh one forces the iframe to reload.

use url::Url;

use super::BridgeError;

/// URL the preview iframe loads.
pub fn preview_url(base: &str, app_id: &str, timestamp: u64) -> Result<Url, BridgeError> {
    let mut url = build(base, &["app-runner", app_id], timestamp)?;
    url.query_pairs_mut().append_pair("embed", "true");
    Ok(url)
}

/// Shareable URL of a published app.
pub fn share_url(base: &str, remote_app_id: &str, timestamp: u64) -> Result<Url, BridgeError> {
    build(base, &["app", remote_app_id], timestamp)
}

fn build(base: &str, segments: &[&str], timestamp: u64) -> Result<Url, BridgeError> {
    let mut url = Url::parse(base).map_err(|e| BridgeError::InvalidHost(base.to_string(), e))?;

    url.path_segments_mut()
        .map_err(|()| BridgeError::NotABase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);

    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut()
        .append_pair("t", &timestamp.to_string());
    Ok(url)
}
