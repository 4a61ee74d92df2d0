use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    url: String,
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// On-disk page cache, one JSON file per URL, revalidated with conditional
/// requests once an entry is older than `max_age`.
#[derive(Debug)]
pub struct PageCache {
    client: Client,
    dir: PathBuf,
    max_age: Duration,
    request_delay: Duration,
}

impl PageCache {
    pub fn new(client: Client, dir: PathBuf, max_age: Duration, request_delay: Duration) -> Self {
        Self {
            client,
            dir,
            max_age,
            request_delay,
        }
    }

    pub fn fetch_text(&self, url: &str) -> Result<String> {
        let path = self.entry_path(url);
        let cached_entry = load_entry(&path).filter(|e| e.url == url);

        if let Some(entry) = cached_entry.as_ref()
            && is_fresh(entry.fetched_at, self.max_age, now_secs())
        {
            debug!("cache hit {url}");
            return Ok(entry.body.clone());
        }

        if !self.request_delay.is_zero() {
            thread::sleep(self.request_delay);
        }

        let mut req = self.client.get(url);
        if let Some(entry) = cached_entry.as_ref() {
            if let Some(etag) = entry.etag.as_ref() {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = entry.last_modified.as_ref() {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        info!("GET {url}");
        let resp = req.send().with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        if status == StatusCode::NOT_MODIFIED {
            if let Some(mut entry) = cached_entry {
                entry.fetched_at = now_secs();
                save_entry(&path, &entry)?;
                return Ok(entry.body);
            }
            return Err(anyhow!("received 304 without cache body for {url}"));
        }

        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {status} for {url}"));
        }

        let entry = CacheEntry {
            version: CACHE_VERSION,
            url: url.to_string(),
            body: body.clone(),
            etag: header_string(&headers, ETAG),
            last_modified: header_string(&headers, LAST_MODIFIED),
            fetched_at: now_secs(),
        };
        save_entry(&path, &entry)?;
        Ok(body)
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(url)))
    }
}

fn header_string(headers: &reqwest::header::HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn load_entry(path: &Path) -> Option<CacheEntry> {
    let raw = fs::read_to_string(path).ok()?;
    let entry = serde_json::from_str::<CacheEntry>(&raw).ok()?;
    (entry.version == CACHE_VERSION).then_some(entry)
}

fn save_entry(path: &Path, entry: &CacheEntry) -> Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(entry).context("serialize page cache entry")?;
    fs::write(&tmp, json).context("write page cache entry")?;
    fs::rename(&tmp, path).context("swap page cache entry")?;
    Ok(())
}

fn cache_key(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

fn is_fresh(fetched_at: u64, max_age: Duration, now: u64) -> bool {
    now.saturating_sub(fetched_at) < max_age.as_secs()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
