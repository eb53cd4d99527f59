use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch";

pub fn is_valid_video_id(video_id: &str) -> bool {
    video_id.trim().chars().count() == 11
}

pub fn watch_url(video_id: &str) -> String {
    build_url(video_id.trim(), None)
}

/// `v` 參數經過 percent-encoding；合法的 YouTube ID 只含 `[A-Za-z0-9_-]`，結果與字面值相同
fn build_url(video_id: &str, start_seconds: Option<u32>) -> String {
    let mut params = vec![("v", video_id.to_string())];
    if let Some(seconds) = start_seconds {
        params.push(("t", format!("{}s", seconds)));
    }
    match Url::parse_with_params(WATCH_URL, &params) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}?v={}", WATCH_URL, video_id),
    }
}

/// 由影片 ID 與「時間」區間產生帶起始秒數的連結
pub fn timestamped_link(video_id: &str, time_range: &str) -> String {
    let video_id = video_id.trim();
    let time_range = time_range.trim();
    if video_id.is_empty() || time_range.is_empty() || !is_valid_video_id(video_id) {
        return String::new();
    }

    if !time_range.contains('-') {
        return build_url(video_id, None);
    }

    let start = time_range.split('-').next().unwrap_or_default().trim();
    let parts: Option<Vec<u32>> = start.split(':').map(|p| p.trim().parse().ok()).collect();
    // 數值過大時退回不帶時間的連結
    let seconds = match parts.as_deref() {
        Some([m, s]) => m.checked_mul(60).and_then(|v| v.checked_add(*s)),
        Some([h, m, s]) => h
            .checked_mul(3600)
            .and_then(|v| v.checked_add(m.checked_mul(60)?))
            .and_then(|v| v.checked_add(*s)),
        _ => None,
    };

    build_url(video_id, seconds)
}
