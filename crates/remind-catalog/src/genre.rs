//! TMDB genre ids to Korean display names.

/// Name shown for genre ids TMDB may add later.
pub const UNKNOWN_GENRE: &str = "기타";

/// Display name for a single TMDB genre id.
pub fn genre_name(id: i64) -> &'static str {
    match id {
        28 => "액션",
        12 => "어드벤처",
        16 => "애니메이션",
        35 => "코미디",
        80 => "범죄",
        99 => "다큐",
        18 => "드라마",
        10751 => "가족",
        14 => "판타지",
        36 => "역사",
        27 => "공포",
        10402 => "음악",
        9648 => "미스터리",
        10749 => "로맨스",
        878 => "SF",
        10770 => "TV 영화",
        53 => "스릴러",
        10752 => "전쟁",
        37 => "서부",
        _ => UNKNOWN_GENRE,
    }
}

/// Distinct genre names in first-seen order, joined with `", "`.
pub fn genre_names(ids: &[i64]) -> String {
    let mut names: Vec<&str> = Vec::with_capacity(ids.len());
    for name in ids.iter().map(|id| genre_name(*id)) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(", ")
}
