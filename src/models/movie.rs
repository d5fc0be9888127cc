use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Длительность в минутах
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub status: MovieStatus,
}

/// Статус проката. Всё, что не "coming soon", считается "now showing".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieStatus {
    #[default]
    NowShowing,
    ComingSoon,
}

impl MovieStatus {
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();
        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "coming soon" => MovieStatus::ComingSoon,
            _ => MovieStatus::NowShowing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::NowShowing => "now_showing",
            MovieStatus::ComingSoon => "coming_soon",
        }
    }
}

impl<'de> Deserialize<'de> for MovieStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(MovieStatus::parse).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_normalization() {
        assert_eq!(MovieStatus::parse("coming soon"), MovieStatus::ComingSoon);
        assert_eq!(MovieStatus::parse("Coming_Soon"), MovieStatus::ComingSoon);
        assert_eq!(MovieStatus::parse("coming-soon"), MovieStatus::ComingSoon);
        assert_eq!(MovieStatus::parse("now showing"), MovieStatus::NowShowing);
        assert_eq!(MovieStatus::parse("archived"), MovieStatus::NowShowing);
        assert_eq!(MovieStatus::parse(""), MovieStatus::NowShowing);
    }

    #[test]
    fn missing_or_null_status_is_now_showing() {
        let movie: Movie = serde_json::from_value(json!({ "title": "Dune" })).unwrap();
        assert_eq!(movie.status, MovieStatus::NowShowing);

        let movie: Movie =
            serde_json::from_value(json!({ "title": "Dune", "status": null })).unwrap();
        assert_eq!(movie.status, MovieStatus::NowShowing);
    }

    #[test]
    fn serialized_status_reads_back() {
        let movie: Movie =
            serde_json::from_value(json!({ "title": "Alien", "status": "coming soon" })).unwrap();
        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["status"], "coming_soon");
        let again: Movie = serde_json::from_value(value).unwrap();
        assert_eq!(again.status, MovieStatus::ComingSoon);
    }
}
