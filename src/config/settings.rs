use crate::domain::PlayerId;
use crate::prediction::SchemaVersion;

const DEFAULT_DATABASE_PATH: &str = "table_tennis_ranking.db";

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub base_rating: f64,
    pub k_factor: f64,
    /// Actual score credited to the winner of a match where the loser took at least one set
    pub close_win_score: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            base_rating: 1000.0,
            k_factor: 32.0,
            close_win_score: 0.75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model_name: String,
    pub schema: SchemaVersion,
    /// Players that get their own pair indicators in the extended schema
    pub roster: Vec<PlayerId>,
    pub learning_rate: f64,
    pub epochs: usize,
    pub convergence_threshold: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_name: "MatchPredictionModel".to_string(),
            schema: SchemaVersion::Extended,
            roster: vec![1, 2, 3, 4, 5],
            learning_rate: 0.001,
            epochs: 1000,
            convergence_threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub model: ModelSettings,
    pub database_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            model: ModelSettings::default(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }

    /// Defaults, with the database location taken from `DATABASE_PATH` when set
    pub fn from_env() -> Self {
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

        Self {
            database_path,
            ..Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_league_rules() {
        let config = AppConfig::new();
        assert_eq!(config.rating.base_rating, 1000.0);
        assert_eq!(config.rating.k_factor, 32.0);
        assert_eq!(config.model.epochs, 1000);
        assert_eq!(config.model.roster.len(), 5);
        assert_eq!(config.model.schema, SchemaVersion::Extended);
    }
}
