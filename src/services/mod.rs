pub mod league;
pub mod prediction;
pub mod server;

pub use league::{AddMatchOutcome, LeagueService, ModelUpdate};
pub use prediction::{Prediction, PredictionService};
pub use server::ServerService;
