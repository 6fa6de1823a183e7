pub mod elo;
pub mod head_to_head;
pub mod recalculation;
pub mod window;

pub use elo::{apply_result, EloRatingEngine};
pub use head_to_head::{HeadToHeadStats, HeadToHeadTable, PairKey};
pub use recalculation::{DataQualityIssue, RankingRecalculator, Recalculation};
pub use window::RankingWindow;
