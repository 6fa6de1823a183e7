pub mod features;
pub mod model;
pub mod weights;

pub use features::{label_for, FeatureExtractor, FeatureVector, MatchContext, SchemaVersion};
pub use model::{PredictionModel, TrainingReport, TrainingSample};
pub use weights::{ModelWeights, NamedWeight};
