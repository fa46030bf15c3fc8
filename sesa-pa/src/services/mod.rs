//! Services for sesa-pa
//!
//! External-collaborator clients (recognizer, feedback generator, audio
//! fetchers), audio normalization, and the assessment orchestrator.

pub mod assessment_runner;
pub mod audio_acquirer;
pub mod audio_converter;
pub mod azure_speech;
pub mod feedback;
pub mod gdrive_fetcher;
pub mod traits;
pub mod youtube_fetcher;

pub use assessment_runner::{AssessmentRequest, AssessmentRunner};
pub use audio_acquirer::LocalAudioAcquirer;
pub use audio_converter::AudioConverter;
pub use azure_speech::AzureSpeechClient;
pub use feedback::OpenAiFeedbackClient;
pub use gdrive_fetcher::GoogleDriveFetcher;
pub use traits::{AudioAcquirer, AudioFetcher, AudioSource, FeedbackGenerator, FeedbackInput, Recognizer};
pub use youtube_fetcher::YouTubeFetcher;
