//! The song-selection and response-assembly pipeline
//!
//! Data flows strictly downward: the sampler drives the fetcher (cache +
//! content host), then the translator (cache + translation API), then the
//! ruby annotator (cache + reading converter), and the assembler packs the
//! final payload.

pub mod assembler;
pub mod dataset_client;
pub mod fetcher;
pub mod ruby;
pub mod sampler;
pub mod translator;

pub use assembler::assemble;
pub use dataset_client::DatasetClient;
pub use fetcher::RecordFetcher;
pub use ruby::{KakasiConverter, ReadingConverter, RubyAnnotator};
pub use sampler::{Sampler, SamplerBudgets};
pub use translator::{TranslateClient, Translator};
