pub mod config;
pub mod error;
pub mod seed;
pub mod store;
pub mod types;
pub mod validation;

pub use config::AppConfig;
pub use error::AllvError;
pub use seed::{DemoSeeder, SeededRng};
pub use store::Directory;
pub use types::{Post, PostInput, User, UserInput, UserSummary};
pub use validation::FieldErrors;
