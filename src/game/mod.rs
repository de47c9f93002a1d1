pub mod clock;
pub mod level_generator;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod skill_model;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use level_generator::{LevelGenerator, SeededLevelGenerator};
pub use session::{Session, SessionDeps};
pub use settings::Settings;
pub use skill_model::{AdaptiveSkillModel, Hint, SkillModel};
pub use store::{FileStore, MemoryStore, Store, StoreError};
