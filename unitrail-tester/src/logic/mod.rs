pub mod assets;
pub mod policy;
pub mod reports;
pub mod script;
pub mod seeds;
pub mod simulation;
pub mod storage;

pub use assets::FsLoader;
pub use policy::PolicyKind;
pub use script::ScriptedEnhancer;
pub use seeds::{resolve_seed_inputs, split_csv};
pub use simulation::{SimulationConfig, SimulationRun, run_simulation};
pub use storage::JsonFileStorage;
