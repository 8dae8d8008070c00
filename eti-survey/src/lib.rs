pub mod analysis;
pub mod experiment;
pub mod parse;
pub mod personas;
pub mod pknf;
pub mod respondent;
pub mod simulation;
pub mod survey;

pub use experiment::{ExperimentConfig, Observation, PersonaKind, generate_scenarios,
    run_survey_experiment};
pub use personas::{Persona, PersonaError, sample_personas};
pub use pknf::{LabObservation, LabRegime, PknfConfig, PknfError, Treatment, run_lab_experiment};
pub use respondent::{FnRespondent, SurveyRespondent};
pub use simulation::{BulkObservation, SimulationError, SimulationParams, run_bulk_simulation};
