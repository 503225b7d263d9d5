pub mod selector;

pub use selector::{
    evaluate_candidate, select_contract, CandidateOutcome, ContractChoice, Selection,
    SelectionRequest,
};
